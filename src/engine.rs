//! Generic cache engine.
//!
//! One engine instance serves one cached entity; the only entity-specific
//! inputs are the key prefix used for logging/metrics and the invalidation
//! pattern. The engine is the sole component that talks to the key-value
//! store, and it is fail-open throughout: store trouble degrades a read to a
//! miss and a write to a no-op, never an error to the caller.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::keys::EntityKeys;
use crate::query::PagedResponse;
use crate::store::KeyValueStore;
use crate::telemetry::{
    METRIC_HIT, METRIC_INVALIDATED, METRIC_MISS, METRIC_SELF_HEAL, METRIC_STORE_ERROR,
};

/// Entity-specific construction inputs for a [`CacheEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Entity tag for logs and metric labels.
    pub entity: &'static str,
    /// Glob covering every key in the entity's namespace, both scopes.
    pub invalidation_pattern: String,
    /// A disabled engine reports every read as a miss and skips writes.
    pub enabled: bool,
}

impl EngineConfig {
    pub fn new(entity: &'static str, invalidation_pattern: impl Into<String>) -> Self {
        Self {
            entity,
            invalidation_pattern: invalidation_pattern.into(),
            enabled: true,
        }
    }

    /// Derive the config from an entity's key namespace.
    pub fn for_keys(keys: EntityKeys) -> Self {
        Self::new(keys.prefix(), keys.invalidation_pattern())
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Cache-aside engine for one entity, parameterized by the cached item type.
///
/// `list`-scope entries hold a [`PagedResponse<T>`]; `all`-scope entries hold
/// a bare `Vec<T>`. Both go through the same read/write path, so the failure
/// policy lives in exactly one place.
pub struct CacheEngine<T> {
    store: Arc<dyn KeyValueStore>,
    entity: &'static str,
    invalidation_pattern: String,
    enabled: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T> CacheEngine<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(store: Arc<dyn KeyValueStore>, config: EngineConfig) -> Self {
        Self {
            store,
            entity: config.entity,
            invalidation_pattern: config.invalidation_pattern,
            enabled: config.enabled,
            _item: PhantomData,
        }
    }

    /// Look up a paginated result. `None` is a miss; never an error.
    pub async fn get_page(&self, key: &str) -> Option<PagedResponse<T>> {
        self.read(key).await
    }

    /// Look up an unpaginated result. `None` is a miss; never an error.
    pub async fn get_all(&self, key: &str) -> Option<Vec<T>> {
        self.read(key).await
    }

    /// Cache a paginated result. Fire-and-forget: failures are logged and
    /// swallowed so a cache write can never fail the path that computed the
    /// value.
    pub async fn put_page(&self, key: &str, value: &PagedResponse<T>, ttl: Duration) {
        self.write(key, value, ttl).await;
    }

    /// Cache an unpaginated result. Same fire-and-forget contract as
    /// [`put_page`](Self::put_page).
    pub async fn put_all(&self, key: &str, value: &[T], ttl: Duration) {
        self.write(key, value, ttl).await;
    }

    /// Drop a single entry. Failures are logged and swallowed.
    pub async fn invalidate(&self, key: &str) {
        if !self.enabled {
            return;
        }

        debug!(entity = self.entity, key, "invalidating cache key");
        if let Err(err) = self.store.del(key).await {
            counter!(METRIC_STORE_ERROR, "entity" => self.entity).increment(1);
            warn!(entity = self.entity, key, error = %err, "failed to invalidate cache key");
        }
    }

    /// Drop every entry in this entity's namespace, across both the `list`
    /// and `all` scopes. Zero matches is a no-op. On failure the namespace
    /// stays stale until entries hit their TTL; that is logged, not raised.
    pub async fn invalidate_all(&self) {
        if !self.enabled {
            return;
        }

        match self.store.del_pattern(&self.invalidation_pattern).await {
            Ok(0) => {
                debug!(entity = self.entity, "no cache keys to invalidate");
            }
            Ok(removed) => {
                counter!(METRIC_INVALIDATED, "entity" => self.entity).increment(removed);
                info!(
                    entity = self.entity,
                    pattern = %self.invalidation_pattern,
                    removed,
                    "invalidated cache namespace"
                );
            }
            Err(err) => {
                counter!(METRIC_STORE_ERROR, "entity" => self.entity).increment(1);
                warn!(
                    entity = self.entity,
                    pattern = %self.invalidation_pattern,
                    error = %err,
                    "failed to invalidate cache namespace, entries remain until TTL expiry"
                );
            }
        }
    }

    async fn read<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        if !self.enabled {
            return None;
        }

        let payload = match self.store.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                counter!(METRIC_MISS, "entity" => self.entity).increment(1);
                debug!(entity = self.entity, key, "cache miss");
                return None;
            }
            Err(err) => {
                counter!(METRIC_STORE_ERROR, "entity" => self.entity).increment(1);
                warn!(entity = self.entity, key, error = %err, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(value) => {
                counter!(METRIC_HIT, "entity" => self.entity).increment(1);
                debug!(entity = self.entity, key, "cache hit");
                Some(value)
            }
            Err(err) => {
                counter!(METRIC_SELF_HEAL, "entity" => self.entity).increment(1);
                warn!(
                    entity = self.entity,
                    key,
                    error = %err,
                    "corrupt cache entry, deleting and treating as miss"
                );
                // Best effort: a corrupt entry must not keep serving garbage.
                if let Err(err) = self.store.del(key).await {
                    warn!(entity = self.entity, key, error = %err, "failed to delete corrupt cache entry");
                }
                None
            }
        }
    }

    async fn write<V: Serialize + ?Sized>(&self, key: &str, value: &V, ttl: Duration) {
        if !self.enabled {
            return;
        }

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(entity = self.entity, key, error = %err, "failed to serialize cache value, skipping write");
                return;
            }
        };

        match self.store.set_ex(key, &payload, ttl).await {
            Ok(()) => {
                debug!(entity = self.entity, key, ttl_seconds = ttl.as_secs(), "cached value");
            }
            Err(err) => {
                counter!(METRIC_STORE_ERROR, "entity" => self.entity).increment(1);
                warn!(entity = self.entity, key, error = %err, "cache write failed, continuing without cache");
            }
        }
    }
}
