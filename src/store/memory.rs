//! In-memory store adapter.
//!
//! Backs the test suite and single-node deployments. Entries expire lazily:
//! an expired entry is dropped the first time a read or enumeration touches
//! it, mirroring how the networked store owns TTL expiry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use glob::Pattern;

use crate::error::StoreError;

use super::KeyValueStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    deadline: Option<Instant>,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }
}

/// Process-local [`KeyValueStore`] with TTL support and glob enumeration.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, Entry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.value().expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a raw payload directly, bypassing serialization. Lets tests
    /// seed malformed entries to exercise the engine's self-heal path.
    pub fn seed_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(
            key.into(),
            Entry {
                value: value.into(),
                deadline: None,
            },
        );
    }

    fn compile(pattern: &str) -> Result<Pattern, StoreError> {
        Pattern::new(pattern)
            .map_err(|err| StoreError::command(format!("invalid pattern `{pattern}`: {err}")))
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.expired(now) {
                return Ok(Some(entry.value.clone()));
            }
        }
        // Drop the entry only if it is still the expired one.
        self.entries
            .remove_if(key, |_, entry| entry.expired(now));
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline: Instant::now().checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<u64, StoreError> {
        Ok(u64::from(self.entries.remove(key).is_some()))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let matcher = Self::compile(pattern)?;
        let now = Instant::now();
        Ok(self
            .entries
            .iter()
            .filter(|entry| !entry.value().expired(now) && matcher.matches(entry.key()))
            .map(|entry| entry.key().clone())
            .collect())
    }

    async fn del_many(&self, keys: &[String]) -> Result<u64, StoreError> {
        let mut removed = 0;
        for key in keys {
            if self.entries.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = InMemoryStore::new();
        store
            .set_ex("currency:list:a", "payload", Duration::from_secs(60))
            .await
            .expect("set");

        let value = store.get("currency:list:a").await.expect("get");
        assert_eq!(value.as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn missing_key_is_a_miss_not_an_error() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("absent").await.expect("get"), None);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let store = InMemoryStore::new();
        store
            .set_ex("short-lived", "payload", Duration::from_millis(10))
            .await
            .expect("set");

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.get("short-lived").await.expect("get"), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn keys_filters_by_pattern() {
        let store = InMemoryStore::new();
        let ttl = Duration::from_secs(60);
        store.set_ex("currency:list:a", "1", ttl).await.expect("set");
        store.set_ex("currency:all:b", "2", ttl).await.expect("set");
        store.set_ex("country:list:c", "3", ttl).await.expect("set");

        let mut matched = store.keys("currency:*").await.expect("keys");
        matched.sort();
        assert_eq!(matched, vec!["currency:all:b", "currency:list:a"]);
    }

    #[tokio::test]
    async fn del_pattern_removes_only_the_namespace() {
        let store = InMemoryStore::new();
        let ttl = Duration::from_secs(60);
        store.set_ex("currency:list:a", "1", ttl).await.expect("set");
        store.set_ex("currency:all:b", "2", ttl).await.expect("set");
        store.set_ex("country:list:c", "3", ttl).await.expect("set");

        let removed = store.del_pattern("currency:*").await.expect("del_pattern");
        assert_eq!(removed, 2);
        assert_eq!(store.get("country:list:c").await.expect("get").as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn del_pattern_with_no_matches_is_a_noop() {
        let store = InMemoryStore::new();
        assert_eq!(store.del_pattern("currency:*").await.expect("del_pattern"), 0);
    }

    #[tokio::test]
    async fn invalid_pattern_is_a_command_error() {
        let store = InMemoryStore::new();
        assert!(store.keys("currency:[").await.is_err());
    }
}
