//! Key-value store contract and adapters.
//!
//! The cache engine talks to storage exclusively through [`KeyValueStore`],
//! the minimal contract the cache-aside layer needs: GET, SET-with-expiry,
//! DELETE, and pattern-based enumeration. Two adapters are provided:
//!
//! - [`redis::RedisStore`] for production deployments
//! - [`memory::InMemoryStore`] for tests and single-node use

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Minimal networked key-value contract.
///
/// All operations are non-blocking; adapters map their transport errors into
/// [`StoreError`] and leave the failure policy to the engine.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value. `Ok(None)` is an ordinary miss, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value with a time-to-live. The store owns expiry from here on.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Delete a single key, returning how many entries were removed.
    async fn del(&self, key: &str) -> Result<u64, StoreError>;

    /// Enumerate keys matching a glob pattern.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// Delete a batch of keys, returning how many entries were removed.
    async fn del_many(&self, keys: &[String]) -> Result<u64, StoreError>;

    /// Delete every key matching a glob pattern.
    ///
    /// The default enumerate-then-delete implementation is not atomic: a key
    /// created between enumeration and deletion survives until its TTL.
    /// Adapters with server-side scripting override this with an atomic
    /// variant.
    async fn del_pattern(&self, pattern: &str) -> Result<u64, StoreError> {
        let keys = self.keys(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.del_many(&keys).await
    }
}
