//! Redis store adapter.
//!
//! Pools connections through deadpool and maps every transport fault into
//! [`StoreError`]. Enumeration uses cursor-based `SCAN MATCH` rather than
//! `KEYS`, and pattern deletion runs as a server-side script so bulk
//! invalidation is atomic with respect to concurrent writes.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::{AsyncCommands, Script, cmd};
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};

use crate::config::StoreSettings;
use crate::error::StoreError;

use super::KeyValueStore;

const SCAN_BATCH: usize = 200;

// KEYS is acceptable inside the script: it runs server-side in one atomic
// step, bounded to the entity's namespace.
const DEL_PATTERN_SCRIPT: &str = r#"
local keys = redis.call('KEYS', ARGV[1])
local removed = 0
for i = 1, #keys, 500 do
    removed = removed + redis.call('DEL', unpack(keys, i, math.min(i + 499, #keys)))
end
return removed
"#;

/// Redis-backed [`KeyValueStore`].
pub struct RedisStore {
    pool: Pool,
    del_pattern_script: Script,
}

impl RedisStore {
    /// Build a pooled store from settings. Fails only on malformed
    /// configuration; an unreachable server surfaces per-operation instead,
    /// where the engine degrades it to a miss.
    pub fn new(settings: &StoreSettings) -> Result<Self, StoreError> {
        let mut config = Config::from_url(settings.url.clone());
        config.pool = Some(PoolConfig::new(settings.pool_size.get()));

        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|err| StoreError::unavailable(format!("failed to create pool: {err}")))?;

        Ok(Self {
            pool,
            del_pattern_script: Script::new(DEL_PATTERN_SCRIPT),
        })
    }

    async fn connection(&self) -> Result<Connection, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|err| StoreError::unavailable(err.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        conn.get(key)
            .await
            .map_err(|err| StoreError::command(err.to_string()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let seconds = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(key, value, seconds)
            .await
            .map_err(|err| StoreError::command(err.to_string()))?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.connection().await?;
        conn.del(key)
            .await
            .map_err(|err| StoreError::command(err.to_string()))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.connection().await?;
        let mut found = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|err| StoreError::command(err.to_string()))?;

            found.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(found)
    }

    async fn del_many(&self, keys: &[String]) -> Result<u64, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection().await?;
        conn.del(keys)
            .await
            .map_err(|err| StoreError::command(err.to_string()))
    }

    async fn del_pattern(&self, pattern: &str) -> Result<u64, StoreError> {
        let mut conn = self.connection().await?;
        self.del_pattern_script
            .arg(pattern)
            .invoke_async(&mut conn)
            .await
            .map_err(|err| StoreError::command(err.to_string()))
    }
}
