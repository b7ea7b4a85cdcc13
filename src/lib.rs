//! Sidecache
//!
//! A fail-open cache-aside layer for paginated query results, built on a
//! minimal key-value store contract (get / set-with-expiry / delete /
//! pattern enumeration):
//!
//! - **Cache Engine**: one generic component per cached entity; owns all
//!   failure-handling policy (degrade to miss, self-heal corrupt entries,
//!   never surface a cache error to the caller)
//! - **Key derivation**: deterministic `<prefix>:{list|all}:<sha256>` keys
//!   from a pagination descriptor plus an ordered filter field list
//! - **Store adapters**: Redis for production, in-memory for tests and
//!   single-node deployments
//!
//! ## Configuration
//!
//! Behavior is controlled via a layered configuration (file, then
//! `SIDECACHE__`-prefixed environment variables):
//!
//! ```toml
//! [store]
//! url = "redis://127.0.0.1:6379"
//!
//! [cache]
//! list_ttl_seconds = 300
//! all_ttl_seconds = 900
//! # ... see config for all options
//! ```

pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod keys;
pub mod query;
pub mod store;
pub mod telemetry;

pub use config::{CacheSettings, LogFormat, LoggingSettings, Settings, StoreSettings};
pub use engine::{CacheEngine, EngineConfig};
pub use entities::{QueryFilter, derive_all_key, derive_list_key, invalidation_pattern};
pub use error::StoreError;
pub use keys::{EntityKeys, Field, KeyFields};
pub use query::{PageRequest, PagedResponse, SortDirection};
pub use store::{KeyValueStore, memory::InMemoryStore, redis::RedisStore};
