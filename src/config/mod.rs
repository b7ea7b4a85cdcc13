//! Configuration layer: typed settings with layered precedence (file → env).

use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "sidecache";
const DEFAULT_STORE_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_POOL_SIZE: usize = 16;
const DEFAULT_LIST_TTL_SECS: u64 = 300;
const DEFAULT_ALL_TTL_SECS: u64 = 900;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub store: StoreSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub url: String,
    pub pool_size: NonZeroUsize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_STORE_URL.to_string(),
            pool_size: NonZeroUsize::new(DEFAULT_POOL_SIZE).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// Cache behavior knobs shared by every engine instance.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Time-to-live for paginated (`list` scope) entries.
    pub list_ttl: Duration,
    /// Time-to-live for unpaginated (`all` scope) entries. Longer than the
    /// list TTL: those reads back more static data and every write
    /// invalidates them anyway.
    pub all_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            list_ttl: Duration::from_secs(DEFAULT_LIST_TTL_SECS),
            all_ttl: Duration::from_secs(DEFAULT_ALL_TTL_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment).
///
/// Reads `config/default.*` and `sidecache.*` when present, an explicit file
/// when given, then `SIDECACHE__`-prefixed environment variables
/// (e.g. `SIDECACHE__STORE__URL`).
pub fn load(config_file: Option<&Path>) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("SIDECACHE").separator("__"));

    let raw: RawSettings = builder.build()?.try_deserialize()?;
    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    store: RawStoreSettings,
    cache: RawCacheSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStoreSettings {
    url: Option<String>,
    pool_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    list_ttl_seconds: Option<u64>,
    all_ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let store_defaults = StoreSettings::default();
        let pool_size = match raw.store.pool_size {
            Some(size) => NonZeroUsize::new(size)
                .ok_or_else(|| LoadError::invalid("store.pool_size", "must be greater than zero"))?,
            None => store_defaults.pool_size,
        };
        let store = StoreSettings {
            url: raw.store.url.unwrap_or(store_defaults.url),
            pool_size,
        };

        let cache_defaults = CacheSettings::default();
        let list_ttl = raw
            .cache
            .list_ttl_seconds
            .map_or(cache_defaults.list_ttl, Duration::from_secs);
        let all_ttl = raw
            .cache
            .all_ttl_seconds
            .map_or(cache_defaults.all_ttl, Duration::from_secs);
        if list_ttl.is_zero() {
            return Err(LoadError::invalid(
                "cache.list_ttl_seconds",
                "must be greater than zero",
            ));
        }
        if all_ttl.is_zero() {
            return Err(LoadError::invalid(
                "cache.all_ttl_seconds",
                "must be greater than zero",
            ));
        }
        let cache = CacheSettings {
            enabled: raw.cache.enabled.unwrap_or(true),
            list_ttl,
            all_ttl,
        };

        let logging = build_logging_settings(raw.logging)?;

        Ok(Self {
            store,
            cache,
            logging,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let defaults = LoggingSettings::default();

    let level = match logging.level {
        Some(value) => value
            .parse::<LevelFilter>()
            .map_err(|err| LoadError::invalid("logging.level", err.to_string()))?,
        None => defaults.level,
    };

    let format = match logging.json {
        Some(true) => LogFormat::Json,
        Some(false) => LogFormat::Compact,
        None => defaults.format,
    };

    Ok(LoggingSettings { level, format })
}
