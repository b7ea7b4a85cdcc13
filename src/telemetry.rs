//! Tracing subscriber installation and metric descriptions.

use std::sync::Once;

use metrics::{Unit, describe_counter};
use thiserror::Error;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

pub(crate) const METRIC_HIT: &str = "sidecache_hit_total";
pub(crate) const METRIC_MISS: &str = "sidecache_miss_total";
pub(crate) const METRIC_SELF_HEAL: &str = "sidecache_self_heal_total";
pub(crate) const METRIC_STORE_ERROR: &str = "sidecache_store_error_total";
pub(crate) const METRIC_INVALIDATED: &str = "sidecache_invalidated_total";

static METRIC_DESCRIPTIONS: Once = Once::new();

#[derive(Debug, Error)]
#[error("telemetry initialization failed: {0}")]
pub struct TelemetryError(String);

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), TelemetryError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| TelemetryError(format!("failed to install tracing subscriber: {err}")))
}

/// Register metric descriptions. Safe to call more than once; idempotent.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_HIT,
            Unit::Count,
            "Total number of cache hits, labeled by entity."
        );
        describe_counter!(
            METRIC_MISS,
            Unit::Count,
            "Total number of cache misses, labeled by entity."
        );
        describe_counter!(
            METRIC_SELF_HEAL,
            Unit::Count,
            "Total number of corrupt cache entries discarded on read."
        );
        describe_counter!(
            METRIC_STORE_ERROR,
            Unit::Count,
            "Total number of store faults absorbed by the fail-open policy."
        );
        describe_counter!(
            METRIC_INVALIDATED,
            Unit::Count,
            "Total number of cache entries removed by bulk invalidation."
        );
    });
}
