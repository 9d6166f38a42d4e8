//! # Observability
//!
//! Structured logging through `tracing` and Prometheus counters through
//! `metrics`. Both are advisory: nothing in the refresh pipeline depends on
//! whether a subscriber or exporter is installed.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, log_config_info};
pub use metrics::{init_metrics, MetricsRecorder, RefreshOutcomeLabel};

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use ::tracing::info;

/// Initialize logging, then metrics when a metrics port is configured.
pub fn init_observability(config: &ObservabilityConfig) -> Result<()> {
    init_logging(config)?;
    init_metrics(config)?;

    info!(
        log_level = %config.log_level,
        json_logging = config.json_logging,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );
    Ok(())
}
