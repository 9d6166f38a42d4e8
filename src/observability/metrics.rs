//! # Metrics Collection
//!
//! Prometheus counters for refresh and secret resolution activity.

use ::tracing::info;
use metrics::{counter, describe_counter, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::fmt;
use std::net::SocketAddr;

use crate::config::ObservabilityConfig;
use crate::errors::{ProfileSyncError, Result};

/// Outcome label for `profile_refresh_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcomeLabel {
    Unchanged,
    Applied,
    FetchFailed,
    ParseFailed,
    SecretsFailed,
}

impl RefreshOutcomeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Applied => "applied",
            Self::FetchFailed => "fetch_failed",
            Self::ParseFailed => "parse_failed",
            Self::SecretsFailed => "secrets_failed",
        }
    }
}

impl fmt::Display for RefreshOutcomeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics recorder that tracks agent metrics
///
/// Recording is a no-op until [`init_metrics`] installs an exporter.
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    /// Create a new metrics recorder instance
    pub fn new() -> Self {
        Self
    }

    /// Record the outcome of one profile refresh attempt
    pub fn record_profile_refresh(&self, profile: &str, outcome: RefreshOutcomeLabel) {
        let labels = [("profile", profile.to_string()), ("outcome", outcome.as_str().to_string())];
        counter!("profile_refresh_total", &labels).increment(1);
    }

    /// Record one request to the secrets store
    pub fn record_secret_fetch(&self, backend: &str, success: bool) {
        let status = if success { "success" } else { "error" };
        let labels = [("backend", backend.to_string()), ("status", status.to_string())];
        counter!("secret_fetch_total", &labels).increment(1);
    }

    /// Record declared secrets that were already resolved
    pub fn record_secret_cache_hits(&self, hits: u64) {
        if hits > 0 {
            counter!("secret_cache_hits_total").increment(hits);
        }
    }

    /// Register metric descriptions with the installed recorder
    pub fn register_metrics(&self) {
        describe_counter!(
            "profile_refresh_total",
            Unit::Count,
            "Profile refresh attempts by profile and outcome"
        );
        describe_counter!(
            "secret_fetch_total",
            Unit::Count,
            "Requests to the secrets store by backend and status"
        );
        describe_counter!(
            "secret_cache_hits_total",
            Unit::Count,
            "Declared secrets served from the secrets cache"
        );
    }
}

/// Install the Prometheus exporter when a metrics port is configured.
pub fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    let Some(port) = config.metrics_port else {
        return Ok(());
    };

    let socket_addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new().with_http_listener(socket_addr).install().map_err(|e| {
        ProfileSyncError::config(format!("Failed to initialize metrics exporter: {}", e))
    })?;

    MetricsRecorder::new().register_metrics();

    info!(metrics_addr = %socket_addr, "Metrics collection initialized");
    Ok(())
}
