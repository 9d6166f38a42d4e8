//! # Structured Logging
//!
//! Subscriber setup and span macros for the agent.
//!
//! The filter defaults to the configured `log_level` and can be overridden
//! with `RUST_LOG`. With `json_logging` enabled every event is emitted as one
//! JSON object per line, span fields included.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::{AgentConfig, ObservabilityConfig};
use crate::errors::{ProfileSyncError, Result};

/// Create a tracing span for one profile refresh attempt.
///
/// Every attempt gets a fresh `refresh_id`, so all events of one attempt can
/// be grouped even when the same profile is refreshed every cycle:
///
/// ```rust,ignore
/// let span = refresh_span!("web");
/// let span = refresh_span!("web", current_version = "4");
/// ```
#[macro_export]
macro_rules! refresh_span {
    ($profile:expr) => {
        tracing::info_span!(
            "profile_refresh",
            profile = %$profile,
            refresh_id = %uuid::Uuid::new_v4()
        )
    };
    ($profile:expr, $($field:tt)*) => {
        tracing::info_span!(
            "profile_refresh",
            profile = %$profile,
            refresh_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a tracing span for one refresh cycle over all profiles.
#[macro_export]
macro_rules! cycle_span {
    ($cycle:expr) => {
        tracing::info_span!("refresh_cycle", cycle = $cycle, cycle_id = %uuid::Uuid::new_v4())
    };
}

/// Install the global `tracing` subscriber.
///
/// An already-installed subscriber (integration tests, embedding
/// applications) is left in place.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            ProfileSyncError::config(format!("Invalid log level '{}': {}", config.log_level, e))
        })?,
    };

    let builder = FmtSubscriber::builder().with_env_filter(filter);
    let installed = if config.json_logging {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if let Err(e) = installed {
        tracing::debug!(error = %e, "Global subscriber already installed; keeping it");
    }
    Ok(())
}

/// Log the effective configuration at startup. Secret material is omitted.
pub fn log_config_info(config: &AgentConfig) {
    tracing::info!(
        client_id = %config.client_id,
        profiles = config.profiles.len(),
        refresh_interval_seconds = config.refresh_interval_seconds,
        config_store = %config.config_store.base_url,
        secrets_backend = %config.secrets.backend,
        metrics_port = ?config.observability.metrics_port,
        "profilesync agent configuration"
    );
}
