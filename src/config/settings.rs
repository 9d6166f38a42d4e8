//! # Configuration Settings
//!
//! Defines the configuration structure for the profilesync agent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use validator::Validate;

use crate::errors::{ProfileSyncError, Result};
use crate::profile::ProfileDefinition;
use crate::secrets::{SecretString, SecretsBackendType};

/// Main agent configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AgentConfig {
    /// Identity reported to the config store
    #[serde(default = "default_client_id")]
    #[validate(length(min = 1, message = "client_id cannot be empty"))]
    pub client_id: String,

    /// Profiles to keep in sync, keyed by local profile name
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileDefinition>,

    /// Delay between refresh cycles
    #[serde(default = "default_refresh_interval_seconds")]
    #[validate(range(
        min = 1,
        max = 86400,
        message = "Refresh interval must be between 1 and 86400 seconds"
    ))]
    pub refresh_interval_seconds: u64,

    /// Config store connection
    #[serde(default)]
    #[validate(nested)]
    pub config_store: ConfigStoreConfig,

    /// Secrets store connection
    #[serde(default)]
    #[validate(nested)]
    pub secrets: SecretsConfig,

    /// Logging and metrics
    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

fn default_client_id() -> String {
    format!("profilesync-{}", uuid::Uuid::new_v4())
}

fn default_refresh_interval_seconds() -> u64 {
    60
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            profiles: BTreeMap::new(),
            refresh_interval_seconds: default_refresh_interval_seconds(),
            config_store: ConfigStoreConfig::default(),
            secrets: SecretsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(ProfileSyncError::from)?;

        self.validate_custom()?;

        Ok(())
    }

    /// Rules spanning several fields
    fn validate_custom(&self) -> Result<()> {
        if self.profiles.is_empty() {
            return Err(ProfileSyncError::validation_field(
                "At least one profile must be configured",
                "profiles",
            ));
        }

        for (name, definition) in &self.profiles {
            if name.is_empty() {
                return Err(ProfileSyncError::validation_field(
                    "Profile names cannot be empty",
                    "profiles",
                ));
            }
            Validate::validate(definition).map_err(|e| {
                ProfileSyncError::validation_field(e.to_string(), format!("profiles.{}", name))
            })?;
        }

        if self.secrets.backend == SecretsBackendType::Vault && self.secrets.vault.is_none() {
            return Err(ProfileSyncError::validation_field(
                "secrets.backend is 'vault' but [secrets.vault] is missing",
                "secrets.vault",
            ));
        }

        Ok(())
    }

    /// Copy each profile's table key into its definition.
    pub(crate) fn assign_profile_names(&mut self) {
        for (name, definition) in self.profiles.iter_mut() {
            definition.name = name.clone();
        }
    }

    /// Profile definitions in name order.
    pub fn profile_definitions(&self) -> Vec<ProfileDefinition> {
        self.profiles.values().cloned().collect()
    }

    /// Get refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }
}

/// HTTP config store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConfigStoreConfig {
    /// Base URL of the config store
    #[validate(length(min = 1, message = "Config store base_url cannot be empty"))]
    pub base_url: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

impl Default for ConfigStoreConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:2772".to_string(), timeout_seconds: 30 }
    }
}

impl ConfigStoreConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Secrets backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SecretsConfig {
    #[serde(default)]
    pub backend: SecretsBackendType,

    #[serde(default)]
    #[validate(nested)]
    pub vault: Option<VaultConfig>,
}

/// HashiCorp Vault connection settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VaultConfig {
    /// Vault server address
    #[validate(length(min = 1, message = "Vault address cannot be empty"))]
    pub address: String,

    /// Vault token (falls back to the client library's own lookup when absent)
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Vault Enterprise namespace
    #[serde(default)]
    pub namespace: Option<String>,

    /// KV v2 mount path
    #[serde(default = "default_kv_mount_path")]
    #[validate(length(min = 1, message = "KV mount path cannot be empty"))]
    pub kv_mount_path: String,
}

fn default_kv_mount_path() -> String {
    "secret".to_string()
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Prometheus exporter port (None = disabled)
    #[validate(range(min = 1, message = "Metrics port must be between 1 and 65535"))]
    pub metrics_port: Option<u16>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false, metrics_port: None }
    }
}
