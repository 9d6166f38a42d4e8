//! HashiCorp Vault secrets backend.
//!
//! Resolves locators against a KV v2 engine. The locator's `secret_id` is the
//! path within the mount, and a pinned `version_id` must be a KV version
//! number. Vault has no version stages, so only the default current stage is
//! accepted.
//!
//! ## Secret Format in Vault
//!
//! A secret stored with a single `value` field resolves to that field:
//!
//! ```json
//! { "value": "hunter2" }
//! ```
//!
//! Any other shape resolves to the whole data map rendered as JSON, which
//! pairs with an `application/json` content type on the reference.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, error, info};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::kv2;

use super::client::{SecretValue, SecretsBackendType, SecretsClient};
use super::error::{Result, SecretsError};
use super::reference::{SecretLocator, DEFAULT_VERSION_STAGE};
use crate::config::VaultConfig;

/// HashiCorp Vault KV v2 secrets client.
pub struct VaultSecretsClient {
    client: VaultClient,
    kv_mount_path: String,
}

impl std::fmt::Debug for VaultSecretsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretsClient")
            .field("kv_mount_path", &self.kv_mount_path)
            .field("client", &"[VaultClient]")
            .finish()
    }
}

impl VaultSecretsClient {
    /// Create a new Vault client. No request is made until a secret is resolved.
    pub fn new(config: &VaultConfig) -> Result<Self> {
        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&config.address);

        if let Some(ref token) = config.token {
            settings_builder.token(token.expose_secret());
        }

        if let Some(ref namespace) = config.namespace {
            settings_builder.namespace(Some(namespace.clone()));
        }

        let settings = settings_builder.build().map_err(|e| {
            SecretsError::config_error(format!("Invalid Vault configuration: {}", e))
        })?;

        let client = VaultClient::new(settings).map_err(|e| {
            SecretsError::config_error(format!("Failed to create Vault client: {}", e))
        })?;

        info!(address = %config.address, kv_mount = %config.kv_mount_path, "Initialized Vault secrets client");

        Ok(Self { client, kv_mount_path: config.kv_mount_path.clone() })
    }

    fn pinned_version(locator: &SecretLocator) -> Result<Option<u64>> {
        if let Some(stage) = locator.version_stage.as_deref() {
            if stage != DEFAULT_VERSION_STAGE {
                return Err(SecretsError::config_error(format!(
                    "Vault has no version stages; cannot resolve stage '{}' of '{}'",
                    stage, locator.secret_id
                )));
            }
        }

        locator
            .version_id
            .as_deref()
            .map(|v| {
                v.parse::<u64>().map_err(|_| {
                    SecretsError::config_error(format!(
                        "Vault KV versions are numeric; got version_id '{}' for '{}'",
                        v, locator.secret_id
                    ))
                })
            })
            .transpose()
    }

    fn map_client_error(locator: &SecretLocator, err: ClientError) -> SecretsError {
        match err {
            ClientError::APIError { code: 404, .. } => SecretsError::not_found(locator.to_string()),
            ClientError::APIError { code: 401 | 403, .. } => SecretsError::authentication_failed(
                format!("Vault denied access to '{}'", locator.secret_id),
            ),
            ClientError::RestClientError { source } => {
                SecretsError::connection_failed(source.to_string())
            }
            other => SecretsError::backend_error(other.to_string()),
        }
    }

    fn extract_value(data: HashMap<String, serde_json::Value>) -> Result<String> {
        if data.len() == 1 {
            if let Some(serde_json::Value::String(value)) = data.get("value") {
                return Ok(value.clone());
            }
        }
        Ok(serde_json::to_string(&data)?)
    }
}

#[async_trait]
impl SecretsClient for VaultSecretsClient {
    async fn get_secret_value(&self, locator: &SecretLocator) -> Result<SecretValue> {
        let version = Self::pinned_version(locator)?;

        debug!(
            secret_id = %locator.secret_id,
            version = ?version,
            kv_mount = %self.kv_mount_path,
            "Fetching secret from Vault"
        );

        let read: std::result::Result<HashMap<String, serde_json::Value>, ClientError> =
            match version {
                Some(v) => {
                    kv2::read_version(&self.client, &self.kv_mount_path, &locator.secret_id, v)
                        .await
                }
                None => kv2::read(&self.client, &self.kv_mount_path, &locator.secret_id).await,
            };

        let data = read.map_err(|e| {
            error!(secret_id = %locator.secret_id, error = %e, "Failed to fetch secret from Vault");
            Self::map_client_error(locator, e)
        })?;

        let mut value = SecretValue::new(Self::extract_value(data)?);
        if let Some(v) = version {
            value = value.with_version(v.to_string());
        }
        Ok(value)
    }

    fn backend_type(&self) -> SecretsBackendType {
        SecretsBackendType::Vault
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_version_parsing() {
        let unpinned = SecretLocator::new("app/db");
        assert_eq!(VaultSecretsClient::pinned_version(&unpinned).unwrap(), None);

        let pinned = SecretLocator::pinned("app/db", Some("4".into()), None);
        assert_eq!(VaultSecretsClient::pinned_version(&pinned).unwrap(), Some(4));

        let bad = SecretLocator::pinned("app/db", Some("abc".into()), None);
        assert!(VaultSecretsClient::pinned_version(&bad).is_err());
    }

    #[test]
    fn test_stage_other_than_current_rejected() {
        let staged = SecretLocator::pinned("app/db", None, Some("AWSPENDING".into()));
        assert!(VaultSecretsClient::pinned_version(&staged).is_err());
    }

    #[test]
    fn test_extract_single_value_field() {
        let mut data = HashMap::new();
        data.insert("value".to_string(), serde_json::json!("hunter2"));
        assert_eq!(VaultSecretsClient::extract_value(data).unwrap(), "hunter2");
    }

    #[test]
    fn test_extract_map_as_json() {
        let mut data = HashMap::new();
        data.insert("user".to_string(), serde_json::json!("app"));
        data.insert("password".to_string(), serde_json::json!("hunter2"));

        let rendered = VaultSecretsClient::extract_value(data).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["user"], "app");
    }

    #[test]
    fn test_client_creation_is_offline() {
        let config = VaultConfig {
            address: "http://127.0.0.1:8200".to_string(),
            token: Some("root".into()),
            namespace: None,
            kv_mount_path: "secret".to_string(),
        };
        let client = VaultSecretsClient::new(&config).unwrap();
        assert_eq!(client.backend_type(), SecretsBackendType::Vault);
        assert!(format!("{:?}", client).contains("secret"));
    }
}
