//! Environment variable secrets backend.
//!
//! Intended for **development and testing only**. Secret ids are mapped to
//! environment variables with the `PROFILESYNC_SECRET_` prefix: the id is
//! upper-cased and every character that is not ASCII alphanumeric becomes `_`.
//!
//! ```bash
//! # resolves secret_id "prod/db-password"
//! export PROFILESYNC_SECRET_PROD_DB_PASSWORD="hunter2"
//! ```
//!
//! Version pins cannot be honored: a locator pinned to a `version_id` is
//! rejected, and the only accepted stage is the default current stage.

use async_trait::async_trait;
use std::env;

use super::client::{SecretValue, SecretsBackendType, SecretsClient};
use super::error::{Result, SecretsError};
use super::reference::{SecretLocator, DEFAULT_VERSION_STAGE};

/// Environment variable prefix for secrets.
const SECRET_PREFIX: &str = "PROFILESYNC_SECRET_";

/// Environment variable secrets backend (development only).
#[derive(Debug, Clone, Default)]
pub struct EnvVarSecretsClient {}

impl EnvVarSecretsClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn secret_id_to_env_var(secret_id: &str) -> String {
        let suffix: String = secret_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{}{}", SECRET_PREFIX, suffix)
    }
}

#[async_trait]
impl SecretsClient for EnvVarSecretsClient {
    async fn get_secret_value(&self, locator: &SecretLocator) -> Result<SecretValue> {
        if locator.version_id.is_some() {
            return Err(SecretsError::config_error(format!(
                "Cannot resolve '{}': the environment backend does not support version pins",
                locator
            )));
        }
        if let Some(stage) = locator.version_stage.as_deref() {
            if stage != DEFAULT_VERSION_STAGE {
                return Err(SecretsError::not_found(locator.to_string()));
            }
        }

        let env_var = Self::secret_id_to_env_var(&locator.secret_id);
        env::var(&env_var).map(SecretValue::new).map_err(|_| {
            SecretsError::not_found(format!(
                "Secret '{}' not found in environment (looking for {})",
                locator.secret_id, env_var
            ))
        })
    }

    fn backend_type(&self) -> SecretsBackendType {
        SecretsBackendType::Env
    }
}
