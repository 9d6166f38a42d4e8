//! Remote secrets store client trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::Result;
use super::reference::SecretLocator;
use super::types::SecretString;

/// Type of secrets store backing a [`SecretsClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretsBackendType {
    /// HashiCorp Vault KV v2
    Vault,
    /// Process environment (development only)
    #[default]
    Env,
}

impl SecretsBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vault => "vault",
            Self::Env => "env",
        }
    }
}

impl FromStr for SecretsBackendType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "vault" => Ok(Self::Vault),
            "env" => Ok(Self::Env),
            _ => Err(format!("Unknown secrets backend type: {}", s)),
        }
    }
}

impl fmt::Display for SecretsBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A value returned by the secrets store for one locator.
#[derive(Debug, Clone)]
pub struct SecretValue {
    /// Raw secret payload
    pub value: SecretString,

    /// Version id reported by the store, if it versions secrets
    pub version_id: Option<String>,

    /// When the store created this version, if reported
    pub created_at: Option<DateTime<Utc>>,
}

impl SecretValue {
    pub fn new(value: impl Into<SecretString>) -> Self {
        Self { value: value.into(), version_id: None, created_at: None }
    }

    pub fn with_version(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Read-only access to a remote secrets store.
///
/// The refresh pipeline calls [`SecretsClient::get_secret_value`] once per
/// unresolved locator. Implementations MUST NOT log secret values and are
/// expected to bound each call with their own timeout.
#[async_trait]
pub trait SecretsClient: Send + Sync {
    /// Fetch the value addressed by `locator`.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::NotFound`](super::SecretsError::NotFound) if the secret or the pinned version doesn't exist
    /// - [`SecretsError::ConnectionFailed`](super::SecretsError::ConnectionFailed) if the store is unreachable
    /// - [`SecretsError::AuthenticationFailed`](super::SecretsError::AuthenticationFailed) if auth fails
    async fn get_secret_value(&self, locator: &SecretLocator) -> Result<SecretValue>;

    /// Backend identifier, used in logs and metrics.
    fn backend_type(&self) -> SecretsBackendType;
}
