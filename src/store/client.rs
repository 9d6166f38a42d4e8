//! Config store client abstraction.

use async_trait::async_trait;
use bytes::Bytes;

use super::error::ConfigStoreError;

/// Identifies one remote configuration and the version the caller holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationRequest {
    pub application: String,
    pub environment: String,
    pub configuration: String,
    pub client_id: String,
    /// Version the caller last applied, if any
    pub client_configuration_version: Option<String>,
}

/// A configuration as returned by the store.
///
/// When `configuration_version` equals the requested
/// `client_configuration_version` the caller already has this version and
/// `content` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationResponse {
    pub configuration_version: String,
    pub content: Bytes,
    pub content_type: String,
}

/// Read access to a remote configuration store.
#[async_trait]
pub trait ConfigStoreClient: Send + Sync {
    async fn get_configuration(
        &self,
        request: &ConfigurationRequest,
    ) -> Result<ConfigurationResponse, ConfigStoreError>;
}
