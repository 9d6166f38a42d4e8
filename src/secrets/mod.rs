//! Secrets loading for configuration profiles.
//!
//! Profiles reference secrets instead of embedding them. Before a refreshed
//! profile can be applied, every reference it declares has to be resolved
//! against a remote secrets store.
//!
//! # Architecture
//!
//! - [`SecretReference`] / [`SecretLocator`]: what a profile asks for. Locators
//!   are the cache identity, so two profiles naming the same secret share one
//!   resolved value.
//! - [`SecretsClient`]: backend-agnostic read access to the store
//!   ([`VaultSecretsClient`], [`EnvVarSecretsClient`]).
//! - [`SecretsCache`]: loaded and pending secrets, shared by every profile in a
//!   refresh cycle.
//! - [`SecretsResolver`]: runs resolution passes over the cache and reports
//!   per-secret failures without aborting the rest of the batch.
//!
//! # Example
//!
//! ```rust,ignore
//! use profilesync::secrets::{EnvVarSecretsClient, SecretsCache, SecretsResolver};
//! use std::sync::Arc;
//!
//! let resolver = SecretsResolver::new(Arc::new(EnvVarSecretsClient::new()));
//! let mut cache = SecretsCache::new();
//!
//! // Resolve the secrets one profile declares; shared locators hit the cache
//! let secrets = resolver.resolve(&profile.secret_defs, &mut cache).await?;
//! ```
//!
//! # Security Considerations
//!
//! - Secret values are wrapped in [`SecretString`] and never logged
//! - Resolved values live in memory only and are zeroed on drop
//! - The environment backend is for development only

pub mod cache;
pub mod client;
pub mod env;
pub mod error;
pub mod loaded;
pub mod reference;
pub mod resolver;
pub mod types;
#[cfg(feature = "vault")]
pub mod vault;

use std::sync::Arc;
use tracing::info;

pub use cache::SecretsCache;
pub use client::{SecretValue, SecretsBackendType, SecretsClient};
pub use env::EnvVarSecretsClient;
pub use error::{Result, SecretsError};
pub use loaded::LoadedSecret;
pub use reference::{SecretContentType, SecretLocator, SecretReference, DEFAULT_VERSION_STAGE};
pub use resolver::{SecretLoadError, SecretResolutionErrors, SecretsResolver};
pub use types::SecretString;
#[cfg(feature = "vault")]
pub use vault::VaultSecretsClient;

use crate::config::SecretsConfig;

/// Build the secrets client selected by configuration.
pub fn build_client(config: &SecretsConfig) -> Result<Arc<dyn SecretsClient>> {
    let client: Arc<dyn SecretsClient> = match config.backend {
        SecretsBackendType::Env => Arc::new(EnvVarSecretsClient::new()),
        #[cfg(feature = "vault")]
        SecretsBackendType::Vault => {
            let vault = config.vault.as_ref().ok_or_else(|| {
                SecretsError::config_error("secrets.backend is 'vault' but [secrets.vault] is missing")
            })?;
            Arc::new(VaultSecretsClient::new(vault)?)
        }
        #[cfg(not(feature = "vault"))]
        SecretsBackendType::Vault => {
            return Err(SecretsError::config_error(
                "secrets.backend is 'vault' but this build was compiled without the 'vault' feature",
            ));
        }
    };

    info!(backend = %client.backend_type(), "Configured secrets backend");
    Ok(client)
}
