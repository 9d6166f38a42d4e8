//! Errors returned by [`SecretsClient`](super::SecretsClient) implementations
//! and by secret value interpretation.
//!
//! None of the messages may contain a secret value.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SecretsError>;

#[derive(Error, Debug)]
pub enum SecretsError {
    /// The secret, or the pinned version of it, does not exist in the store.
    #[error("Secret not found: {key}")]
    NotFound { key: String },

    /// The store could not be reached.
    #[error("Secrets store unreachable: {message}")]
    ConnectionFailed { message: String },

    /// The store rejected the agent's credentials.
    #[error("Access to secret denied: {message}")]
    AuthenticationFailed { message: String },

    /// The value does not match the content type the profile declared.
    #[error("Invalid secret value: {reason}")]
    InvalidValue { reason: String },

    /// The store answered, but not with something usable.
    #[error("Secrets backend error: {message}")]
    BackendError { message: String },

    /// The backend could not be set up from configuration.
    #[error("Secrets backend misconfigured: {message}")]
    ConfigError { message: String },

    #[error("Failed to encode secret data: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Resolver bookkeeping went wrong.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SecretsError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed { message: message.into() }
    }

    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed { message: message.into() }
    }

    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue { reason: reason.into() }
    }

    pub fn backend_error(message: impl Into<String>) -> Self {
        Self::BackendError { message: message.into() }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Whether a later resolution pass could succeed without any change to
    /// the profile or the agent configuration.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::BackendError { .. })
    }
}
