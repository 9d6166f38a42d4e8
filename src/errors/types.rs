//! # Error Types
//!
//! Comprehensive error types for the profilesync agent using `thiserror`.

/// Custom result type for profilesync operations
pub type Result<T> = std::result::Result<T, ProfileSyncError>;

/// Main error type for the profilesync agent
#[derive(thiserror::Error, Debug)]
pub enum ProfileSyncError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Remote configuration store could not be queried for a profile
    #[error("Fetch error for profile '{profile}': {message}")]
    Fetch { profile: String, message: String },

    /// A fetched profile payload was malformed
    #[error("Parse error for profile '{profile}': {message}")]
    Parse { profile: String, message: String },

    /// One or more secrets declared by a profile failed to resolve
    #[error("Secret resolution failed for profile '{profile}': {message}")]
    SecretResolution { profile: String, message: String },

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ProfileSyncError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Check if this error should be retried on the next refresh cycle
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProfileSyncError::Io { .. }
                | ProfileSyncError::Fetch { .. }
                | ProfileSyncError::SecretResolution { .. }
        )
    }
}

impl From<std::io::Error> for ProfileSyncError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for ProfileSyncError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<config::ConfigError> for ProfileSyncError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for ProfileSyncError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect();
        fields.sort();

        Self::validation(format!("Validation failed: {}", fields.join("; ")))
    }
}

impl From<crate::secrets::SecretsError> for ProfileSyncError {
    fn from(error: crate::secrets::SecretsError) -> Self {
        Self::config_with_source("Secrets backend setup failed", Box::new(error))
    }
}

impl From<crate::store::ConfigStoreError> for ProfileSyncError {
    fn from(error: crate::store::ConfigStoreError) -> Self {
        Self::config_with_source("Config store client setup failed", Box::new(error))
    }
}

impl From<crate::refresh::RefreshError> for ProfileSyncError {
    fn from(error: crate::refresh::RefreshError) -> Self {
        use crate::refresh::RefreshErrorKind;

        let profile = error.profile().to_string();
        let message = error.kind.to_string();
        match error.kind {
            RefreshErrorKind::Fetch(_) => Self::Fetch { profile, message },
            RefreshErrorKind::Parse(_) => Self::Parse { profile, message },
            RefreshErrorKind::Secrets(_) => Self::SecretResolution { profile, message },
        }
    }
}
