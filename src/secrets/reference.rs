//! Secret references declared inside configuration profiles.
//!
//! A profile points at secrets rather than embedding them. Each reference
//! carries the logical `name` downstream consumers use and a [`SecretLocator`]
//! identifying the value in the secrets store. Two references with the same
//! locator resolve to the same cached value, whatever their names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version stage requested when a reference pins neither a version id nor a stage.
pub const DEFAULT_VERSION_STAGE: &str = "AWSCURRENT";

/// Lookup key into the remote secrets store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecretLocator {
    pub secret_id: String,
    pub version_id: Option<String>,
    pub version_stage: Option<String>,
}

impl SecretLocator {
    /// Locator for the current version of `secret_id`.
    pub fn new(secret_id: impl Into<String>) -> Self {
        Self::pinned(secret_id, None, None)
    }

    /// Locator with an explicit version id and/or stage.
    ///
    /// When neither is given the stage defaults to [`DEFAULT_VERSION_STAGE`].
    pub fn pinned(
        secret_id: impl Into<String>,
        version_id: Option<String>,
        version_stage: Option<String>,
    ) -> Self {
        let version_stage = match (&version_id, version_stage) {
            (None, None) => Some(DEFAULT_VERSION_STAGE.to_string()),
            (_, stage) => stage,
        };
        Self { secret_id: secret_id.into(), version_id, version_stage }
    }
}

impl fmt::Display for SecretLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.secret_id)?;
        if let Some(version_id) = &self.version_id {
            write!(f, "@{}", version_id)?;
        }
        if let Some(stage) = &self.version_stage {
            write!(f, "#{}", stage)?;
        }
        Ok(())
    }
}

/// How a secret's value should be interpreted once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SecretContentType {
    #[default]
    #[serde(rename = "text/plain")]
    TextPlain,
    #[serde(rename = "application/json")]
    ApplicationJson,
}

impl SecretContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextPlain => "text/plain",
            Self::ApplicationJson => "application/json",
        }
    }
}

impl FromStr for SecretContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text/plain" => Ok(Self::TextPlain),
            "application/json" => Ok(Self::ApplicationJson),
            _ => Err(format!("Unsupported secret content type: {}", s)),
        }
    }
}

impl fmt::Display for SecretContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A secret declared by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretReference {
    pub name: String,
    pub locator: SecretLocator,
    pub content_type: SecretContentType,
}

impl SecretReference {
    pub fn new(name: impl Into<String>, locator: SecretLocator) -> Self {
        Self { name: name.into(), locator, content_type: SecretContentType::default() }
    }

    pub fn with_content_type(mut self, content_type: SecretContentType) -> Self {
        self.content_type = content_type;
        self
    }
}
