//! Static profile definitions and the applied-version cursor.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A configuration profile the agent keeps in sync, as declared in the
/// agent configuration. Immutable for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProfileDefinition {
    /// Local profile name (the key in the `[profiles]` table)
    #[serde(skip)]
    pub name: String,

    /// Remote application identifier
    #[validate(length(min = 1, message = "application cannot be empty"))]
    pub application: String,

    /// Remote environment identifier
    #[validate(length(min = 1, message = "environment cannot be empty"))]
    pub environment: String,

    /// Remote configuration profile identifier
    #[validate(length(min = 1, message = "profile cannot be empty"))]
    pub profile: String,
}

impl ProfileDefinition {
    pub fn new(
        name: impl Into<String>,
        application: impl Into<String>,
        environment: impl Into<String>,
        profile: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            application: application.into(),
            environment: environment.into(),
            profile: profile.into(),
        }
    }
}

/// The version of a profile the agent last applied successfully.
///
/// `version` is an opaque token issued by the config store and is `None`
/// until the first successful refresh. A new cursor replaces the old one
/// only after a refresh fully succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyingProfile {
    pub name: String,
    pub version: Option<String>,
}

impl ApplyingProfile {
    /// Cursor for a profile that has never been applied.
    pub fn initial(name: impl Into<String>) -> Self {
        Self { name: name.into(), version: None }
    }

    pub fn at_version(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self { name: name.into(), version: Some(version.into()) }
    }
}
