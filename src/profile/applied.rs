//! Profiles that are ready to apply.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::parser::LoadedRemoteProfile;
use crate::secrets::LoadedSecret;

/// A refreshed profile together with every secret it declared.
///
/// Only built once the whole pipeline succeeded, so `secrets` holds an entry
/// for each declared secret name. It is `None` when the profile declares no
/// secrets at all.
#[derive(Debug, Clone)]
pub struct AppliedProfile {
    pub profile: LoadedRemoteProfile,
    pub secrets: Option<BTreeMap<String, LoadedSecret>>,
}

impl AppliedProfile {
    pub fn new(
        profile: LoadedRemoteProfile,
        secrets: Option<BTreeMap<String, LoadedSecret>>,
    ) -> Self {
        Self { profile, secrets }
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn version(&self) -> &str {
        &self.profile.version
    }

    /// Render the profile and its resolved secrets as one JSON document:
    ///
    /// ```json
    /// { "name": "web", "version": "4", "contents": { ... }, "secrets": { "db": ... } }
    /// ```
    ///
    /// The output contains plaintext secret values and must not be logged.
    pub fn to_value(&self) -> Value {
        let secrets: Map<String, Value> = self
            .secrets
            .iter()
            .flatten()
            .map(|(name, secret)| (name.clone(), secret.to_value()))
            .collect();

        serde_json::json!({
            "name": self.profile.name,
            "version": self.profile.version,
            "contents": self.profile.contents.to_value(),
            "secrets": secrets,
        })
    }
}
