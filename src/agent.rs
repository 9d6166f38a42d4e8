//! Long-lived agent state and wiring.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, Instrument};

use crate::config::AgentConfig;
use crate::cycle_span;
use crate::errors::Result;
use crate::fetcher::ConfigFetcher;
use crate::profile::{AppliedProfile, ApplyingProfile, ProfileDefinition};
use crate::refresh::{CycleReport, RefreshCycle};
use crate::secrets::{self, SecretsCache, SecretsClient, SecretsResolver};
use crate::store::{ConfigStoreClient, HttpConfigStoreClient};

/// What the agent knows about each profile between cycles.
///
/// Holds one [`ApplyingProfile`] per profile and the most recent
/// [`AppliedProfile`]. Both are replaced together, and only after a refresh
/// fully succeeded.
#[derive(Debug, Default)]
pub struct AgentState {
    definitions: BTreeMap<String, ProfileDefinition>,
    applying: BTreeMap<String, ApplyingProfile>,
    applied: BTreeMap<String, AppliedProfile>,
}

impl AgentState {
    pub fn new(definitions: impl IntoIterator<Item = ProfileDefinition>) -> Self {
        let definitions: BTreeMap<_, _> =
            definitions.into_iter().map(|d| (d.name.clone(), d)).collect();
        let applying =
            definitions.keys().map(|name| (name.clone(), ApplyingProfile::initial(name))).collect();

        Self { definitions, applying, applied: BTreeMap::new() }
    }

    /// Profile definitions in name order.
    pub fn definitions(&self) -> impl Iterator<Item = &ProfileDefinition> {
        self.definitions.values()
    }

    pub fn applying(&self, name: &str) -> Option<&ApplyingProfile> {
        self.applying.get(name)
    }

    pub(crate) fn applying_or_initial(&self, name: &str) -> ApplyingProfile {
        self.applying.get(name).cloned().unwrap_or_else(|| ApplyingProfile::initial(name))
    }

    pub fn applied(&self, name: &str) -> Option<&AppliedProfile> {
        self.applied.get(name)
    }

    /// Record a successful refresh.
    pub fn commit(&mut self, applying: ApplyingProfile, profile: AppliedProfile) {
        self.applied.insert(applying.name.clone(), profile);
        self.applying.insert(applying.name.clone(), applying);
    }
}

/// A configured agent: state, secrets cache and the clients to refresh them.
pub struct Agent {
    state: AgentState,
    secrets_cache: SecretsCache,
    cycle: RefreshCycle,
    cycles_run: u64,
}

impl Agent {
    /// Wire an agent from explicit clients.
    pub fn new(
        config: &AgentConfig,
        store: Arc<dyn ConfigStoreClient>,
        secrets_client: Arc<dyn SecretsClient>,
    ) -> Self {
        let fetcher = ConfigFetcher::new(store, config.client_id.clone());
        let resolver = SecretsResolver::new(secrets_client);

        Self {
            state: AgentState::new(config.profile_definitions()),
            secrets_cache: SecretsCache::new(),
            cycle: RefreshCycle::new(fetcher, resolver),
            cycles_run: 0,
        }
    }

    /// Wire an agent with the HTTP config store and the configured secrets backend.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let store = Arc::new(HttpConfigStoreClient::new(&config.config_store)?);
        let secrets_client = secrets::build_client(&config.secrets)?;

        info!(
            client_id = %config.client_id,
            profiles = config.profiles.len(),
            "Agent initialized"
        );
        Ok(Self::new(config, store, secrets_client))
    }

    /// Refresh every profile once.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycles_run += 1;
        let span = cycle_span!(self.cycles_run);
        self.cycle.run(&mut self.state, &mut self.secrets_cache).instrument(span).await
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn secrets_cache(&self) -> &SecretsCache {
        &self.secrets_cache
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::parser;
    use bytes::Bytes;

    fn definition(name: &str) -> ProfileDefinition {
        ProfileDefinition::new(name, "shop", "prod", name)
    }

    #[test]
    fn test_state_starts_unapplied_in_name_order() {
        let state = AgentState::new(vec![definition("web"), definition("api")]);

        let names: Vec<_> = state.definitions().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["api", "web"]);
        assert_eq!(state.applying("web").unwrap().version, None);
        assert!(state.applied("web").is_none());
    }

    #[test]
    fn test_commit_replaces_cursor_and_snapshot() {
        let mut state = AgentState::new(vec![definition("web")]);
        let profile =
            parser::parse("web", "2", Bytes::from_static(b"hello"), "text/plain").unwrap();

        state.commit(ApplyingProfile::at_version("web", "2"), AppliedProfile::new(profile, None));

        assert_eq!(state.applying("web").unwrap().version.as_deref(), Some("2"));
        assert_eq!(state.applied("web").unwrap().version(), "2");
    }

    #[test]
    fn test_applying_or_initial_for_unknown_profile() {
        let state = AgentState::default();
        assert_eq!(state.applying_or_initial("ghost"), ApplyingProfile::initial("ghost"));
    }
}
