//! One refresh pass over every configured profile.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::error::{RefreshErrorKind, RefreshErrors};
use super::pipeline::{refresh_profile, RefreshContext, RefreshOutcome};
use crate::agent::AgentState;
use crate::errors::{ProfileSyncError, Result};
use crate::fetcher::ConfigFetcher;
use crate::observability::{MetricsRecorder, RefreshOutcomeLabel};
use crate::secrets::{SecretsCache, SecretsResolver};

/// Result of refreshing one profile within a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    Unchanged,
    /// The profile advanced to this version
    Applied(String),
    /// See the cycle's errors for details
    Failed,
}

/// Outcomes and errors of one cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub outcomes: BTreeMap<String, ProfileOutcome>,
    pub errors: RefreshErrors,
}

impl CycleReport {
    pub fn outcome(&self, profile: &str) -> Option<&ProfileOutcome> {
        self.outcomes.get(profile)
    }

    /// Profiles that advanced during the cycle, with their new versions.
    pub fn applied(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|(name, outcome)| match outcome {
            ProfileOutcome::Applied(version) => Some((name.as_str(), version.as_str())),
            _ => None,
        })
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert the first recorded error into a crate error.
    pub fn ensure_success(self) -> Result<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(error) => Err(ProfileSyncError::from(error)),
        }
    }

    fn count(&self, wanted: fn(&ProfileOutcome) -> bool) -> usize {
        self.outcomes.values().filter(|o| wanted(o)).count()
    }
}

/// Refreshes every profile of an [`AgentState`] in name order.
#[derive(Clone)]
pub struct RefreshCycle {
    fetcher: ConfigFetcher,
    resolver: SecretsResolver,
    metrics: MetricsRecorder,
}

impl RefreshCycle {
    pub fn new(fetcher: ConfigFetcher, resolver: SecretsResolver) -> Self {
        Self { fetcher, resolver, metrics: MetricsRecorder::new() }
    }

    /// Refresh all profiles sequentially.
    ///
    /// A failing profile never stops the others. Profiles that fail keep
    /// their previously applied version and snapshot.
    pub async fn run(&self, state: &mut AgentState, secrets_cache: &mut SecretsCache) -> CycleReport {
        let mut report = CycleReport::default();
        let definitions: Vec<_> = state.definitions().cloned().collect();

        for definition in &definitions {
            let applying = state.applying_or_initial(&definition.name);
            let ctx = RefreshContext {
                definition,
                applying: &applying,
                fetcher: &self.fetcher,
                resolver: &self.resolver,
                secrets_cache: &mut *secrets_cache,
            };

            let (outcome, label) = match refresh_profile(ctx).await {
                Ok(RefreshOutcome::Unchanged) => {
                    (ProfileOutcome::Unchanged, RefreshOutcomeLabel::Unchanged)
                }
                Ok(RefreshOutcome::Applied { applying, profile }) => {
                    let version = applying.version.clone().unwrap_or_default();
                    state.commit(applying, *profile);
                    (ProfileOutcome::Applied(version), RefreshOutcomeLabel::Applied)
                }
                Err(error) => {
                    let label = match error.kind {
                        RefreshErrorKind::Fetch(_) => RefreshOutcomeLabel::FetchFailed,
                        RefreshErrorKind::Parse(_) => RefreshOutcomeLabel::ParseFailed,
                        RefreshErrorKind::Secrets(_) => RefreshOutcomeLabel::SecretsFailed,
                    };
                    warn!(tag = %error.tag, error = %error, "Profile refresh failed");
                    report.errors.push(error);
                    (ProfileOutcome::Failed, label)
                }
            };

            debug!(profile = %definition.name, outcome = %label, "Profile refresh finished");
            self.metrics.record_profile_refresh(&definition.name, label);
            report.outcomes.insert(definition.name.clone(), outcome);
        }

        info!(
            profiles = report.outcomes.len(),
            applied = report.count(|o| matches!(o, ProfileOutcome::Applied(_))),
            unchanged = report.count(|o| matches!(o, ProfileOutcome::Unchanged)),
            failed = report.count(|o| matches!(o, ProfileOutcome::Failed)),
            cached_secrets = secrets_cache.len(),
            pending_secrets = secrets_cache.pending_len(),
            "Refresh cycle complete"
        );

        report
    }
}
