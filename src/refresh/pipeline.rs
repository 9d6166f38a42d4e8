//! Single-profile refresh pipeline.
//!
//! ```text
//! Start -> Fetching -> Unchanged
//!                   -> FetchFailed
//!                   -> Fetched -> Parsing -> ParseFailed
//!                                         -> Parsed -> Composed                      (no secrets)
//!                                                   -> ResolvingSecrets -> SecretsFailed
//!                                                                       -> Composed
//! ```
//!
//! Each stage takes exactly what it reads and returns what it produces. The
//! first failing stage ends the run; nothing in [`RefreshContext`] except the
//! secrets cache is modified, and the cache only ever gains entries.

use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::{info, warn, Instrument};

use super::error::RefreshError;
use crate::fetcher::{ConfigFetcher, FetchResult};
use crate::profile::{self, AppliedProfile, ApplyingProfile, LoadedRemoteProfile, ProfileDefinition};
use crate::refresh_span;
use crate::secrets::{LoadedSecret, SecretsCache, SecretsResolver};

/// Inputs of one profile refresh.
pub struct RefreshContext<'a> {
    pub definition: &'a ProfileDefinition,
    /// Version currently applied for the profile
    pub applying: &'a ApplyingProfile,
    pub fetcher: &'a ConfigFetcher,
    pub resolver: &'a SecretsResolver,
    /// Cache shared by every profile of the cycle
    pub secrets_cache: &'a mut SecretsCache,
}

/// Successful end states of the pipeline.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The store reports the applied version; nothing to do.
    Unchanged,
    /// A new version is ready. `applying` replaces the profile's cursor.
    Applied { applying: ApplyingProfile, profile: Box<AppliedProfile> },
}

/// A payload the store reported as new.
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    pub version: String,
    pub content: Bytes,
    pub content_type: String,
}

/// Run the whole pipeline for one profile.
pub async fn refresh_profile(ctx: RefreshContext<'_>) -> Result<RefreshOutcome, RefreshError> {
    let span = refresh_span!(
        ctx.definition.name,
        current_version = ctx.applying.version.as_deref().unwrap_or("none")
    );
    run_stages(ctx).instrument(span).await
}

async fn run_stages(ctx: RefreshContext<'_>) -> Result<RefreshOutcome, RefreshError> {
    let RefreshContext { definition, applying, fetcher, resolver, secrets_cache } = ctx;

    let Some(payload) = fetch_stage(definition, applying, fetcher).await? else {
        return Ok(RefreshOutcome::Unchanged);
    };

    let parsed = parse_stage(&definition.name, payload)?;
    let secrets = resolve_stage(&parsed, resolver, secrets_cache).await?;

    let (applying, profile) = compose_stage(parsed, secrets);
    Ok(RefreshOutcome::Applied { applying, profile: Box::new(profile) })
}

/// Ask the store for a newer version. `None` means unchanged.
pub async fn fetch_stage(
    definition: &ProfileDefinition,
    applying: &ApplyingProfile,
    fetcher: &ConfigFetcher,
) -> Result<Option<FetchedPayload>, RefreshError> {
    match fetcher.fetch(definition, applying.version.as_deref()).await {
        FetchResult::Unchanged => {
            warn!(
                profile = %definition.name,
                version = applying.version.as_deref().unwrap_or("none"),
                "no update"
            );
            Ok(None)
        }
        FetchResult::Failed(e) => Err(RefreshError::fetch(&definition.name, e)),
        FetchResult::Updated { version, content, content_type } => {
            info!(
                profile = %definition.name,
                previous_version = applying.version.as_deref().unwrap_or("none"),
                new_version = %version,
                "updated profile"
            );
            Ok(Some(FetchedPayload { version, content, content_type }))
        }
    }
}

/// Interpret the fetched payload.
pub fn parse_stage(
    name: &str,
    payload: FetchedPayload,
) -> Result<LoadedRemoteProfile, RefreshError> {
    profile::parse(name, payload.version, payload.content, payload.content_type).map_err(|e| {
        warn!(profile = %name, error = %e, "Failed to parse profile");
        RefreshError::parse(name, e)
    })
}

/// Resolve the secrets the profile declares.
///
/// Profiles without secrets return `None` without touching the cache or the
/// secrets store.
pub async fn resolve_stage(
    profile: &LoadedRemoteProfile,
    resolver: &SecretsResolver,
    secrets_cache: &mut SecretsCache,
) -> Result<Option<BTreeMap<String, LoadedSecret>>, RefreshError> {
    if profile.secret_defs.is_empty() {
        return Ok(None);
    }

    resolver.resolve(&profile.secret_defs, secrets_cache).await.map(Some).map_err(|errors| {
        warn!(
            profile = %profile.name,
            version = %profile.version,
            failed = errors.len(),
            "Profile secrets failed to resolve"
        );
        RefreshError::secrets(&profile.name, errors.into_errors())
    })
}

/// Build the applied snapshot and the cursor that replaces the current one.
pub fn compose_stage(
    profile: LoadedRemoteProfile,
    secrets: Option<BTreeMap<String, LoadedSecret>>,
) -> (ApplyingProfile, AppliedProfile) {
    let applying = ApplyingProfile::at_version(&profile.name, &profile.version);
    (applying, AppliedProfile::new(profile, secrets))
}
