//! Batch resolution of secret references against a [`SecretsCache`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::SecretsCache;
use super::client::SecretsClient;
use super::error::SecretsError;
use super::loaded::LoadedSecret;
use super::reference::{SecretLocator, SecretReference};
use crate::observability::MetricsRecorder;

/// Failure to resolve a single secret.
#[derive(Debug, thiserror::Error)]
#[error("secret '{name}' ({locator}): {source}")]
pub struct SecretLoadError {
    pub name: String,
    pub locator: SecretLocator,
    #[source]
    pub source: SecretsError,
}

impl SecretLoadError {
    fn new(reference: &SecretReference, source: SecretsError) -> Self {
        Self { name: reference.name.clone(), locator: reference.locator.clone(), source }
    }
}

/// Aggregate of every secret that failed to resolve for one profile.
#[derive(Debug)]
pub struct SecretResolutionErrors(Vec<SecretLoadError>);

impl SecretResolutionErrors {
    pub fn errors(&self) -> &[SecretLoadError] {
        &self.0
    }

    pub fn into_errors(self) -> Vec<SecretLoadError> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SecretResolutionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} secret(s) failed to resolve", self.0.len())?;
        for (i, error) in self.0.iter().enumerate() {
            write!(f, "{} {}", if i == 0 { ":" } else { ";" }, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SecretResolutionErrors {}

/// Resolves pending secret references through a [`SecretsClient`].
#[derive(Clone)]
pub struct SecretsResolver {
    client: Arc<dyn SecretsClient>,
    metrics: MetricsRecorder,
}

impl SecretsResolver {
    pub fn new(client: Arc<dyn SecretsClient>) -> Self {
        Self { client, metrics: MetricsRecorder::new() }
    }

    /// Run a resolution pass over every pending locator in the cache.
    ///
    /// Each pending locator is requested from the store exactly once. Successes
    /// move into the loaded set as raw values; failures stay pending so a later
    /// pass retries them. Content types are not checked here, since profiles
    /// sharing a locator may declare different ones. Returns the number of
    /// secrets resolved, or every per-locator error.
    pub async fn load(&self, cache: &mut SecretsCache) -> Result<usize, Vec<SecretLoadError>> {
        let pending: Vec<SecretReference> = cache.pending().cloned().collect();
        let backend = self.client.backend_type();
        let mut errors = Vec::new();
        let mut resolved = 0;

        for reference in pending {
            let result = self
                .client
                .get_secret_value(&reference.locator)
                .await
                .map(|value| LoadedSecret::unparsed(&reference, value));

            match result {
                Ok(secret) => {
                    self.metrics.record_secret_fetch(backend.as_str(), true);
                    cache.insert(secret);
                    resolved += 1;
                }
                Err(e) => {
                    self.metrics.record_secret_fetch(backend.as_str(), false);
                    warn!(
                        backend = %backend,
                        locator = %reference.locator,
                        name = %reference.name,
                        error = %e,
                        transient = e.is_transient(),
                        "Failed to resolve secret"
                    );
                    errors.push(SecretLoadError::new(&reference, e));
                }
            }
        }

        if errors.is_empty() {
            Ok(resolved)
        } else {
            Err(errors)
        }
    }

    /// Resolve exactly the secrets one profile declares.
    ///
    /// Registers `references` as pending, runs a resolution pass, then reads
    /// back only this profile's locators, interpreted under this profile's
    /// content types. Failures for locators the profile does not reference
    /// (left pending by earlier profiles) are not reported here. On success
    /// the map is keyed by the profile's secret names.
    pub async fn resolve(
        &self,
        references: &BTreeMap<String, SecretReference>,
        cache: &mut SecretsCache,
    ) -> Result<BTreeMap<String, LoadedSecret>, SecretResolutionErrors> {
        let hits = references.values().filter(|r| cache.contains(&r.locator)).count();
        self.metrics.record_secret_cache_hits(hits as u64);

        let queued = cache.update_secret_defs_to_load(references.values());
        debug!(declared = references.len(), cached = hits, queued, "Resolving profile secrets");

        if let Err(errors) = self.load(cache).await {
            let wanted: BTreeSet<&SecretLocator> = references.values().map(|r| &r.locator).collect();
            let (ours, others): (Vec<_>, Vec<_>) =
                errors.into_iter().partition(|e| wanted.contains(&e.locator));

            if !others.is_empty() {
                debug!(count = others.len(), "Secrets requested by other profiles remain pending");
            }
            if !ours.is_empty() {
                return Err(SecretResolutionErrors(ours));
            }
        }

        let mut loaded = BTreeMap::new();
        let mut errors = Vec::new();
        for (name, reference) in references {
            let view = match cache.get(&reference.locator) {
                Some(secret) => secret.for_reference(reference),
                None => Err(SecretsError::internal(format!(
                    "'{}' neither loaded nor reported as failed",
                    reference.locator
                ))),
            };
            match view {
                Ok(secret) => {
                    loaded.insert(name.clone(), secret);
                }
                Err(e) => errors.push(SecretLoadError::new(reference, e)),
            }
        }

        if !errors.is_empty() {
            return Err(SecretResolutionErrors(errors));
        }

        info!(count = loaded.len(), "Resolved profile secrets");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::client::{SecretValue, SecretsBackendType};
    use crate::secrets::reference::SecretContentType;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubClient {
        values: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubClient {
        fn with(values: &[(&str, &str)]) -> Self {
            Self {
                values: values.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SecretsClient for StubClient {
        async fn get_secret_value(
            &self,
            locator: &SecretLocator,
        ) -> crate::secrets::Result<SecretValue> {
            self.calls.lock().unwrap().push(locator.secret_id.clone());
            self.values
                .get(&locator.secret_id)
                .map(|v| SecretValue::new(v.as_str()))
                .ok_or_else(|| SecretsError::not_found(locator.secret_id.clone()))
        }

        fn backend_type(&self) -> SecretsBackendType {
            SecretsBackendType::Env
        }
    }

    fn defs(entries: &[(&str, &str)]) -> BTreeMap<String, SecretReference> {
        entries
            .iter()
            .map(|(name, id)| {
                (name.to_string(), SecretReference::new(*name, SecretLocator::new(*id)))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_resolve_all_declared() {
        let client = Arc::new(StubClient::with(&[("prod/a", "A"), ("prod/b", "B")]));
        let resolver = SecretsResolver::new(client.clone());
        let mut cache = SecretsCache::new();

        let declared = defs(&[("a", "prod/a"), ("b", "prod/b")]);
        let loaded = resolver.resolve(&declared, &mut cache).await.unwrap();

        assert_eq!(loaded["a"].value.expose_secret(), "A");
        assert_eq!(loaded["b"].value.expose_secret(), "B");
        assert_eq!(cache.pending_len(), 0);
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successes_cached() {
        let client = Arc::new(StubClient::with(&[("prod/a", "A")]));
        let resolver = SecretsResolver::new(client.clone());
        let mut cache = SecretsCache::new();

        let declared = defs(&[("a", "prod/a"), ("b", "prod/b")]);
        let err = resolver.resolve(&declared, &mut cache).await.unwrap_err();

        assert_eq!(err.len(), 1);
        assert_eq!(err.errors()[0].name, "b");
        assert!(cache.contains(&SecretLocator::new("prod/a")));
        assert!(cache.is_pending(&SecretLocator::new("prod/b")));
    }

    #[tokio::test]
    async fn test_load_retries_only_pending() {
        let client = Arc::new(StubClient::with(&[("prod/a", "A")]));
        let resolver = SecretsResolver::new(client.clone());
        let mut cache = SecretsCache::new();
        let declared = defs(&[("a", "prod/a"), ("b", "prod/b")]);

        let _ = resolver.resolve(&declared, &mut cache).await;
        let _ = resolver.resolve(&declared, &mut cache).await;

        assert_eq!(client.calls(), vec!["prod/a", "prod/b", "prod/b"]);
    }

    #[tokio::test]
    async fn test_other_profiles_failures_are_not_reported() {
        let client = Arc::new(StubClient::with(&[("prod/c", "C")]));
        let resolver = SecretsResolver::new(client.clone());
        let mut cache = SecretsCache::new();

        assert!(resolver.resolve(&defs(&[("b", "prod/b")]), &mut cache).await.is_err());

        let loaded = resolver.resolve(&defs(&[("c", "prod/c")]), &mut cache).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(cache.is_pending(&SecretLocator::new("prod/b")));
    }

    #[tokio::test]
    async fn test_invalid_json_secret_fails_resolution() {
        let client = Arc::new(StubClient::with(&[("prod/json", "not json")]));
        let resolver = SecretsResolver::new(client);
        let mut cache = SecretsCache::new();

        let mut declared = BTreeMap::new();
        declared.insert(
            "cfg".to_string(),
            SecretReference::new("cfg", SecretLocator::new("prod/json"))
                .with_content_type(SecretContentType::ApplicationJson),
        );

        let err = resolver.resolve(&declared, &mut cache).await.unwrap_err();
        assert!(matches!(err.errors()[0].source, SecretsError::InvalidValue { .. }));
        // The store value itself is fine and stays cached for other declarations
        assert!(cache.contains(&SecretLocator::new("prod/json")));
        assert_eq!(cache.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_shared_locator_interpreted_per_declaration() {
        let client = Arc::new(StubClient::with(&[("prod/tok", "plain-text-token")]));
        let resolver = SecretsResolver::new(client.clone());
        let mut cache = SecretsCache::new();

        let mut as_json = BTreeMap::new();
        as_json.insert(
            "tok".to_string(),
            SecretReference::new("tok", SecretLocator::new("prod/tok"))
                .with_content_type(SecretContentType::ApplicationJson),
        );
        assert!(resolver.resolve(&as_json, &mut cache).await.is_err());

        let loaded = resolver.resolve(&defs(&[("token", "prod/tok")]), &mut cache).await.unwrap();
        assert_eq!(loaded["token"].value.expose_secret(), "plain-text-token");
        assert!(loaded["token"].contents().is_none());
        assert_eq!(client.calls(), vec!["prod/tok"]);
    }

    #[test]
    fn test_resolution_errors_display() {
        let errors = SecretResolutionErrors(vec![SecretLoadError::new(
            &SecretReference::new("b", SecretLocator::new("prod/b")),
            SecretsError::not_found("prod/b"),
        )]);
        assert_eq!(
            errors.to_string(),
            "1 secret(s) failed to resolve: secret 'b' (prod/b#AWSCURRENT): Secret not found: prod/b"
        );
    }
}
