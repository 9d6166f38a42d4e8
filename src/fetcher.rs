//! Fetching profiles from the remote config store.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::profile::ProfileDefinition;
use crate::store::{ConfigStoreClient, ConfigStoreError, ConfigurationRequest};

/// Result of asking the store for a profile.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// The store reports the version the agent already applied.
    Unchanged,
    /// A different version is available.
    Updated { version: String, content: Bytes, content_type: String },
    /// The store could not be queried. Never escapes the fetcher as an `Err`.
    Failed(ConfigStoreError),
}

/// Fetches profile payloads on behalf of one agent identity.
#[derive(Clone)]
pub struct ConfigFetcher {
    client: Arc<dyn ConfigStoreClient>,
    client_id: String,
}

impl ConfigFetcher {
    pub fn new(client: Arc<dyn ConfigStoreClient>, client_id: impl Into<String>) -> Self {
        Self { client, client_id: client_id.into() }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Ask the store for `definition`, passing the version currently applied.
    ///
    /// A response carrying `current_version` means there is nothing new.
    /// Version tokens are compared for equality only; the store decides recency.
    pub async fn fetch(
        &self,
        definition: &ProfileDefinition,
        current_version: Option<&str>,
    ) -> FetchResult {
        let request = ConfigurationRequest {
            application: definition.application.clone(),
            environment: definition.environment.clone(),
            configuration: definition.profile.clone(),
            client_id: self.client_id.clone(),
            client_configuration_version: current_version.map(String::from),
        };

        debug!(
            profile = %definition.name,
            application = %request.application,
            environment = %request.environment,
            configuration = %request.configuration,
            current_version = ?current_version,
            "Fetching profile"
        );

        match self.client.get_configuration(&request).await {
            Ok(response) if current_version == Some(response.configuration_version.as_str()) => {
                FetchResult::Unchanged
            }
            Ok(response) => FetchResult::Updated {
                version: response.configuration_version,
                content: response.content,
                content_type: response.content_type,
            },
            Err(e) => {
                warn!(profile = %definition.name, error = %e, "Failed to fetch profile");
                FetchResult::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ConfigurationResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedStore {
        response: Result<ConfigurationResponse, ConfigStoreError>,
        requests: Mutex<Vec<ConfigurationRequest>>,
    }

    impl FixedStore {
        fn new(response: Result<ConfigurationResponse, ConfigStoreError>) -> Self {
            Self { response, requests: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl ConfigStoreClient for FixedStore {
        async fn get_configuration(
            &self,
            request: &ConfigurationRequest,
        ) -> Result<ConfigurationResponse, ConfigStoreError> {
            self.requests.lock().unwrap().push(request.clone());
            self.response.clone()
        }
    }

    fn definition() -> ProfileDefinition {
        ProfileDefinition::new("web", "shop", "prod", "web-config")
    }

    fn response(version: &str) -> ConfigurationResponse {
        ConfigurationResponse {
            configuration_version: version.to_string(),
            content: Bytes::from_static(b"{}"),
            content_type: "application/json".to_string(),
        }
    }

    #[tokio::test]
    async fn test_same_version_is_unchanged() {
        let store = Arc::new(FixedStore::new(Ok(response("5"))));
        let fetcher = ConfigFetcher::new(store.clone(), "agent-1");

        assert_eq!(fetcher.fetch(&definition(), Some("5")).await, FetchResult::Unchanged);

        let requests = store.requests.lock().unwrap();
        assert_eq!(requests[0].configuration, "web-config");
        assert_eq!(requests[0].client_id, "agent-1");
        assert_eq!(requests[0].client_configuration_version.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_new_version_is_updated() {
        let fetcher = ConfigFetcher::new(Arc::new(FixedStore::new(Ok(response("6")))), "agent-1");

        match fetcher.fetch(&definition(), Some("5")).await {
            FetchResult::Updated { version, content_type, .. } => {
                assert_eq!(version, "6");
                assert_eq!(content_type, "application/json");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_any_other_token_is_updated() {
        let fetcher = ConfigFetcher::new(Arc::new(FixedStore::new(Ok(response("10")))), "agent-1");

        // Tokens are opaque: lower, higher and unrelated all count as changed
        for current in ["9", "11", "abc"] {
            assert!(matches!(
                fetcher.fetch(&definition(), Some(current)).await,
                FetchResult::Updated { .. }
            ));
        }
    }

    #[tokio::test]
    async fn test_first_fetch_is_always_updated() {
        let fetcher = ConfigFetcher::new(Arc::new(FixedStore::new(Ok(response("1")))), "agent-1");
        assert!(matches!(fetcher.fetch(&definition(), None).await, FetchResult::Updated { .. }));
    }

    #[tokio::test]
    async fn test_store_error_becomes_failed() {
        let store = FixedStore::new(Err(ConfigStoreError::transport("connection refused")));
        let fetcher = ConfigFetcher::new(Arc::new(store), "agent-1");

        assert_eq!(
            fetcher.fetch(&definition(), None).await,
            FetchResult::Failed(ConfigStoreError::transport("connection refused"))
        );
    }
}
