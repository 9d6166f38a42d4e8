//! In-memory config store and secrets store for integration tests.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use profilesync::agent::AgentState;
use profilesync::fetcher::ConfigFetcher;
use profilesync::profile::ProfileDefinition;
use profilesync::refresh::RefreshCycle;
use profilesync::secrets::{
    SecretLocator, SecretValue, SecretsBackendType, SecretsClient, SecretsError, SecretsResolver,
};
use profilesync::store::{
    ConfigStoreClient, ConfigStoreError, ConfigurationRequest, ConfigurationResponse,
};

pub const CLIENT_ID: &str = "test-agent";

/// Config store serving one mutable payload per configuration name.
#[derive(Default)]
pub struct FakeConfigStore {
    configurations: Mutex<HashMap<String, Result<ConfigurationResponse, ConfigStoreError>>>,
    requests: Mutex<Vec<ConfigurationRequest>>,
}

impl FakeConfigStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn publish(&self, configuration: &str, version: &str, content_type: &str, content: &str) {
        self.configurations.lock().unwrap().insert(
            configuration.to_string(),
            Ok(ConfigurationResponse {
                configuration_version: version.to_string(),
                content: Bytes::from(content.to_string()),
                content_type: content_type.to_string(),
            }),
        );
    }

    pub fn fail(&self, configuration: &str, error: ConfigStoreError) {
        self.configurations.lock().unwrap().insert(configuration.to_string(), Err(error));
    }

    pub fn requests(&self) -> Vec<ConfigurationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfigStoreClient for FakeConfigStore {
    async fn get_configuration(
        &self,
        request: &ConfigurationRequest,
    ) -> Result<ConfigurationResponse, ConfigStoreError> {
        self.requests.lock().unwrap().push(request.clone());
        self.configurations
            .lock()
            .unwrap()
            .get(&request.configuration)
            .cloned()
            .unwrap_or_else(|| Err(ConfigStoreError::status(404, "no such configuration")))
    }
}

/// Secrets store keyed by secret id that records every lookup.
#[derive(Default)]
pub struct FakeSecretsStore {
    values: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeSecretsStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put(&self, secret_id: &str, value: &str) {
        self.values.lock().unwrap().insert(secret_id.to_string(), value.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, secret_id: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == secret_id).count()
    }
}

#[async_trait]
impl SecretsClient for FakeSecretsStore {
    async fn get_secret_value(
        &self,
        locator: &SecretLocator,
    ) -> profilesync::secrets::Result<SecretValue> {
        self.calls.lock().unwrap().push(locator.secret_id.clone());
        self.values
            .lock()
            .unwrap()
            .get(&locator.secret_id)
            .map(|v| SecretValue::new(v.as_str()).with_version("v1"))
            .ok_or_else(|| SecretsError::not_found(locator.secret_id.clone()))
    }

    fn backend_type(&self) -> SecretsBackendType {
        SecretsBackendType::Env
    }
}

pub fn definition(name: &str) -> ProfileDefinition {
    ProfileDefinition::new(name, "shop", "prod", name)
}

pub fn cycle(store: &Arc<FakeConfigStore>, secrets: &Arc<FakeSecretsStore>) -> RefreshCycle {
    RefreshCycle::new(
        ConfigFetcher::new(store.clone(), CLIENT_ID),
        SecretsResolver::new(secrets.clone()),
    )
}

pub fn state(names: &[&str]) -> AgentState {
    AgentState::new(names.iter().map(|name| definition(name)))
}
