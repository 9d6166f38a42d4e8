//! HTTP config store client.
//!
//! Issues one request per fetch:
//!
//! ```text
//! GET {base_url}/applications/{application}/environments/{environment}/configurations/{configuration}
//!     ?client_id={client_id}&client_configuration_version={version}
//! ```
//!
//! The version is read from the `Configuration-Version` response header and the
//! payload type from `Content-Type`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, trace};
use url::Url;

use super::client::{ConfigStoreClient, ConfigurationRequest, ConfigurationResponse};
use super::error::ConfigStoreError;
use crate::config::ConfigStoreConfig;

/// Response header carrying the configuration version token.
pub const CONFIGURATION_VERSION_HEADER: &str = "Configuration-Version";

/// Content type assumed when the store omits `Content-Type`.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// [`ConfigStoreClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpConfigStoreClient {
    client: Client,
    base_url: Url,
}

impl HttpConfigStoreClient {
    pub fn new(config: &ConfigStoreConfig) -> Result<Self, ConfigStoreError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ConfigStoreError::config(format!("invalid base_url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigStoreError::config(format!(
                "base_url '{}' cannot be used as a base",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigStoreError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn configuration_url(&self, request: &ConfigurationRequest) -> Result<Url, ConfigStoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigStoreError::config("base_url cannot be used as a base"))?
            .pop_if_empty()
            .extend([
                "applications",
                request.application.as_str(),
                "environments",
                request.environment.as_str(),
                "configurations",
                request.configuration.as_str(),
            ]);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &request.client_id);
            if let Some(version) = &request.client_configuration_version {
                query.append_pair("client_configuration_version", version);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl ConfigStoreClient for HttpConfigStoreClient {
    async fn get_configuration(
        &self,
        request: &ConfigurationRequest,
    ) -> Result<ConfigurationResponse, ConfigStoreError> {
        let url = self.configuration_url(request)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "<unable to read error>".to_string());
            trace!("Error response:\n{}", body);
            return Err(ConfigStoreError::status(status.as_u16(), body));
        }

        let headers = response.headers();
        let configuration_version = headers
            .get(CONFIGURATION_VERSION_HEADER)
            .ok_or_else(|| {
                ConfigStoreError::invalid_response(format!(
                    "missing {} header",
                    CONFIGURATION_VERSION_HEADER
                ))
            })?
            .to_str()
            .map_err(|e| {
                ConfigStoreError::invalid_response(format!(
                    "{} header is not valid text: {}",
                    CONFIGURATION_VERSION_HEADER, e
                ))
            })?
            .to_string();

        let content_type = match headers.get(CONTENT_TYPE) {
            Some(value) => value
                .to_str()
                .map_err(|e| {
                    ConfigStoreError::invalid_response(format!(
                        "Content-Type header is not valid text: {}",
                        e
                    ))
                })?
                .to_string(),
            None => DEFAULT_CONTENT_TYPE.to_string(),
        };

        let content = response.bytes().await?;
        trace!(bytes = content.len(), version = %configuration_version, "Response body received");

        Ok(ConfigurationResponse { configuration_version, content, content_type })
    }
}
