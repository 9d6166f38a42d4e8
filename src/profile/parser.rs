//! Parsing of fetched profile payloads.
//!
//! A payload is interpreted according to its declared content type:
//!
//! | Content type                                         | Contents            |
//! |------------------------------------------------------|---------------------|
//! | `application/json`                                   | structured document |
//! | `application/x-yaml`, `application/yaml`, `text/yaml`| structured document |
//! | `text/plain`                                         | UTF-8 text          |
//!
//! Structured documents may declare secrets under the top-level
//! `aws:secretsmanager` key:
//!
//! ```yaml
//! aws:secretsmanager:
//!   db:
//!     secret_id: prod/db
//!     content_type: application/json
//!   api_key:
//!     secret_id: prod/api-key
//!     version_stage: AWSPREVIOUS
//! ```
//!
//! Parsing is pure: the same payload always yields an equal
//! [`LoadedRemoteProfile`].

use bytes::Bytes;
use mime::Mime;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::secrets::{SecretContentType, SecretLocator, SecretReference};

/// Top-level key holding a profile's secret declarations.
pub const SECRETS_KEY: &str = "aws:secretsmanager";

/// Errors produced while parsing a fetched payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(String),

    #[error("malformed {content_type} payload: {message}")]
    Malformed { content_type: &'static str, message: String },

    #[error("invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },
}

impl ParseError {
    fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField { field: field.into(), message: message.into() }
    }
}

/// How a profile payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFormat {
    Json,
    Yaml,
    Text,
}

impl ProfileFormat {
    /// Determine the format from a `Content-Type` value, ignoring parameters.
    pub fn from_content_type(content_type: &str) -> Result<Self, ParseError> {
        let mime: Mime = content_type
            .trim()
            .parse()
            .map_err(|_| ParseError::UnsupportedContentType(content_type.to_string()))?;

        match mime.essence_str() {
            "application/json" => Ok(Self::Json),
            "application/x-yaml" | "application/yaml" | "text/yaml" => Ok(Self::Yaml),
            "text/plain" => Ok(Self::Text),
            _ => Err(ParseError::UnsupportedContentType(content_type.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/x-yaml",
            Self::Text => "text/plain",
        }
    }
}

/// Parsed profile contents.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileContents {
    Structured(serde_json::Value),
    Text(String),
}

impl ProfileContents {
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Structured(value) => value.clone(),
            Self::Text(text) => serde_json::Value::String(text.clone()),
        }
    }
}

/// A fetched and parsed profile that has not been applied yet.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRemoteProfile {
    pub name: String,
    pub version: String,
    /// Raw payload as returned by the store
    pub content: Bytes,
    /// Declared `Content-Type`, verbatim
    pub content_type: String,
    pub format: ProfileFormat,
    pub contents: ProfileContents,
    /// Declared secrets keyed by secret name
    pub secret_defs: BTreeMap<String, SecretReference>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SecretDeclaration {
    secret_id: String,
    #[serde(default)]
    version_id: Option<String>,
    #[serde(default)]
    version_stage: Option<String>,
    #[serde(default)]
    content_type: Option<SecretContentType>,
}

/// Parse a fetched payload into a [`LoadedRemoteProfile`].
pub fn parse(
    name: impl Into<String>,
    version: impl Into<String>,
    content: Bytes,
    content_type: impl Into<String>,
) -> Result<LoadedRemoteProfile, ParseError> {
    let content_type = content_type.into();
    let format = ProfileFormat::from_content_type(&content_type)?;

    let contents = match format {
        ProfileFormat::Json => ProfileContents::Structured(
            serde_json::from_slice(&content).map_err(|e| ParseError::Malformed {
                content_type: format.as_str(),
                message: e.to_string(),
            })?,
        ),
        ProfileFormat::Yaml => ProfileContents::Structured(
            serde_yaml::from_slice(&content).map_err(|e| ParseError::Malformed {
                content_type: format.as_str(),
                message: e.to_string(),
            })?,
        ),
        ProfileFormat::Text => ProfileContents::Text(
            String::from_utf8(content.to_vec()).map_err(|e| ParseError::Malformed {
                content_type: format.as_str(),
                message: e.to_string(),
            })?,
        ),
    };

    let secret_defs = match &contents {
        ProfileContents::Structured(value) => extract_secret_defs(value)?,
        ProfileContents::Text(_) => BTreeMap::new(),
    };

    Ok(LoadedRemoteProfile {
        name: name.into(),
        version: version.into(),
        content,
        content_type,
        format,
        contents,
        secret_defs,
    })
}

fn extract_secret_defs(
    value: &serde_json::Value,
) -> Result<BTreeMap<String, SecretReference>, ParseError> {
    let Some(section) = value.as_object().and_then(|root| root.get(SECRETS_KEY)) else {
        return Ok(BTreeMap::new());
    };

    let declarations = section
        .as_object()
        .ok_or_else(|| ParseError::invalid_field(SECRETS_KEY, "expected a mapping of secret names"))?;

    declarations
        .iter()
        .map(|(name, declaration)| {
            let field = format!("{}.{}", SECRETS_KEY, name);
            let declaration = SecretDeclaration::deserialize(declaration)
                .map_err(|e| ParseError::invalid_field(&field, e.to_string()))?;

            if declaration.secret_id.is_empty() {
                return Err(ParseError::invalid_field(
                    format!("{}.secret_id", field),
                    "cannot be empty",
                ));
            }

            let locator = SecretLocator::pinned(
                declaration.secret_id,
                declaration.version_id,
                declaration.version_stage,
            );
            let reference = SecretReference::new(name.clone(), locator)
                .with_content_type(declaration.content_type.unwrap_or_default());
            Ok((name.clone(), reference))
        })
        .collect()
}
