//! Resolved secrets.

use chrono::{DateTime, Utc};
use std::fmt;

use super::client::SecretValue;
use super::error::{Result, SecretsError};
use super::reference::{SecretContentType, SecretLocator, SecretReference};
use super::types::SecretString;

/// A secret value resolved from the store for a given reference.
#[derive(Clone)]
pub struct LoadedSecret {
    pub name: String,
    pub locator: SecretLocator,
    pub content_type: SecretContentType,
    pub value: SecretString,
    /// Version id reported by the store
    pub version_id: Option<String>,
    pub resolved_at: DateTime<Utc>,
    /// Parsed value for `application/json` secrets
    contents: Option<serde_json::Value>,
}

impl LoadedSecret {
    /// Build a loaded secret from a store response, interpreting the value
    /// according to the reference's content type.
    pub fn from_value(reference: &SecretReference, value: SecretValue) -> Result<Self> {
        let contents = parse_contents(reference.content_type, &value.value)?;
        Ok(Self {
            name: reference.name.clone(),
            locator: reference.locator.clone(),
            content_type: reference.content_type,
            value: value.value,
            version_id: value.version_id,
            resolved_at: Utc::now(),
            contents,
        })
    }

    /// Store a value as returned by the store, without interpreting it.
    ///
    /// The cache holds values in this form; each profile's declared content
    /// type is applied later through [`LoadedSecret::for_reference`].
    pub fn unparsed(reference: &SecretReference, value: SecretValue) -> Self {
        Self {
            name: reference.name.clone(),
            locator: reference.locator.clone(),
            content_type: SecretContentType::TextPlain,
            value: value.value,
            version_id: value.version_id,
            resolved_at: Utc::now(),
            contents: None,
        }
    }

    /// View of this secret as declared by another reference to the same locator.
    ///
    /// The cached value is shared; only the name and interpretation change.
    pub fn for_reference(&self, reference: &SecretReference) -> Result<Self> {
        let contents = if reference.content_type == self.content_type {
            self.contents.clone()
        } else {
            parse_contents(reference.content_type, &self.value)?
        };
        Ok(Self {
            name: reference.name.clone(),
            content_type: reference.content_type,
            contents,
            ..self.clone()
        })
    }

    /// Parsed JSON value, present only for `application/json` secrets.
    pub fn contents(&self) -> Option<&serde_json::Value> {
        self.contents.as_ref()
    }

    /// The secret as a JSON value: the parsed document for JSON secrets,
    /// otherwise the raw string.
    pub fn to_value(&self) -> serde_json::Value {
        match &self.contents {
            Some(contents) => contents.clone(),
            None => serde_json::Value::String(self.value.expose_secret().to_string()),
        }
    }
}

fn parse_contents(
    content_type: SecretContentType,
    value: &SecretString,
) -> Result<Option<serde_json::Value>> {
    match content_type {
        SecretContentType::TextPlain => Ok(None),
        // serde_json errors quote input fragments; keep them out of the message
        SecretContentType::ApplicationJson => serde_json::from_str(value.expose_secret())
            .map(Some)
            .map_err(|e| {
                SecretsError::invalid_value(format!(
                    "declared application/json but is not valid JSON (line {}, column {})",
                    e.line(),
                    e.column()
                ))
            }),
    }
}

impl fmt::Debug for LoadedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedSecret")
            .field("name", &self.name)
            .field("locator", &self.locator)
            .field("content_type", &self.content_type)
            .field("value", &self.value)
            .field("version_id", &self.version_id)
            .field("resolved_at", &self.resolved_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(content_type: SecretContentType) -> SecretReference {
        SecretReference::new("db", SecretLocator::new("prod/db")).with_content_type(content_type)
    }

    #[test]
    fn test_text_secret_has_no_contents() {
        let loaded = LoadedSecret::from_value(
            &reference(SecretContentType::TextPlain),
            SecretValue::new("hunter2").with_version("v1"),
        )
        .unwrap();

        assert!(loaded.contents().is_none());
        assert_eq!(loaded.version_id.as_deref(), Some("v1"));
        assert_eq!(loaded.to_value(), serde_json::json!("hunter2"));
    }

    #[test]
    fn test_json_secret_is_parsed() {
        let loaded = LoadedSecret::from_value(
            &reference(SecretContentType::ApplicationJson),
            SecretValue::new(r#"{"user":"app","password":"hunter2"}"#),
        )
        .unwrap();

        assert_eq!(loaded.to_value()["user"], "app");
    }

    #[test]
    fn test_invalid_json_secret_is_rejected_without_leaking() {
        let err = LoadedSecret::from_value(
            &reference(SecretContentType::ApplicationJson),
            SecretValue::new("hunter2"),
        )
        .unwrap_err();

        assert!(matches!(err, SecretsError::InvalidValue { .. }));
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn test_for_reference_renames_and_reinterprets() {
        let loaded = LoadedSecret::from_value(
            &reference(SecretContentType::TextPlain),
            SecretValue::new(r#"{"k":1}"#),
        )
        .unwrap();

        let other = SecretReference::new("shared", SecretLocator::new("prod/db"))
            .with_content_type(SecretContentType::ApplicationJson);
        let view = loaded.for_reference(&other).unwrap();

        assert_eq!(view.name, "shared");
        assert_eq!(view.resolved_at, loaded.resolved_at);
        assert_eq!(view.to_value()["k"], 1);
    }

    #[test]
    fn test_debug_redacts_value() {
        let loaded = LoadedSecret::from_value(
            &reference(SecretContentType::TextPlain),
            SecretValue::new("hunter2"),
        )
        .unwrap();
        assert!(!format!("{:?}", loaded).contains("hunter2"));
    }
}
