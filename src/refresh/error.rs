//! Refresh failures and the per-cycle error sink.

use std::fmt;

use crate::profile::ParseError;
use crate::secrets::SecretLoadError;
use crate::store::ConfigStoreError;

/// Suffix appended to a profile name to tag secret resolution failures.
pub const SECRETS_TAG_SUFFIX: &str = "_secrets";

/// What went wrong during one profile refresh.
#[derive(Debug)]
pub enum RefreshErrorKind {
    Fetch(ConfigStoreError),
    Parse(ParseError),
    /// Every secret of the profile that failed to resolve
    Secrets(Vec<SecretLoadError>),
}

impl fmt::Display for RefreshErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "fetch failed: {}", e),
            Self::Parse(e) => write!(f, "parse failed: {}", e),
            Self::Secrets(errors) => {
                write!(f, "{} secret(s) failed to resolve", errors.len())?;
                for (i, error) in errors.iter().enumerate() {
                    write!(f, "{} {}", if i == 0 { ":" } else { ";" }, error)?;
                }
                Ok(())
            }
        }
    }
}

/// A refresh failure tagged with the profile it belongs to.
///
/// Fetch and parse failures are tagged with the profile name; secret
/// failures with `"{profile}_secrets"`.
#[derive(Debug, thiserror::Error)]
#[error("[{tag}] {kind}")]
pub struct RefreshError {
    pub tag: String,
    pub kind: RefreshErrorKind,
}

impl RefreshError {
    pub fn fetch(profile: impl Into<String>, error: ConfigStoreError) -> Self {
        Self { tag: profile.into(), kind: RefreshErrorKind::Fetch(error) }
    }

    pub fn parse(profile: impl Into<String>, error: ParseError) -> Self {
        Self { tag: profile.into(), kind: RefreshErrorKind::Parse(error) }
    }

    pub fn secrets(profile: &str, errors: Vec<SecretLoadError>) -> Self {
        Self {
            tag: format!("{}{}", profile, SECRETS_TAG_SUFFIX),
            kind: RefreshErrorKind::Secrets(errors),
        }
    }

    /// Name of the profile this error belongs to.
    pub fn profile(&self) -> &str {
        match self.kind {
            RefreshErrorKind::Secrets(_) => {
                self.tag.strip_suffix(SECRETS_TAG_SUFFIX).unwrap_or(&self.tag)
            }
            _ => &self.tag,
        }
    }
}

/// Errors collected over one refresh cycle, in the order they occurred.
#[derive(Debug, Default)]
pub struct RefreshErrors(Vec<RefreshError>);

impl RefreshErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: RefreshError) {
        self.0.push(error);
    }

    /// First error recorded under `tag`.
    pub fn get(&self, tag: &str) -> Option<&RefreshError> {
        self.0.iter().find(|e| e.tag == tag)
    }

    pub fn tags(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.tag.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RefreshError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<RefreshError> {
        self.0
    }
}

impl IntoIterator for RefreshErrors {
    type Item = RefreshError;
    type IntoIter = std::vec::IntoIter<RefreshError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
