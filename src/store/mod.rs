//! Remote configuration store access.
//!
//! [`ConfigStoreClient`] is the seam between the refresh pipeline and the
//! store; [`HttpConfigStoreClient`] is the bundled implementation.

pub mod client;
pub mod error;
pub mod http;

pub use client::{ConfigStoreClient, ConfigurationRequest, ConfigurationResponse};
pub use error::ConfigStoreError;
pub use http::{HttpConfigStoreClient, CONFIGURATION_VERSION_HEADER};
