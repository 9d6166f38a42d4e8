//! # profilesync
//!
//! Refresh engine of a configuration-synchronization agent. The agent
//! periodically pulls named configuration profiles from a remote config
//! store, detects version changes, resolves the secrets a profile references
//! and only then treats the new version as ready to apply.
//!
//! ## Architecture
//!
//! ```text
//! RefreshCycle ─┬─> ConfigFetcher ──> ConfigStoreClient
//!               ├─> profile::parse
//!               └─> SecretsResolver ─> SecretsCache ─> SecretsClient
//! ```
//!
//! ## Core Components
//!
//! - **Config Fetcher**: asks the store for a profile, given the applied version
//! - **Profile Parser**: interprets payloads and extracts secret references
//! - **Secrets Cache / Resolver**: deduplicated, cached secret resolution shared
//!   by every profile in a cycle
//! - **Refresh Pipeline**: fetch, compare, parse, resolve and compose, leaving
//!   prior state untouched on failure
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use profilesync::{agent::Agent, config::AgentConfig, Result};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AgentConfig::load_from_dir(Path::new("/etc/profilesync"))?;
//!     let mut agent = Agent::from_config(&config)?;
//!     agent.run_cycle().await.ensure_success()
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod observability;
pub mod profile;
pub mod refresh;
pub mod secrets;
pub mod store;

pub use errors::{ProfileSyncError, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
