//! # Configuration Management
//!
//! The agent reads every `*.toml` file in its configuration directory,
//! merged in file-name order so later files override earlier ones, then
//! applies `PROFILESYNC__`-prefixed environment overrides:
//!
//! ```toml
//! # 10-agent.toml
//! client_id = "web-01"
//! refresh_interval_seconds = 30
//!
//! [config_store]
//! base_url = "http://localhost:2772"
//!
//! [profiles.web]
//! application = "shop"
//! environment = "prod"
//! profile = "web-config"
//! ```
//!
//! `PROFILESYNC__OBSERVABILITY__LOG_LEVEL=debug` overrides
//! `observability.log_level`.

pub mod settings;

pub use settings::{
    AgentConfig, ConfigStoreConfig, ObservabilityConfig, SecretsConfig, VaultConfig,
};

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{ProfileSyncError, Result};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "PROFILESYNC";

/// Separator between the prefix and nested keys in override variables.
pub const ENV_SEPARATOR: &str = "__";

impl AgentConfig {
    /// Load and validate configuration from a directory of TOML files.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let files = config_files(dir)?;
        if files.is_empty() {
            return Err(ProfileSyncError::config(format!(
                "No *.toml configuration files found in {}",
                dir.display()
            )));
        }

        let mut builder = config::Config::builder();
        for file in &files {
            debug!(file = %file.display(), "Loading configuration file");
            builder = builder.add_source(
                config::File::from(file.as_path()).format(config::FileFormat::Toml),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let mut agent_config: AgentConfig = builder.build()?.try_deserialize()?;
        agent_config.assign_profile_names();
        agent_config.validate()?;

        Ok(agent_config)
    }
}

/// `*.toml` files directly inside `dir`, sorted by file name.
fn config_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        ProfileSyncError::io(e, format!("Failed to read configuration directory {}", dir.display()))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ProfileSyncError::io(e, "Failed to read configuration directory entry"))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_config_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("20-b.toml"), "").unwrap();
        fs::write(dir.path().join("10-a.toml"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = config_files(dir.path()).unwrap();
        let names: Vec<_> =
            files.iter().map(|f| f.file_name().unwrap().to_string_lossy().to_string()).collect();
        assert_eq!(names, vec!["10-a.toml", "20-b.toml"]);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = AgentConfig::load_from_dir(Path::new("/nonexistent/profilesync")).unwrap_err();
        assert!(matches!(err, ProfileSyncError::Io { .. }));
    }

    #[test]
    fn test_empty_directory_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AgentConfig::load_from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ProfileSyncError::Config { .. }));
    }
}
