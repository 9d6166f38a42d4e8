//! # Command Line Interface
//!
//! Argument parsing for the agent binary. Every directory option falls back
//! to an environment variable, matching how a service manager passes them.

use clap::Parser;
use std::path::{Component, Path, PathBuf};

use crate::errors::{ProfileSyncError, Result};

/// Directory systemd units are written to unless overridden.
pub const DEFAULT_SYSTEMD_DIRECTORY: &str = "/run/systemd/system";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "profilesync")]
#[command(about = "Keeps configuration profiles in sync with a remote config store")]
#[command(version = env!("CARGO_PKG_VERSION"), disable_version_flag = true)]
pub struct Cli {
    /// Read configuration from the given directory instead of from $CONFIGURATION_DIRECTORY
    #[arg(short = 'c', long, env = "CONFIGURATION_DIRECTORY", value_name = "DIRECTORY")]
    pub configuration_directory: Option<String>,

    /// Use the given directory for writing log files instead of $LOGS_DIRECTORY
    #[arg(short = 'l', long, env = "LOGS_DIRECTORY", value_name = "DIRECTORY")]
    pub logs_directory: Option<String>,

    /// Write out systemd configuration to the given directory
    #[arg(short = 's', long, default_value = DEFAULT_SYSTEMD_DIRECTORY, value_name = "DIRECTORY")]
    pub systemd_directory: String,

    /// Run a single refresh cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: (),
}

/// Validated directories the agent works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPaths {
    /// Absolute
    pub configuration_directory: PathBuf,
    pub logs_directory: Option<PathBuf>,
    pub systemd_directory: PathBuf,
}

impl Cli {
    /// Check required options and expand directories to absolute paths.
    pub fn validate(&self) -> Result<AgentPaths> {
        let configuration_directory = match self.configuration_directory.as_deref() {
            Some(dir) if !dir.is_empty() => expand_path(dir)?,
            _ => {
                return Err(ProfileSyncError::validation_field(
                    "configuration_directory must be present",
                    "configuration_directory",
                ))
            }
        };

        Ok(AgentPaths {
            configuration_directory,
            logs_directory: self.logs_directory.as_ref().map(PathBuf::from),
            systemd_directory: PathBuf::from(&self.systemd_directory),
        })
    }
}

/// Expand `~` and resolve relative paths against the current directory.
///
/// The result is lexically normalized; the filesystem is not consulted.
pub fn expand_path(path: impl AsRef<Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| ProfileSyncError::io(e, "Failed to determine current directory"))?;
    let home = std::env::var_os("HOME").map(PathBuf::from);
    Ok(expand_path_from(path.as_ref(), &cwd, home.as_deref()))
}

/// [`expand_path`] with an explicit working and home directory.
pub fn expand_path_from(path: &Path, cwd: &Path, home: Option<&Path>) -> PathBuf {
    let mut components = path.components().peekable();

    let base = match (components.peek(), home) {
        (Some(Component::Normal(first)), Some(home)) if *first == "~" => {
            components.next();
            home.to_path_buf()
        }
        _ if path.is_absolute() => PathBuf::new(),
        _ => cwd.to_path_buf(),
    };

    let mut expanded = base;
    for component in components {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                expanded.pop();
            }
            other => expanded.push(other),
        }
    }
    expanded
}
