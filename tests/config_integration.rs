//! Integration tests for loading agent configuration from a directory
//!
//! These tests write TOML files into a temporary configuration directory
//! and check merging order, environment overrides and validation.

use profilesync::config::AgentConfig;
use profilesync::errors::ProfileSyncError;
use profilesync::secrets::SecretsBackendType;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

// Use a mutex to serialize tests that read or modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const AGENT_TOML: &str = r#"
client_id = "web-01"
refresh_interval_seconds = 120

[config_store]
base_url = "http://config.internal:2772"
timeout_seconds = 10

[profiles.web]
application = "shop"
environment = "prod"
profile = "web-config"
"#;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_load_single_file() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "10-agent.toml", AGENT_TOML);

    let config = AgentConfig::load_from_dir(dir.path()).unwrap();

    assert_eq!(config.client_id, "web-01");
    assert_eq!(config.refresh_interval_seconds, 120);
    assert_eq!(config.config_store.base_url, "http://config.internal:2772");
    assert_eq!(config.config_store.timeout_seconds, 10);
    assert_eq!(config.secrets.backend, SecretsBackendType::Env);
    assert_eq!(config.observability.log_level, "info");

    let web = &config.profiles["web"];
    assert_eq!(web.name, "web");
    assert_eq!(web.application, "shop");
    assert_eq!(web.profile, "web-config");
}

#[test]
fn test_later_files_override_earlier_ones() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "10-agent.toml", AGENT_TOML);
    write(
        dir.path(),
        "20-local.toml",
        r#"
refresh_interval_seconds = 30

[profiles.api]
application = "shop"
environment = "prod"
profile = "api-config"

[observability]
json_logging = true
"#,
    );

    let config = AgentConfig::load_from_dir(dir.path()).unwrap();

    assert_eq!(config.refresh_interval_seconds, 30);
    assert_eq!(config.client_id, "web-01");
    let names: Vec<_> = config.profile_definitions().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["api", "web"]);
    assert!(config.observability.json_logging);
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn test_environment_overrides_files() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "agent.toml", AGENT_TOML);

    env::set_var("PROFILESYNC__OBSERVABILITY__LOG_LEVEL", "debug");
    env::set_var("PROFILESYNC__REFRESH_INTERVAL_SECONDS", "15");
    let result = AgentConfig::load_from_dir(dir.path());
    env::remove_var("PROFILESYNC__OBSERVABILITY__LOG_LEVEL");
    env::remove_var("PROFILESYNC__REFRESH_INTERVAL_SECONDS");

    let config = result.unwrap();
    assert_eq!(config.observability.log_level, "debug");
    assert_eq!(config.refresh_interval_seconds, 15);
}

#[test]
fn test_client_id_generated_when_absent() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "agent.toml",
        r#"
[profiles.web]
application = "shop"
environment = "prod"
profile = "web-config"
"#,
    );

    let config = AgentConfig::load_from_dir(dir.path()).unwrap();
    assert!(config.client_id.starts_with("profilesync-"));
    assert_eq!(config.refresh_interval_seconds, 60);
}

#[test]
fn test_invalid_profile_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "agent.toml",
        r#"
[profiles.web]
application = ""
environment = "prod"
profile = "web-config"
"#,
    );

    let err = AgentConfig::load_from_dir(dir.path()).unwrap_err();
    match err {
        ProfileSyncError::Validation { field, .. } => {
            assert_eq!(field.as_deref(), Some("profiles.web"))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_no_profiles_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "agent.toml", "client_id = \"web-01\"\n");

    let err = AgentConfig::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, ProfileSyncError::Validation { .. }));
}

#[test]
fn test_malformed_toml_is_config_error() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "agent.toml", "[profiles.web\n");

    let err = AgentConfig::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, ProfileSyncError::Config { .. }));
}

#[test]
fn test_vault_backend_settings() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "10-agent.toml", AGENT_TOML);
    write(
        dir.path(),
        "20-secrets.toml",
        r#"
[secrets]
backend = "vault"

[secrets.vault]
address = "http://127.0.0.1:8200"
token = "s.hunter2"
"#,
    );

    let config = AgentConfig::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.secrets.backend, SecretsBackendType::Vault);

    let vault = config.secrets.vault.as_ref().unwrap();
    assert_eq!(vault.kv_mount_path, "secret");
    assert_eq!(vault.token.as_ref().unwrap().expose_secret(), "s.hunter2");
    assert!(!format!("{:?}", config).contains("hunter2"));
}
