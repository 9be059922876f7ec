// ABOUTME: Behavioral tests for configuration loading and client construction
// Verifies file overrides, command-line precedence and endpoint validation

use std::collections::HashMap;
use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use topos::config::{ConfigOverrides, ToposConfig, ENV_TIMEOUT};
use topos::{PoolClient, ToposError};

/// An explicit config file is applied, and flags still win over it
#[test]
fn test_explicit_config_file_then_flags() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("topos.toml");
    fs::write(
        &path,
        "endpoint = \"http://file.example/4.1\"\ntimeout_secs = 20\nlock_description = \"node-a\"\n",
    )
    .unwrap();

    let config = ToposConfig::load_from(
        &[],
        &HashMap::new(),
        &ConfigOverrides {
            config_file: Some(path),
            endpoint: Some("http://flag.example/api".to_string()),
            timeout_secs: None,
        },
    )
    .unwrap();

    assert_eq!(config.endpoint, "http://flag.example/api/");
    assert_eq!(config.timeout_secs, 20);
    assert_eq!(config.lock_description.as_deref(), Some("node-a"));
}

/// A named config file that does not exist is an error, not silently skipped
#[test]
fn test_missing_explicit_config_file() {
    let err = ToposConfig::load_from(
        &[],
        &HashMap::new(),
        &ConfigOverrides {
            config_file: Some("/no/such/topos.toml".into()),
            ..ConfigOverrides::default()
        },
    )
    .unwrap_err();

    assert!(err.to_string().contains("Failed to read config"));
}

/// Files apply in order, then the environment, then flags
#[test]
fn test_layers_apply_in_precedence_order() {
    let dir = TempDir::new().unwrap();
    let site = dir.path().join("site.toml");
    let user = dir.path().join("user.toml");
    let explicit = dir.path().join("explicit.toml");
    fs::write(&site, "timeout_secs = 30\nlock_description = \"site\"\n").unwrap();
    fs::write(&user, "timeout_secs = 60\n").unwrap();
    fs::write(&explicit, "lock_description = \"explicit\"\n").unwrap();

    let overrides = ConfigOverrides {
        config_file: Some(explicit),
        ..ConfigOverrides::default()
    };

    let from_files =
        ToposConfig::load_from(&[site.clone(), user.clone()], &HashMap::new(), &overrides).unwrap();
    assert_eq!(from_files.timeout_secs, 60);
    assert_eq!(from_files.lock_description.as_deref(), Some("explicit"));

    let env = HashMap::from([(ENV_TIMEOUT.to_string(), "45".to_string())]);
    let with_env = ToposConfig::load_from(&[site, user], &env, &overrides).unwrap();
    assert_eq!(with_env.timeout_secs, 45);
}

/// Config roundtrips through TOML
#[test]
fn test_config_serialization_roundtrip() {
    let config = ToposConfig {
        endpoint: "http://localhost:8080/4.1/".to_string(),
        timeout_secs: 0,
        lock_description: Some("ce01".to_string()),
    };

    let toml_str = toml::to_string_pretty(&config).expect("Config should serialize to TOML");
    let parsed: ToposConfig = toml::from_str(&toml_str).expect("Config should parse back");

    assert_eq!(parsed, config);
}

/// The client refuses endpoints that cannot carry path segments
#[test]
fn test_client_rejects_unusable_endpoint() {
    let err = PoolClient::new(&ToposConfig {
        endpoint: "mailto:ops@example.org".to_string(),
        ..ToposConfig::default()
    })
    .unwrap_err();

    assert!(matches!(err, ToposError::Config(_)));
    assert_eq!(err.exit_code_value(), topos::error::EXIT_CONFIG);
}

/// Without a configured description, locks carry the host name
#[test]
fn test_default_lock_description_is_host_name() {
    let client = PoolClient::new(&ToposConfig::default()).unwrap();
    assert!(!client.lock_description().is_empty());
}
