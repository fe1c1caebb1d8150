//! Unit tests for configuration resolution and graceful degradation
//!
//! Tests the behaviour of:
//! - Config path priority: CLI argument → environment → platform locations
//! - Missing TOML files SHALL NOT cause termination
//! - Malformed TOML files SHALL be reported
//! - Atomic TOML write-back
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate the config env var are marked with #[serial].

use recon_common::config::{
    load_or_default, load_toml, resolve_config_path, write_toml_config, HttpSettings,
    LoggingConfig,
};
use recon_common::Error;
use serde::{Deserialize, Serialize};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

const TEST_ENV_VAR: &str = "RECON_CONFIG_TEST";

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct SampleConfig {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    http: HttpSettings,
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_arg() {
    env::set_var(TEST_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None, TEST_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(TEST_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_arg_overrides_env_var() {
    env::set_var(TEST_ENV_VAR, "/tmp/from-env.toml");

    let cli = PathBuf::from("/tmp/from-cli.toml");
    let resolved = resolve_config_path(Some(&cli), TEST_ENV_VAR);
    assert_eq!(resolved, Some(cli));

    env::remove_var(TEST_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(TEST_ENV_VAR, "   ");

    let resolved = resolve_config_path(None, TEST_ENV_VAR);
    assert_ne!(resolved, Some(PathBuf::from("   ")));

    env::remove_var(TEST_ENV_VAR);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let config: SampleConfig = load_or_default(Some(&missing)).unwrap();
    assert_eq!(config, SampleConfig::default());
}

#[test]
fn test_no_path_uses_defaults() {
    let config: SampleConfig = load_or_default(None).unwrap();
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[logging\nlevel = ").unwrap();

    let result: Result<SampleConfig, Error> = load_or_default(Some(&path));
    assert!(matches!(result, Err(Error::TomlParse { .. })));
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    std::fs::write(&path, "[http]\ntimeout_secs = 5\n").unwrap();

    let config: SampleConfig = load_toml(&path).unwrap();
    assert_eq!(config.http.timeout_secs, 5);
    assert_eq!(config.http.user_agent, HttpSettings::default().user_agent);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_write_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = SampleConfig {
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        http: HttpSettings::default(),
    };
    write_toml_config(&config, &path).unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("toml.tmp").exists());

    let loaded: SampleConfig = load_toml(&path).unwrap();
    assert_eq!(loaded, config);
}
