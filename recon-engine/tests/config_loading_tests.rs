//! Engine configuration loading tests
//!
//! Covers `ReconConfig::load` resolution through the CLI argument and the
//! RECON_CONFIG environment variable, plus rejection of unusable files.
//!
//! Note: Tests touching RECON_CONFIG are marked #[serial].

use recon_common::config::CONFIG_ENV_VAR;
use recon_engine::config::TargetPolicy;
use recon_engine::ReconConfig;
use serial_test::serial;
use std::env;
use std::fs;

const SINGLE_QUEUE: &str = r#"
[polling]
sync_max_attempts = 2
stability_repeats = 3

[reconcile]
target_policy = "zero_when_all_failed"

[[queues]]
name = "local"
base_url = "http://localhost:8080/LOCAL"

[[queues.rules]]
subscription_id = "sub_local"
include = ["eur"]
"#;

/// TC-CFG-001: Explicit path is loaded and reported as the source
#[test]
#[serial]
fn tc_cfg_001_cli_path_loaded() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recon.toml");
    fs::write(&path, SINGLE_QUEUE).unwrap();

    let (config, source) = ReconConfig::load(Some(&path)).unwrap();

    assert_eq!(source.as_deref(), Some(path.as_path()));
    assert_eq!(config.queues.len(), 1);
    assert_eq!(config.queues[0].endpoints.submit_url, "http://localhost:8080/LOCAL/subir");
    assert_eq!(config.polling.sync_max_attempts, 2);
    assert_eq!(config.polling.stability_repeats, 3);
    // Unspecified knobs keep their defaults
    assert_eq!(config.polling.reconcile_interval_ms, 1000);
    assert_eq!(config.reconcile.target_policy, TargetPolicy::ZeroWhenAllFailed);
    assert_eq!(config.validation.len(), 2);
}

/// TC-CFG-002: RECON_CONFIG is used when no CLI path is given
#[test]
#[serial]
fn tc_cfg_002_env_var_path_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("from-env.toml");
    fs::write(&path, SINGLE_QUEUE).unwrap();
    env::set_var(CONFIG_ENV_VAR, &path);

    let result = ReconConfig::load(None);
    env::remove_var(CONFIG_ENV_VAR);

    let (config, source) = result.unwrap();
    assert_eq!(source, Some(path));
    assert_eq!(config.queues[0].name, "local");
}

/// TC-CFG-003: Missing explicit file degrades to built-in defaults
#[test]
#[serial]
fn tc_cfg_003_missing_file_uses_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let (config, source) = ReconConfig::load(Some(&missing)).unwrap();

    assert!(source.is_none());
    assert_eq!(config, ReconConfig::default());
}

/// TC-CFG-004: Malformed TOML is an error, never silently ignored
#[test]
#[serial]
fn tc_cfg_004_malformed_file_is_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[[queues]\nname = ").unwrap();

    assert!(ReconConfig::load(Some(&path)).is_err());
}

/// TC-CFG-005: Well-formed but invalid config is rejected at load
#[test]
#[serial]
fn tc_cfg_005_invalid_config_rejected() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invalid.toml");
    fs::write(
        &path,
        r#"
        [polling]
        stability_repeats = 0
        "#,
    )
    .unwrap();

    let err = ReconConfig::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("stability_repeats"), "got: {err}");
}
