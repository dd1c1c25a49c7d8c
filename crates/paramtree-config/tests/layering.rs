//! Layered loading from files and the environment.

use std::env;
use std::fs;

use paramtree_config::{ConfigError, ConfigLoader, LogFormat};

#[test]
fn test_toml_file_then_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paramtree.toml");
    fs::write(
        &path,
        r#"
[loader]
fail_on_existing = true

[broadcast]
root = 1

[telemetry.logging]
level = "warn"
"#,
    )
    .unwrap();

    env::set_var("PTLAYER__BROADCAST__ROOT", "2");
    env::set_var("PTLAYER__TELEMETRY__LOGGING__FORMAT", "json");
    let config = ConfigLoader::new()
        .with_file(&path)
        .unwrap()
        .with_env_prefix("ptlayer")
        .load();
    env::remove_var("PTLAYER__BROADCAST__ROOT");
    env::remove_var("PTLAYER__TELEMETRY__LOGGING__FORMAT");
    let config = config.unwrap();

    assert!(config.loader.fail_on_existing);
    assert!(config.loader.cwd_fallback);
    assert_eq!(config.broadcast.root, 2);
    assert_eq!(config.telemetry.logging.level, "warn");
    assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    assert_eq!(config.parallel_build().root, 2);
}

#[test]
fn test_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paramtree.json");
    fs::write(&path, r#"{"loader": {"cwd_fallback": false}}"#).unwrap();

    let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();
    assert!(!config.load_options().cwd_fallback);
}

#[test]
fn test_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paramtree.ini");
    fs::write(&path, "[loader]\n").unwrap();

    let err = ConfigLoader::new().with_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
}

#[test]
fn test_bad_env_value_fails_load() {
    env::set_var("PTBADENV__LOADER__CWD_FALLBACK", "sometimes");
    let result = ConfigLoader::new().with_env_prefix("PTBADENV").load();
    env::remove_var("PTBADENV__LOADER__CWD_FALLBACK");
    assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
}
