//! Unit tests for configuration and graceful degradation
//!
//! Covers:
//! - Missing TOML files do not cause termination
//! - Broken TOML files fall back to defaults
//! - Priority order for root folder resolution
//! - Automatic directory creation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate HYMNAL_ROOT_FOLDER or HYMNAL_CONFIG are marked with
//! #[serial] so they run sequentially.

use hymnal_common::config::{
    CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig, CONFIG_FILE_ENV,
    ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert!(defaults.root_folder.ends_with("hymnal"));
    assert_eq!(defaults.log_level, "info");
    assert_eq!(defaults.port, 5780);
    assert_eq!(defaults.server_url, "http://127.0.0.1:5780");
    assert_eq!(defaults.request_timeout, Duration::from_secs(10));
}

#[test]
#[serial]
fn test_resolver_cli_arg_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/hymnal-env-folder");

    let resolver = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/hymnal-cli-folder")));

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/hymnal-cli-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/hymnal-env-folder");

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/hymnal-toml-folder")),
        ..TomlConfig::default()
    };
    let resolver = RootFolderResolver::new("test-module").with_toml(toml);

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/hymnal-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_toml_beats_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/hymnal-toml-folder")),
        ..TomlConfig::default()
    };
    let resolver = RootFolderResolver::new("test-module").with_toml(toml);

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/hymnal-toml-folder"));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolver = RootFolderResolver::new("test-module").with_toml(TomlConfig::default());

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(resolver.resolve(), defaults.root_folder);
}

#[test]
fn test_toml_config_parses_all_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/hymnal"
port = 6000
server_url = "http://hymns.local:6000"
session_token = "abc"
request_timeout_secs = 3

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = TomlConfig::load_from(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/hymnal")));
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.server_url.as_deref(), Some("http://hymns.local:6000"));
    assert_eq!(config.session_token.as_deref(), Some("abc"));
    assert_eq!(config.request_timeout(), Duration::from_secs(3));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_toml_config_empty_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "").unwrap();

    let config = TomlConfig::load_from(&path).unwrap();
    assert!(config.root_folder.is_none());
    assert!(config.session_token.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.request_timeout(), Duration::from_secs(10));
}

#[test]
fn test_toml_config_invalid_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    assert!(TomlConfig::load_from(&path).is_err());
}

#[test]
#[serial]
fn test_load_or_default_ignores_broken_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is [not toml").unwrap();
    env::set_var(CONFIG_FILE_ENV, &path);

    let config = TomlConfig::load_or_default();
    assert!(config.root_folder.is_none());

    env::remove_var(CONFIG_FILE_ENV);
}

#[test]
#[serial]
fn test_load_or_default_reads_env_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "server_url = \"http://example.test\"").unwrap();
    env::set_var(CONFIG_FILE_ENV, &path);

    let config = TomlConfig::load_or_default();
    assert_eq!(config.server_url.as_deref(), Some("http://example.test"));

    env::remove_var(CONFIG_FILE_ENV);
}

#[test]
fn test_initializer_paths() {
    let root = PathBuf::from("/tmp/hymnal-test-root");
    let initializer = RootFolderInitializer::new(root.clone());

    assert_eq!(initializer.database_path(), root.join("hymnal.db"));
    assert_eq!(initializer.local_storage_path(), root.join("local_storage.json"));
}

#[test]
fn test_initializer_database_exists() {
    let dir = tempfile::tempdir().unwrap();
    let initializer = RootFolderInitializer::new(dir.path().join("missing"));

    assert!(!initializer.database_exists());
}

#[test]
fn test_initializer_idempotent_directory_creation() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("root");
    let initializer = RootFolderInitializer::new(root.clone());

    assert!(initializer.ensure_directory_exists().is_ok());
    assert!(initializer.ensure_directory_exists().is_ok());
    assert!(root.is_dir());
}
