//! Client configuration
//!
//! Command line (with env fallbacks handled by clap) wins over the TOML
//! file, which wins over compiled defaults.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hymnal_common::config::{
    CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
};

use crate::identity::IdentityMode;
use crate::local_store::LocalFavoriteStore;
use crate::storage::FileStorage;

/// Values given on the command line or through their env variables
#[derive(Debug, Clone, Default)]
pub struct ClientOverrides {
    pub server_url: Option<String>,
    pub session_token: Option<String>,
    pub root_folder: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub session_token: Option<String>,
    pub root_folder: PathBuf,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn resolve(overrides: ClientOverrides, toml: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder = RootFolderResolver::new("hymnal-fav")
            .with_cli_arg(overrides.root_folder)
            .with_toml(toml.clone())
            .resolve();

        let request_timeout = overrides
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| {
                if toml.request_timeout_secs.is_some() {
                    toml.request_timeout()
                } else {
                    defaults.request_timeout
                }
            });

        Self {
            server_url: overrides
                .server_url
                .or_else(|| toml.server_url.clone())
                .unwrap_or(defaults.server_url),
            session_token: overrides.session_token.or_else(|| toml.session_token.clone()),
            root_folder,
            request_timeout,
        }
    }

    pub fn identity(&self) -> IdentityMode {
        IdentityMode::from_token(self.session_token.clone())
    }

    /// Local favorite store backed by the profile's storage file
    pub fn local_store(&self) -> LocalFavoriteStore {
        let path = RootFolderInitializer::new(self.root_folder.clone()).local_storage_path();
        LocalFavoriteStore::new(Arc::new(FileStorage::new(path)))
    }
}

// Tokens must not end up in logs
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_url", &self.server_url)
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("root_folder", &self.root_folder)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn parse_toml(content: &str) -> TomlConfig {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        TomlConfig::load_from(&path).unwrap()
    }

    #[test]
    #[serial]
    fn test_defaults() {
        std::env::remove_var(hymnal_common::config::ROOT_FOLDER_ENV);
        let config = ClientConfig::resolve(ClientOverrides::default(), &TomlConfig::default());
        assert_eq!(config.server_url, "http://127.0.0.1:5780");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.identity(), IdentityMode::Anonymous);
    }

    #[test]
    #[serial]
    fn test_toml_values_apply() {
        std::env::remove_var(hymnal_common::config::ROOT_FOLDER_ENV);
        let toml = parse_toml(
            r#"
            root_folder = "/tmp/hymnal-toml"
            server_url = "http://hymns.example:8080"
            session_token = "abc"
            request_timeout_secs = 3
            "#,
        );

        let config = ClientConfig::resolve(ClientOverrides::default(), &toml);

        assert_eq!(config.server_url, "http://hymns.example:8080");
        assert_eq!(config.root_folder, PathBuf::from("/tmp/hymnal-toml"));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert!(config.identity().is_authenticated());
    }

    #[test]
    #[serial]
    fn test_overrides_beat_toml() {
        let toml = parse_toml(
            r#"
            server_url = "http://from-toml"
            session_token = "toml-token"
            "#,
        );
        let overrides = ClientOverrides {
            server_url: Some("http://from-cli".into()),
            session_token: Some("cli-token".into()),
            root_folder: Some(PathBuf::from("/tmp/hymnal-cli")),
            request_timeout_secs: Some(1),
        };

        let config = ClientConfig::resolve(overrides, &toml);

        assert_eq!(config.server_url, "http://from-cli");
        assert_eq!(config.session_token.as_deref(), Some("cli-token"));
        assert_eq!(config.root_folder, PathBuf::from("/tmp/hymnal-cli"));
        assert_eq!(config.request_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig {
            server_url: "http://x".into(),
            session_token: Some("very-secret".into()),
            root_folder: PathBuf::from("/tmp"),
            request_timeout: Duration::from_secs(1),
        };
        assert!(!format!("{:?}", config).contains("very-secret"));
    }
}
