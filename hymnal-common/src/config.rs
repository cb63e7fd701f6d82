//! Configuration loading and root folder resolution
//!
//! Priority order for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unparsable TOML file is never fatal: a warning is logged and
//! the compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "HYMNAL_ROOT_FOLDER";

/// Environment variable overriding the config file location
pub const CONFIG_FILE_ENV: &str = "HYMNAL_CONFIG";

/// Default service port
pub const DEFAULT_PORT: u16 = 5780;

/// Default request timeout for remote calls
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// File name of the service database inside the root folder
const DATABASE_FILE: &str = "hymnal.db";

/// File name of the client local storage inside the root folder
const LOCAL_STORAGE_FILE: &str = "local_storage.json";

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub port: u16,
    pub server_url: String,
    pub request_timeout: Duration,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: "info".to_string(),
            port: DEFAULT_PORT,
            server_url: format!("http://127.0.0.1:{}", DEFAULT_PORT),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/hymnal (or /var/lib/hymnal for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("hymnal"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/hymnal"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("hymnal"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/hymnal"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("hymnal"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\hymnal"))
    } else {
        PathBuf::from("./hymnal_data")
    }
}

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database and local storage
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Service port (server only)
    #[serde(default)]
    pub port: Option<u16>,

    /// Base URL of the favorites service (client only)
    #[serde(default)]
    pub server_url: Option<String>,

    /// Session token issued by the identity provider (client only)
    ///
    /// When absent the client runs in anonymous mode.
    #[serde(default)]
    pub session_token: Option<String>,

    /// Timeout for each remote call, in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
    }

    /// Load the platform config file, falling back to defaults
    ///
    /// Never fails: a missing file is logged at debug, a broken one at warn.
    pub fn load_or_default() -> Self {
        let Some(path) = find_config_file() else {
            debug!("No config file found, using compiled defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Request timeout, or the compiled default
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

/// Locate the config file for the platform
///
/// `HYMNAL_CONFIG` wins; then `~/.config/hymnal/config.toml`; then
/// `/etc/hymnal/config.toml` on Linux.
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        let path = PathBuf::from(path);
        return path.exists().then_some(path);
    }

    let user_config = dirs::config_dir().map(|d| d.join("hymnal").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/hymnal/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Root folder resolution
///
/// 1. Command-line argument
/// 2. `HYMNAL_ROOT_FOLDER`
/// 3. `root_folder` in the TOML config
/// 4. Compiled default
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml: Option<TomlConfig>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml: None,
        }
    }

    /// Command-line override
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Use an already loaded TOML config instead of searching for one
    pub fn with_toml(mut self, toml: TomlConfig) -> Self {
        self.toml = Some(toml);
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!(module = %self.module_name, "Root folder from command line");
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            debug!(module = %self.module_name, "Root folder from {}", ROOT_FOLDER_ENV);
            return PathBuf::from(path);
        }

        let toml_root = match &self.toml {
            Some(toml) => toml.root_folder.clone(),
            None => TomlConfig::load_or_default().root_folder,
        };
        if let Some(path) = toml_root {
            debug!(module = %self.module_name, "Root folder from config file");
            return path;
        }

        let default = CompiledDefaults::for_current_platform().root_folder;
        info!(
            module = %self.module_name,
            "Using default root folder {}",
            default.display()
        );
        default
    }
}

/// Creates the root folder and names the files inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder if missing (idempotent)
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }

    pub fn local_storage_path(&self) -> PathBuf {
        self.root_folder.join(LOCAL_STORAGE_FILE)
    }
}
