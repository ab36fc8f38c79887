//! Configuration management for atelier.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "atelier";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "atelier.db";

/// Default directory (under the data dir) holding bucket contents.
const BUCKETS_DIR_NAME: &str = "storage";

/// File remembering the CLI's signed-in session.
const SESSION_FILE_NAME: &str = "session.json";

/// Fallback project URL when neither the config file nor the environment set one.
pub const DEFAULT_PROJECT_URL: &str = "http://127.0.0.1:8080";

/// Fallback public key.
pub const DEFAULT_ANON_KEY: &str = "atelier-local-public-key";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ATELIER_`, sections split on `__`,
///    e.g. `ATELIER_BACKEND__PROJECT_URL`)
/// 2. TOML config file at `~/.config/atelier/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend project configuration.
    pub backend: BackendConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Site template configuration.
    pub site: SiteConfig,
    /// Page server configuration.
    pub server: ServerConfig,
}

/// Backend project identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Public base URL of the project. Bucket objects are published under it.
    pub project_url: String,
    /// Public API key.
    pub anon_key: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/atelier/atelier.db`
    pub database_path: Option<PathBuf>,
    /// Directory holding one sub-directory per bucket.
    /// Defaults to `~/.local/share/atelier/storage`
    pub buckets_dir: Option<PathBuf>,
}

/// Site template configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory containing the page templates (`index.html`, `booking.html`, ...).
    pub templates_dir: PathBuf,
    /// Directory served under `/assets`.
    pub assets_dir: PathBuf,
}

/// Page server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            project_url: DEFAULT_PROJECT_URL.to_string(),
            anon_key: DEFAULT_ANON_KEY.to_string(),
        }
    }
}

impl BackendConfig {
    /// Whether both the project URL and the public key are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.project_url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }

    /// Fail with the setup message when the backend is not configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendNotConfigured`] when the URL or key is blank.
    pub fn ensure_configured(&self) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(Error::BackendNotConfigured)
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("site/templates"),
            assets_dir: PathBuf::from("site/assets"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ATELIER_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// A blank URL or key is allowed here; it is reported when the backend is
    /// first used (see [`BackendConfig::ensure_configured`]).
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let url = self.backend.project_url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::ConfigValidation {
                message: format!("project_url must start with http:// or https:// (got {url})"),
            });
        }

        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("invalid bind address: {}", self.server.bind),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the buckets directory, resolving defaults if not set.
    #[must_use]
    pub fn buckets_dir(&self) -> PathBuf {
        self.storage
            .buckets_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(BUCKETS_DIR_NAME))
    }

    /// Get the path of the CLI session file, next to the database.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.database_path().with_file_name(SESSION_FILE_NAME)
    }

    /// Get the server bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!("invalid bind address: {}", self.server.bind),
            })
    }
}
