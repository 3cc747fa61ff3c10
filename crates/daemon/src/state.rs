use std::str::FromStr;
use std::time::Duration;
use std::{fs, path::PathBuf};

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::media::MediaStoreConfig;
use crate::service_config::Config as ServiceConfig;

pub const APP_NAME: &str = "brainshare";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const SECRET_FILE_NAME: &str = "jwt.secret";
pub const MEDIA_DIR_NAME: &str = "media";

const SECRET_LEN: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Lifetime of issued credentials in seconds; credentials never expire
    ///  when unset
    #[serde(default)]
    pub token_ttl_secs: Option<u64>,
    /// Public base URL uploads are served from
    #[serde(default)]
    pub media_public_url: Option<Url>,
    /// Content kinds accepted on top of the built-in ones
    #[serde(default)]
    pub extra_content_types: Vec<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Media backend; uploads go to the `media/` directory when unset.
    ///  Kept last so it serializes as a trailing table.
    #[serde(default)]
    pub media: Option<MediaStoreConfig>,
}

fn default_api_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            token_ttl_secs: None,
            media_public_url: None,
            extra_content_types: Vec::new(),
            log_level: default_log_level(),
            media: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the brainshare directory (~/.brainshare)
    pub app_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the credential signing secret
    pub secret_path: PathBuf,
    /// Path to the local media directory
    pub media_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the brainshare directory path (custom or default ~/.brainshare)
    pub fn app_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new brainshare state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;

        if app_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&app_dir)?;

        let media_path = app_dir.join(MEDIA_DIR_NAME);
        fs::create_dir_all(&media_path)?;

        let secret: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SECRET_LEN)
            .map(char::from)
            .collect();
        let secret_path = app_dir.join(SECRET_FILE_NAME);
        fs::write(&secret_path, secret)?;

        let config = config.unwrap_or_default();
        let config_path = app_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        // Create empty database (just touch the file, it will be initialized by the service)
        let db_path = app_dir.join(DB_FILE_NAME);
        fs::write(&db_path, "")?;

        Ok(Self {
            app_dir,
            db_path,
            secret_path,
            media_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the brainshare directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;

        if !app_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = app_dir.join(DB_FILE_NAME);
        let secret_path = app_dir.join(SECRET_FILE_NAME);
        let media_path = app_dir.join(MEDIA_DIR_NAME);
        let config_path = app_dir.join(CONFIG_FILE_NAME);

        if !db_path.exists() {
            return Err(StateError::MissingFile(DB_FILE_NAME.to_string()));
        }
        if !secret_path.exists() {
            return Err(StateError::MissingFile(SECRET_FILE_NAME.to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            app_dir,
            db_path,
            secret_path,
            media_path,
            config_path,
            config,
        })
    }

    /// Load the credential signing secret
    pub fn load_secret(&self) -> Result<String, StateError> {
        let secret = fs::read_to_string(&self.secret_path)?;
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(StateError::InvalidSecret);
        }
        Ok(secret.to_string())
    }

    /// The configured media backend, or the local media directory
    pub fn media_config(&self) -> MediaStoreConfig {
        self.config
            .media
            .clone()
            .unwrap_or_else(|| MediaStoreConfig::Local {
                path: self.media_path.clone(),
            })
    }

    /// Build the runtime configuration, with optional overrides from the CLI
    pub fn service_config(
        &self,
        api_port: Option<u16>,
        log_dir: Option<PathBuf>,
    ) -> Result<ServiceConfig, StateError> {
        let log_level = tracing::Level::from_str(&self.config.log_level)
            .map_err(|_| StateError::InvalidLogLevel(self.config.log_level.clone()))?;

        Ok(ServiceConfig {
            api_port: api_port.unwrap_or(self.config.api_port),
            sqlite_path: Some(self.db_path.clone()),
            jwt_secret: self.load_secret()?,
            token_ttl: self.config.token_ttl_secs.map(Duration::from_secs),
            media: self.media_config(),
            media_public_url: self.config.media_public_url.clone(),
            content_types: self.config.extra_content_types.clone(),
            log_level,
            log_dir,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("brainshare directory not initialized. Run 'brainshare init' first")]
    NotInitialized,

    #[error("brainshare directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("credential secret file is empty")]
    InvalidSecret,

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
