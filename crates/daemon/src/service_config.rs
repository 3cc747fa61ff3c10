use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::media::MediaStoreConfig;

/// Resolved runtime configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Port for the API HTTP server
    pub api_port: u16,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,

    // credentials
    /// HS256 secret used to sign and verify owner credentials
    pub jwt_secret: String,
    /// Lifetime of issued credentials, if they should expire at all
    pub token_ttl: Option<Duration>,

    // media
    pub media: MediaStoreConfig,
    /// Base URL uploads are served from. Defaults to this server's
    ///  `/api/v1/media/` route.
    pub media_public_url: Option<Url>,

    /// Content kinds accepted on top of the built-in ones
    pub content_types: Vec<String>,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// In-memory database and media store, for tests and local experiments.
    pub fn ephemeral(jwt_secret: impl Into<String>) -> Self {
        Self {
            api_port: 5000,
            sqlite_path: None,
            jwt_secret: jwt_secret.into(),
            token_ttl: None,
            media: MediaStoreConfig::Memory,
            media_public_url: None,
            content_types: Vec::new(),
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }

    pub fn media_public_base(&self) -> Result<Url, url::ParseError> {
        match &self.media_public_url {
            Some(url) => Ok(url.clone()),
            None => Url::parse(&format!("http://localhost:{}/api/v1/media/", self.api_port)),
        }
    }
}
