use std::sync::Arc;

use url::Url;

use common::content::{ContentTypeError, ContentTypeRegistry};
use common::credential::{CredentialError, JwtAuthority};

use crate::database::{Database, DatabaseSetupError};
use crate::media::{MediaStore, MediaStoreError};
use crate::service_config::Config;

/// Main service state, shared by every request handler
#[derive(Clone, Debug)]
pub struct State {
    database: Database,
    credentials: Arc<JwtAuthority>,
    media: MediaStore,
    content_types: Arc<ContentTypeRegistry>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let sqlite_database_url = match config.sqlite_path {
            Some(ref path) => {
                // the parent directory has to exist, the file is created on demand
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        return Err(StateSetupError::DatabasePathDoesNotExist);
                    }
                }
                Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)
            }
            // otherwise just set up an in-memory database
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!("Database URL: {:?}", sqlite_database_url);
        let database = Database::connect(&sqlite_database_url).await?;

        // 2. Setup credential signing
        let credentials = JwtAuthority::new(&config.jwt_secret, config.token_ttl)?;

        // 3. Setup media store
        let public_base = config
            .media_public_base()
            .map_err(MediaStoreError::from)?;
        let media = MediaStore::new(&config.media, public_base).await?;
        tracing::debug!(backend = ?config.media, "media store ready");

        // 4. Register content kinds
        let content_types = ContentTypeRegistry::with_custom(&config.content_types)?;

        Ok(Self {
            database,
            credentials: Arc::new(credentials),
            media,
            content_types: Arc::new(content_types),
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn credentials(&self) -> &JwtAuthority {
        &self.credentials
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    pub fn content_types(&self) -> &ContentTypeRegistry {
        &self.content_types
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database path does not exist")]
    DatabasePathDoesNotExist,
    #[error("Database setup error: {0}")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,
    #[error("Credential setup error: {0}")]
    Credentials(#[from] CredentialError),
    #[error("Media store error: {0}")]
    Media(#[from] MediaStoreError),
    #[error("Content type error: {0}")]
    ContentTypes(#[from] ContentTypeError),
}
