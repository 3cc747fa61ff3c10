//! Object storage for uploaded files (S3/MinIO/local filesystem/memory).

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

const UPLOADS_PREFIX: &str = "uploads";

/// Configuration for the media storage backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaStoreConfig {
    /// In-memory storage (for testing)
    #[default]
    Memory,

    /// Local filesystem storage
    Local {
        /// Path to the storage directory
        path: PathBuf,
    },

    /// S3-compatible storage (AWS S3, MinIO, etc.)
    S3 {
        /// S3 endpoint URL (e.g., "http://localhost:9000" for MinIO)
        endpoint: String,
        access_key: String,
        secret_key: String,
        bucket: String,
        /// Optional region (defaults to "us-east-1")
        region: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("object storage error: {0}")]
    ObjectStore(#[from] object_store::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid media key: {0}")]
    InvalidKey(String),
    #[error("invalid media url: {0}")]
    Url(#[from] url::ParseError),
}

/// Where an upload landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub key: String,
    pub url: Url,
}

/// Uploaded files, plus the public base URL they are served from.
#[derive(Debug, Clone)]
pub struct MediaStore {
    inner: Arc<dyn ObjectStore>,
    public_base: Url,
}

impl MediaStore {
    pub async fn new(config: &MediaStoreConfig, public_base: Url) -> Result<Self, MediaStoreError> {
        let inner: Arc<dyn ObjectStore> = match config {
            MediaStoreConfig::Memory => Arc::new(InMemory::new()),

            MediaStoreConfig::Local { path } => {
                tokio::fs::create_dir_all(path).await?;
                Arc::new(
                    LocalFileSystem::new_with_prefix(path)
                        .map_err(|e| MediaStoreError::InvalidConfig(e.to_string()))?,
                )
            }

            MediaStoreConfig::S3 {
                endpoint,
                access_key,
                secret_key,
                bucket,
                region,
            } => Arc::new(
                AmazonS3Builder::new()
                    .with_endpoint(endpoint)
                    .with_access_key_id(access_key)
                    .with_secret_access_key(secret_key)
                    .with_bucket_name(bucket)
                    .with_region(region.as_deref().unwrap_or("us-east-1"))
                    .with_allow_http(endpoint.starts_with("http://"))
                    .build()
                    .map_err(|e| MediaStoreError::InvalidConfig(e.to_string()))?,
            ),
        };

        Ok(Self {
            inner,
            public_base: with_trailing_slash(public_base),
        })
    }

    /// An in-memory store, served from `public_base`.
    pub fn memory(public_base: Url) -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
            public_base: with_trailing_slash(public_base),
        }
    }

    /// Public URL for a stored key.
    pub fn url_for(&self, key: &str) -> Result<Url, MediaStoreError> {
        Ok(self.public_base.join(key)?)
    }

    /// Store an upload under a fresh key derived from its file name.
    pub async fn put(&self, file_name: &str, data: Bytes) -> Result<StoredMedia, MediaStoreError> {
        let key = format!(
            "{}/{}-{}",
            UPLOADS_PREFIX,
            Uuid::new_v4(),
            sanitize_file_name(file_name)
        );
        let size = data.len();
        self.inner.put(&ObjectPath::from(key.as_str()), data.into()).await?;
        tracing::debug!(%key, size, "stored media");

        Ok(StoredMedia {
            url: self.url_for(&key)?,
            key,
        })
    }

    pub async fn get(&self, key: &str) -> Result<Option<Bytes>, MediaStoreError> {
        let path = ObjectPath::parse(key).map_err(|_| MediaStoreError::InvalidKey(key.into()))?;
        match self.inner.get(&path).await {
            Ok(result) => Ok(Some(result.bytes().await?)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, key: &str) -> Result<(), MediaStoreError> {
        let path = ObjectPath::parse(key).map_err(|_| MediaStoreError::InvalidKey(key.into()))?;
        // already gone is fine
        match self.inner.delete(&path).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Keep file names to a conservative character set so keys are valid
///  object paths and URL segments.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MediaStore {
        MediaStore::memory(Url::parse("http://localhost:5000/api/v1/media").unwrap())
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("photo.png"), "photo.png");
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let media = store();
        let stored = media
            .put("cat.png", Bytes::from_static(b"meow"))
            .await
            .unwrap();

        assert!(stored.key.starts_with("uploads/"));
        assert!(stored.key.ends_with("-cat.png"));
        assert_eq!(
            stored.url.as_str(),
            format!("http://localhost:5000/api/v1/media/{}", stored.key)
        );

        let data = media.get(&stored.key).await.unwrap().unwrap();
        assert_eq!(&data[..], b"meow");

        media.delete(&stored.key).await.unwrap();
        assert!(media.get(&stored.key).await.unwrap().is_none());

        // deleting twice is not an error
        media.delete(&stored.key).await.unwrap();
    }
}
