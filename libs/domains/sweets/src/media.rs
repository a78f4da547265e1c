//! Media-upload collaborator.
//!
//! Images arrive as multipart parts, are spooled to a temp file
//! ([`PendingImage`]) and handed to a [`MediaStore`] that returns a durable URL.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Uploads a local file and returns its durable URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// `None` on any failure. Implementations log the cause.
    async fn upload(&self, path: &Path) -> Option<String>;
}

/// An uploaded image spooled to the temp directory.
///
/// The file is removed when this value is dropped, whether or not the
/// upload happened.
#[derive(Debug)]
pub struct PendingImage {
    path: PathBuf,
}

impl PendingImage {
    pub async fn spool(data: &[u8], original_name: Option<&str>) -> std::io::Result<Self> {
        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin");

        let path = env::temp_dir().join(format!("sweetshop-{}.{}", Uuid::new_v4(), extension));
        tokio::fs::write(&path, data).await?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "Spooled image upload");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PendingImage {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove spooled image")
            }
        }
    }
}

/// Cloudinary credentials
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Media configuration. Uploads are disabled when no Cloudinary variable is set.
#[derive(Debug, Clone, Default)]
pub struct MediaConfig {
    pub cloudinary: Option<CloudinaryConfig>,
}

const CLOUDINARY_VARS: [&str; 3] = [
    "CLOUDINARY_CLOUD_NAME",
    "CLOUDINARY_API_KEY",
    "CLOUDINARY_API_SECRET",
];

impl FromEnv for MediaConfig {
    /// All three variables or none; a partial set is an error.
    fn from_env() -> Result<Self, ConfigError> {
        let values = CLOUDINARY_VARS.map(|key| env::var(key).ok().filter(|v| !v.is_empty()));

        if values.iter().all(Option::is_none) {
            return Ok(Self { cloudinary: None });
        }

        let [cloud_name, api_key, api_secret] = values;
        let require = |value: Option<String>, key: &str| {
            value.ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };
        let cloud_name = require(cloud_name, CLOUDINARY_VARS[0])?;
        let api_key = require(api_key, CLOUDINARY_VARS[1])?;
        let api_secret = require(api_secret, CLOUDINARY_VARS[2])?;

        Ok(Self {
            cloudinary: Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
            }),
        })
    }
}

impl MediaConfig {
    /// The store matching this configuration
    pub fn into_store(self) -> Arc<dyn MediaStore> {
        match self.cloudinary {
            Some(config) => Arc::new(CloudinaryStore::new(config)),
            None => {
                tracing::warn!("Cloudinary is not configured; image uploads will fail");
                Arc::new(DisabledMediaStore)
            }
        }
    }
}

/// Used when no media backend is configured. Every upload fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMediaStore;

#[async_trait]
impl MediaStore for DisabledMediaStore {
    async fn upload(&self, path: &Path) -> Option<String> {
        tracing::error!(path = %path.display(), "Image upload attempted without a media backend");
        None
    }
}

/// Signed uploads to the Cloudinary REST API
#[derive(Clone)]
pub struct CloudinaryStore {
    config: CloudinaryConfig,
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Why a Cloudinary upload failed
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Failed to read spooled file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Cloudinary returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self::with_base_url(config, "https://api.cloudinary.com")
    }

    pub fn with_base_url(config: CloudinaryConfig, base_url: impl Into<String>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/auto/upload",
            self.base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Hex SHA-256 of the sorted signed parameters followed by the API secret
    fn sign(&self, timestamp: i64) -> String {
        let payload = format!("timestamp={}{}", timestamp, self.config.api_secret);
        format!("{:x}", Sha256::digest(payload.as_bytes()))
    }

    async fn try_upload(&self, path: &Path) -> Result<String, UploadError> {
        let data = tokio::fs::read(path).await?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let timestamp = chrono::Utc::now().timestamp();
        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(data).file_name(file_name))
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature_algorithm", "sha256")
            .text("signature", self.sign(timestamp));

        let response = self
            .http_client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected { status, body });
        }

        let uploaded: UploadResponse = response.json().await?;

        Ok(uploaded.secure_url)
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    #[tracing::instrument(skip(self), fields(cloud = %self.config.cloud_name))]
    async fn upload(&self, path: &Path) -> Option<String> {
        match self.try_upload(path).await {
            Ok(url) => {
                tracing::info!(%url, "Image uploaded");
                Some(url)
            }
            Err(e) => {
                tracing::error!(error = %e, "Image upload failed");
                None
            }
        }
    }
}
