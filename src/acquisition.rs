//! The boundary to the acquisition pipeline.
//!
//! Manifest handling, segment transport, key handling, decryption and muxing
//! all live behind [`Acquisition`]. The orchestrator only sees the handle, the
//! ordered rendition list and the success or failure of the final download.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Could not resolve {url}: {reason}")]
    AssetResolution { url: String, reason: String },

    #[error("Could not list qualities: {0}")]
    Catalog(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("{tool} not found at {}", .path.display())]
    MissingTool { tool: &'static str, path: PathBuf },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A validated video URL plus the page it is embedded in, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    url: Url,
    referer: Option<Url>,
}

impl AssetReference {
    pub fn new(url: Url, referer: Option<Url>) -> Self {
        Self { url, referer }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn referer(&self) -> Option<&Url> {
        self.referer.as_ref()
    }
}

/// Opaque reference to a resolved asset, passed back into later calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHandle {
    pub id: String,
    pub asset: AssetReference,
}

/// One quality variant of the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    pub stream_id: String,
    pub resolution: u32,
}

impl Rendition {
    pub fn new(stream_id: impl Into<String>, resolution: u32) -> Self {
        Self {
            stream_id: stream_id.into(),
            resolution,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub asset: AssetReference,
    pub rendition: Rendition,
    pub output: PathBuf,
    pub temp_dir: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub mp4decrypt_path: PathBuf,
}

#[async_trait]
pub trait Acquisition: Send + Sync {
    async fn resolve(&self, asset: &AssetReference) -> Result<AssetHandle, AcquisitionError>;

    /// Renditions ordered by ascending resolution.
    async fn list_renditions(&self, handle: &AssetHandle) -> Result<Vec<Rendition>, AcquisitionError>;

    /// Fetches, decrypts and muxes `job.rendition` into `job.output`.
    async fn download(&self, handle: &AssetHandle, job: &DownloadJob) -> Result<(), AcquisitionError>;
}
