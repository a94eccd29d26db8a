use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use crate::acquisition::{Acquisition, AcquisitionError, AssetHandle, AssetReference, DownloadJob, Rendition};
use crate::download::{ffmpeg, playlist, DownloadClient};

pub const BASE_URL: &str = "https://kinescope.io/";

/// Kinescope video host. Lists qualities from the video's HLS master playlist
/// and leaves fetching and muxing to ffmpeg.
pub struct KinescopeClient {
    client: DownloadClient,
    base: Url,
}

impl KinescopeClient {
    pub fn new(base: Url) -> Result<Self, AcquisitionError> {
        Ok(Self {
            client: DownloadClient::new()?,
            base,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AcquisitionError> {
        self.base
            .join(path)
            .map_err(|err| AcquisitionError::Catalog(format!("bad endpoint {}: {}", path, err)))
    }
}

/// `https://kinescope.io/embed/abc123/` -> `abc123`
pub fn video_id(url: &Url) -> Option<&str> {
    url.path_segments()?.filter(|segment| !segment.is_empty()).last()
}

#[async_trait]
impl Acquisition for KinescopeClient {
    async fn resolve(&self, asset: &AssetReference) -> Result<AssetHandle, AcquisitionError> {
        let resolution_error = |reason: String| AcquisitionError::AssetResolution {
            url: asset.url().to_string(),
            reason,
        };

        let id = video_id(asset.url())
            .ok_or_else(|| resolution_error("url does not contain a video id".to_string()))?
            .to_string();

        let embed = self
            .base
            .join(&format!("embed/{}", id))
            .map_err(|err| resolution_error(err.to_string()))?;
        if let Err(err) = self.client.download(&embed, asset.referer()).await {
            return Err(resolution_error(err.to_string()));
        }

        info!("Resolved video {}", id);
        Ok(AssetHandle {
            id,
            asset: asset.clone(),
        })
    }

    async fn list_renditions(&self, handle: &AssetHandle) -> Result<Vec<Rendition>, AcquisitionError> {
        let master_url = self.endpoint(&format!("{}/master.m3u8", handle.id))?;

        let master = match self.client.download(&master_url, handle.asset.referer()).await {
            Ok(master) => master,
            Err(err) => {
                warn!("Error downloading master playlist: {}", err);
                return Err(AcquisitionError::Catalog(err.to_string()));
            }
        };

        let renditions = playlist::parse_master(&master, &master_url)?;
        if renditions.is_empty() {
            return Err(AcquisitionError::Catalog(format!("no video streams in {}", master_url)));
        }

        Ok(renditions)
    }

    async fn download(&self, handle: &AssetHandle, job: &DownloadJob) -> Result<(), AcquisitionError> {
        ffmpeg::ensure_tool("ffmpeg", &job.ffmpeg_path)?;
        // keys are never fetched here, so the decrypt tool is passed through unused
        debug!("Not using mp4decrypt at {}", job.mp4decrypt_path.display());

        tokio::fs::create_dir_all(&job.temp_dir).await?;
        let temp_file = job
            .temp_dir
            .join(format!("{}_{}p.mp4", handle.id, job.rendition.resolution));

        ffmpeg::remux(&job.ffmpeg_path, &job.rendition.stream_id, job.asset.referer(), &temp_file).await?;

        move_file(&temp_file, &job.output).await?;
        info!("Saved {}", job.output.display());

        Ok(())
    }
}

/// Renames `from` to `to`, copying when they are on different filesystems.
async fn move_file(from: &Path, to: &Path) -> Result<(), AcquisitionError> {
    if let Some(parent) = to.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    if let Err(err) = tokio::fs::rename(from, to).await {
        debug!("Rename failed ({}), copying instead", err);
        tokio::fs::copy(from, to).await?;
        tokio::fs::remove_file(from).await?;
    }

    Ok(())
}
