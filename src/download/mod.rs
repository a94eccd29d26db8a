pub mod ffmpeg;
pub mod kinescope;
pub mod playlist;

use bytes::Bytes;
use reqwest::header::REFERER;
use tracing::{debug, warn};
use url::Url;

use crate::acquisition::AcquisitionError;

pub struct DownloadClient {
    client: reqwest::Client,
}

impl DownloadClient {
    pub fn new() -> Result<Self, AcquisitionError> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; rv:78.0) Gecko/20100101 Firefox/78.0")
            .build()?;

        Ok(Self { client })
    }

    /// GETs `url`, sending `referer` when the video is embedded in another site.
    pub async fn download(&self, url: &Url, referer: Option<&Url>) -> Result<Bytes, AcquisitionError> {
        let mut request = self.client.get(url.as_str());
        if let Some(referer) = referer {
            request = request.header(REFERER, referer.as_str());
        }

        debug!("GET {}", url);
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Error downloading {}: {}", url, err);
                return Err(err.into());
            }
        };

        if let Err(err) = response.error_for_status_ref() {
            warn!("Error downloading {}: {}", url, err);
            return Err(err.into());
        }

        match response.bytes().await {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                warn!("Error reading response: {}", err);
                Err(err.into())
            }
        }
    }
}
