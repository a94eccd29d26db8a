use m3u8_rs::{MasterPlaylist, Playlist};
use tracing::debug;
use url::Url;

use crate::acquisition::{AcquisitionError, Rendition};

struct Stream {
    playlist_url: Url,
    bandwidth: u64,
    height: u32,
}

/// Lists the variants of an HLS master playlist, one per height, lowest first.
/// When a height is offered more than once the highest bandwidth wins. A media
/// playlist has no variants to choose from.
pub fn parse_master(playlist: &[u8], base: &Url) -> Result<Vec<Rendition>, AcquisitionError> {
    let playlist = m3u8_rs::parse_playlist_res(playlist)
        .map_err(|err| AcquisitionError::Catalog(format!("bad playlist {}: {}", base, err)))?;

    match playlist {
        Playlist::MasterPlaylist(master) => Ok(renditions(master, base)),
        Playlist::MediaPlaylist(_) => {
            debug!("{} is a media playlist", base);
            Ok(Vec::new())
        }
    }
}

fn renditions(master: MasterPlaylist, base: &Url) -> Vec<Rendition> {
    let mut streams: Vec<Stream> = Vec::new();

    for variant in master.variants {
        if variant.is_i_frame {
            continue;
        }

        let Some(height) = variant.resolution.and_then(|r| u32::try_from(r.height).ok()) else {
            debug!("Skipping variant without resolution: {}", variant.uri);
            continue;
        };

        // a variant tag without its own uri line swallows the next tag
        let uri = variant.uri.trim();
        if uri.is_empty() || uri.starts_with('#') {
            debug!("Skipping {}p variant without playlist uri", height);
            continue;
        }

        let playlist_url = match base.join(uri) {
            Ok(url) => url,
            Err(err) => {
                debug!("Skipping variant with bad uri {}: {}", uri, err);
                continue;
            }
        };

        let bandwidth = variant.bandwidth;
        match streams.iter_mut().find(|stream| stream.height == height) {
            Some(existing) if existing.bandwidth >= bandwidth => {}
            Some(existing) => {
                existing.playlist_url = playlist_url;
                existing.bandwidth = bandwidth;
            }
            None => streams.push(Stream {
                playlist_url,
                bandwidth,
                height,
            }),
        }
    }

    streams.sort_by_key(|stream| stream.height);
    streams
        .into_iter()
        .map(|stream| Rendition::new(stream.playlist_url.to_string(), stream.height))
        .collect()
}
