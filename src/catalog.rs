use std::num::NonZeroUsize;

use tracing::debug;

use crate::acquisition::{Acquisition, AssetHandle, Rendition};
use crate::error::{Error, Result};

/// The renditions of one asset, never empty, in the order the pipeline gave them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    renditions: Vec<Rendition>,
}

impl Catalog {
    pub fn new(renditions: Vec<Rendition>) -> Result<Self> {
        if renditions.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        Ok(Self { renditions })
    }

    /// Looks up a rendition by its 1-based menu number.
    pub fn get(&self, index: NonZeroUsize) -> Result<&Rendition> {
        self.renditions
            .get(index.get() - 1)
            .ok_or(Error::RenditionNotFound {
                index: index.get(),
                available: self.renditions.len(),
            })
    }

    pub fn best(&self) -> &Rendition {
        // non-empty by construction
        &self.renditions[self.renditions.len() - 1]
    }

    /// `1) 360p   2) 480p   3) 720p`
    pub fn menu(&self) -> String {
        self.renditions
            .iter()
            .enumerate()
            .map(|(i, rendition)| format!("{}) {}p", i + 1, rendition.resolution))
            .collect::<Vec<_>>()
            .join("   ")
    }
}

/// Asks the pipeline for the asset's renditions. One call per run, no caching.
pub async fn fetch<A>(acquisition: &A, handle: &AssetHandle) -> Result<Catalog>
where
    A: Acquisition + ?Sized,
{
    let renditions = acquisition.list_renditions(handle).await?;
    debug!("Video {} has {} renditions", handle.id, renditions.len());

    Catalog::new(renditions)
}
