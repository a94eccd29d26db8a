use std::future::Future;
use std::io::Write;
use std::path::PathBuf;

use tokio::io::AsyncBufRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::acquisition::{Acquisition, AssetReference, DownloadJob};
use crate::catalog;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::select::{self, SelectionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validating,
    CatalogFetching,
    Selecting,
    Downloading,
    Done,
    Interrupted,
    Failed,
}

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub asset: AssetReference,
    /// Empty means `{video id}.mp4`.
    pub output: PathBuf,
    pub selection: SelectionRequest,
}

pub struct Orchestrator<'a, A: ?Sized> {
    acquisition: &'a A,
    options: Options,
    cancel: CancellationToken,
    state: RunState,
}

impl<'a, A> Orchestrator<'a, A>
where
    A: Acquisition + ?Sized,
{
    pub fn new(acquisition: &'a A, options: Options, cancel: CancellationToken) -> Self {
        Self {
            acquisition,
            options,
            cancel,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Resolves the asset, picks a rendition and hands the download to the
    /// pipeline. Returns the job that was downloaded.
    pub async fn run<R, W>(&mut self, request: RunRequest, input: &mut R, out: &mut W) -> Result<DownloadJob>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let result = self.execute(request, input, out).await;

        let last = self.state;
        self.state = match &result {
            Ok(_) => RunState::Done,
            Err(Error::Interrupted) => RunState::Interrupted,
            Err(err) => {
                warn!("Run failed while {:?}: {}", last, err);
                RunState::Failed
            }
        };
        debug!("{:?} -> {:?}", last, self.state);

        result
    }

    async fn execute<R, W>(&mut self, request: RunRequest, input: &mut R, out: &mut W) -> Result<DownloadJob>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.enter(RunState::Validating)?;
        info!("Resolving {}", request.asset.url());
        let handle = guarded(&self.cancel, self.acquisition.resolve(&request.asset)).await?;

        self.enter(RunState::CatalogFetching)?;
        let catalog = guarded(&self.cancel, catalog::fetch(self.acquisition, &handle)).await?;

        self.enter(RunState::Selecting)?;
        if !matches!(request.selection, SelectionRequest::Index(_)) {
            writeln!(out, "= OPTIONS ============================")?;
        }
        let rendition = select::select(&catalog, request.selection, input, out, &self.cancel)
            .await?
            .clone();
        writeln!(out, "[*] {}p is selected", rendition.resolution)?;
        writeln!(out, "======================================")?;

        self.enter(RunState::Downloading)?;
        let output = if request.output.as_os_str().is_empty() {
            PathBuf::from(format!("{}.mp4", handle.id))
        } else {
            request.output
        };

        let job = DownloadJob {
            asset: request.asset,
            rendition,
            output,
            temp_dir: self.options.temp_dir.clone(),
            ffmpeg_path: self.options.ffmpeg_path.clone(),
            mp4decrypt_path: self.options.mp4decrypt_path.clone(),
        };

        writeln!(out, "\n= DOWNLOADING =================")?;
        out.flush()?;
        info!("Downloading {}p to {}", job.rendition.resolution, job.output.display());
        guarded(&self.cancel, self.acquisition.download(&handle, &job)).await?;
        writeln!(out, "===============================")?;

        Ok(job)
    }

    fn enter(&mut self, next: RunState) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Interrupted);
        }

        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }
}

/// Races `fut` against cancellation.
async fn guarded<T, E, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<Error>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Interrupted),
        result = fut => result.map_err(Into::into),
    }
}
