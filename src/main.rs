mod acquisition;
mod catalog;
mod download;
mod error;
mod interrupt;
mod options;
mod orchestrator;
mod select;
mod validate;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::acquisition::AssetReference;
use crate::download::kinescope::{self, KinescopeClient};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::orchestrator::{Orchestrator, RunRequest};
use crate::select::SelectionRequest;

/// Kinescope-dl: Video downloader for Kinescope
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[clap(value_parser = validate::url_parser)]
    /// url of the Kinescope video
    input_url: Url,

    #[clap(value_parser = validate::path_parser)]
    /// path to the output mp4 file, pass "" to name it after the video id
    output_file: PathBuf,

    #[clap(short, long, value_parser = validate::url_parser)]
    /// referer url of the site where the video is embedded
    referer: Option<Url>,

    #[clap(long)]
    /// automatically select the best possible quality
    best_quality: bool,

    #[clap(long, default_value = options::DEFAULT_TEMP_DIR, value_parser = validate::path_parser)]
    /// path to directory for temporary files
    temp: PathBuf,

    #[clap(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    /// manually select the quality by its number, e.g. 1) 360p   2) 480p   3) 720p   4) 1080p
    quality: Option<u32>,

    #[clap(long, default_value = options::DEFAULT_FFMPEG_PATH, value_parser = validate::path_parser)]
    /// path to ffmpeg executable
    ffmpeg_path: PathBuf,

    #[clap(long, default_value = options::DEFAULT_MP4DECRYPT_PATH, value_parser = validate::path_parser)]
    /// path to mp4decrypt executable
    mp4decrypt_path: PathBuf,

    #[clap(short, long)]
    /// log what is happening to stderr, RUST_LOG overrides this
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let cancel = CancellationToken::new();
    interrupt::watch(cancel.clone());

    let options = Options {
        temp_dir: args.temp,
        ffmpeg_path: args.ffmpeg_path,
        mp4decrypt_path: args.mp4decrypt_path,
    };
    debug!("Options: {:?}", options);

    let client = KinescopeClient::new(validate::url(kinescope::BASE_URL)?)?;
    let request = RunRequest {
        asset: AssetReference::new(args.input_url, args.referer),
        output: args.output_file,
        selection: SelectionRequest::from_args(args.quality.map(|q| q as usize), args.best_quality),
    };

    let mut orchestrator = Orchestrator::new(&client, options, cancel.clone());
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = io::stdout();
    let result = orchestrator.run(request, &mut stdin, &mut stdout).await;
    debug!("Run ended in {:?}", orchestrator.state());

    cancel.cancel();
    let job = result?;
    info!("Finished downloading {} to {}", job.asset.url(), job.output.display());

    Ok(())
}

/// Prints the outcome of a run and returns the process exit code.
fn report(result: Result<()>, out: &mut impl Write, err: &mut impl Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(Error::Interrupted) => {
            let _ = writeln!(out, "{}", interrupt::NOTICE);
            0
        }
        Err(error) => {
            debug!("{:?}", error);
            let _ = writeln!(err, "Error: {}", error);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = run(args).await;
    let code = report(result, &mut io::stdout(), &mut io::stderr());

    let _ = io::stdout().flush();
    // a pending stdin read would otherwise keep the runtime from shutting down
    process::exit(code);
}
