use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;
use url::Url;

use crate::acquisition::AcquisitionError;

pub fn ensure_tool(tool: &'static str, path: &Path) -> Result<(), AcquisitionError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AcquisitionError::MissingTool {
            tool,
            path: path.to_path_buf(),
        })
    }
}

fn command(ffmpeg: &Path, input: &str, referer: Option<&Url>, output: &Path) -> Command {
    let mut command = Command::new(ffmpeg);
    command.args(["-loglevel", "error", "-y"]);
    if let Some(referer) = referer {
        command.arg("-referer").arg(referer.as_str());
    }
    command
        .arg("-i")
        .arg(input)
        .args(["-c", "copy"])
        .arg(output)
        .stdin(Stdio::null())
        .kill_on_drop(true);
    detach(&mut command);

    command
}

/// Keeps terminal Ctrl-C away from the child; it is stopped through the
/// cancellation token dropping its future instead.
fn detach(command: &mut Command) {
    #[cfg(unix)]
    command.process_group(0);
    #[cfg(not(unix))]
    let _ = command;
}

/// Copies the streams of `input` into an mp4 at `output` without re-encoding.
/// ffmpeg is killed if the returned future is dropped.
pub async fn remux(ffmpeg: &Path, input: &str, referer: Option<&Url>, output: &Path) -> Result<(), AcquisitionError> {
    debug!("Running {} on {}", ffmpeg.display(), input);
    let result = command(ffmpeg, input, referer, output).output().await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(AcquisitionError::Download(format!(
            "ffmpeg exited with {}: {}",
            result.status,
            stderr.trim()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_tool_names_the_tool_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mp4decrypt");

        match ensure_tool("mp4decrypt", &path) {
            Err(AcquisitionError::MissingTool { tool, path: reported }) => {
                assert_eq!(tool, "mp4decrypt");
                assert_eq!(reported, path);
            }
            other => panic!("expected MissingTool, got {:?}", other),
        }

        std::fs::write(&path, b"").unwrap();
        assert!(ensure_tool("mp4decrypt", &path).is_ok());
    }

    #[test]
    fn directories_are_not_tools() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_tool("ffmpeg", dir.path()).is_err());
    }

    #[test]
    fn command_copies_streams_with_referer() {
        let referer = Url::parse("https://school.example.com/lesson/1").unwrap();
        let command = command(
            Path::new("./ffmpeg"),
            "https://kinescope.io/abc123/720p/index.m3u8",
            Some(&referer),
            &PathBuf::from("temp/abc123_720p.mp4"),
        );

        let inner = command.as_std();
        assert_eq!(inner.get_program(), OsStr::new("./ffmpeg"));
        let args = inner.get_args().collect::<Vec<_>>();
        assert_eq!(
            args,
            [
                "-loglevel",
                "error",
                "-y",
                "-referer",
                "https://school.example.com/lesson/1",
                "-i",
                "https://kinescope.io/abc123/720p/index.m3u8",
                "-c",
                "copy",
                "temp/abc123_720p.mp4",
            ]
            .map(|arg| OsStr::new(arg))
        );
    }

    #[test]
    fn command_without_referer() {
        let command = command(Path::new("ffmpeg"), "in.m3u8", None, Path::new("out.mp4"));
        let args = command.as_std().get_args().collect::<Vec<_>>();
        assert!(!args.contains(&OsStr::new("-referer")));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn child_runs_in_its_own_process_group() {
        let mut command = Command::new("sleep");
        command.arg("5").kill_on_drop(true);
        detach(&mut command);

        let child = command.spawn().unwrap();
        let pid = child.id().unwrap();
        let stat = std::fs::read_to_string(format!("/proc/{}/stat", pid)).unwrap();
        // pid (comm) state ppid pgrp ...
        let fields = stat.rsplit_once(')').unwrap().1.split_whitespace().collect::<Vec<_>>();
        assert_eq!(fields[2], pid.to_string());

        drop(child);
    }
}
