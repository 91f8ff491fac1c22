//! Video preparation – runs `ffmpeg` to fit uploads into the platform
//! limits (8 s, 720×720 letterboxed, ~900 kbit/s, no audio, fast-start).
//!
//! A missing `ffmpeg` is not an error: the original file is uploaded
//! unprocessed and the platform may reject it.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use bottube_common::protocol::truncate_chars;

/// Upper bound on a single transcode.
pub const TRANSCODE_TIMEOUT: Duration = Duration::from_secs(120);

/// How much of ffmpeg's stderr ends up in the log.
const STDERR_LOG_CHARS: usize = 200;

const POLL_STEP: Duration = Duration::from_millis(100);

const VIDEO_FILTER: &str = "scale='min(720,iw)':'min(720,ih)':force_original_aspect_ratio=decrease,\
                            pad=720:720:(ow-iw)/2:(oh-ih)/2:color=black";

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("transcoder exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("transcoder did not finish within {0:?}")]
    Timeout(Duration),
    #[error("cannot run transcoder: {0}")]
    Io(#[from] io::Error),
}

/// Result of a successful preparation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prepared {
    /// Transcoded copy written to the video directory.
    Transcoded(PathBuf),
    /// Transcoder not installed – the input is used as-is.
    Original(PathBuf),
}

impl Prepared {
    pub fn path(&self) -> &Path {
        match self {
            Prepared::Transcoded(p) | Prepared::Original(p) => p,
        }
    }
}

/// Wrapper around the external transcoder.
#[derive(Debug, Clone)]
pub struct Transcoder {
    program: PathBuf,
    output_dir: PathBuf,
    timeout: Duration,
}

impl Transcoder {
    pub fn new(program: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            output_dir: output_dir.into(),
            timeout: TRANSCODE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `<output_dir>/prepared_<stem>.mp4`
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".into());
        self.output_dir.join(format!("prepared_{stem}.mp4"))
    }

    /// Transcode `input` into the video directory.
    pub fn prepare(&self, input: &Path) -> Result<Prepared, PrepareError> {
        let output = self.output_path(input);

        let mut cmd = Command::new(&self.program);
        cmd.args(transcode_args(input, &output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "{} not installed, uploading {} without preparation",
                    self.program.display(),
                    input.display()
                );
                return Ok(Prepared::Original(input.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        debug!("Transcoding {} → {}", input.display(), output.display());

        // Drain stderr in a background thread so a chatty ffmpeg cannot
        // block on a full pipe.
        let stderr_reader = child.stderr.take().and_then(|mut stderr| {
            std::thread::Builder::new()
                .name("ffmpeg-stderr".into())
                .spawn(move || {
                    let mut buf = Vec::new();
                    stderr.read_to_end(&mut buf).ok();
                    buf
                })
                .ok()
        });

        let status = match wait_with_timeout(&mut child, self.timeout) {
            Ok(s) => s,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        };

        let Some(status) = status else {
            let _ = child.kill();
            let _ = child.wait();
            error!(
                "Transcoding {} timed out after {:?}",
                input.display(),
                self.timeout
            );
            return Err(PrepareError::Timeout(self.timeout));
        };

        let stderr = stderr_reader
            .and_then(|h| h.join().ok())
            .map(|b| String::from_utf8_lossy(&b).into_owned())
            .unwrap_or_default();

        if status.success() {
            info!("Video prepared: {}", output.display());
            Ok(Prepared::Transcoded(output))
        } else {
            let head = truncate_chars(&stderr, STDERR_LOG_CHARS).to_string();
            error!("Transcoder failed ({status}): {head}");
            Err(PrepareError::Failed {
                status,
                stderr: head,
            })
        }
    }
}

/// Fixed ffmpeg argument list.
fn transcode_args(input: &Path, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into(), "-i".into()];
    args.push(input.to_string_lossy().into_owned());
    args.extend(
        [
            "-t", "8",
            "-vf", VIDEO_FILTER,
            "-c:v", "libx264", "-crf", "28", "-preset", "medium",
            "-maxrate", "900k", "-bufsize", "1800k",
            "-pix_fmt", "yuv420p", "-an",
            "-movflags", "+faststart",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Poll `child` until it exits or `timeout` elapses.  `Ok(None)` means the
/// deadline passed and the child is still running.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        std::thread::sleep(POLL_STEP.min(deadline - now));
    }
}
