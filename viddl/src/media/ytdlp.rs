use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use super::info::{DownloadedFile, VideoInfo};

/// Prefer mp4 video + m4a audio (merged by FFmpeg), fall back to any single mp4, then anything.
pub const DEFAULT_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// File name template, relative to the download directory.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/**
    Error type for yt-dlp invocations.
*/
#[derive(Debug, Error)]
pub enum MediaError {
    /// yt-dlp could not be started at all
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// yt-dlp ran but reported a failure
    #[error("{}", summarize_failure(.code, .stderr))]
    NonZeroExit { code: i32, stderr: String },
    /// yt-dlp printed something that is not an info dict
    #[error("Failed to parse yt-dlp output: {0}")]
    Parse(#[from] serde_json::Error),
    /// The download finished without printing the final file path
    #[error("yt-dlp did not report a downloaded file")]
    NoOutput,
    /// yt-dlp started but its output could not be collected
    #[error("Failed to read yt-dlp output: {0}")]
    Wait(#[source] std::io::Error),
    #[error("yt-dlp timed out after {:?}", .0)]
    Timeout(Duration),
}

/**
    Reduce yt-dlp's stderr to the message a caller wants to see.

    yt-dlp prefixes fatal errors with `ERROR:`, and may print warnings
    before them, so the last such line wins.
*/
fn summarize_failure(code: &i32, stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if let Some(line) = lines.iter().rev().find(|l| l.starts_with("ERROR:")) {
        return line.to_string();
    }
    match lines.last() {
        Some(line) => line.to_string(),
        None => format!("yt-dlp exited with code {}", code),
    }
}

/**
    Source of video metadata and downloads.

    The service only ever talks to this trait, so handlers can be
    exercised without a real yt-dlp on the machine.
*/
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch metadata for a single video without downloading it.
    async fn probe(&self, url: &str) -> Result<VideoInfo, MediaError>;

    /// Download a single video into `output_dir`, returning the file written.
    async fn download(&self, url: &str, output_dir: &Path) -> Result<DownloadedFile, MediaError>;
}

/**
    [`MediaFetcher`] backed by the `yt-dlp` executable.
*/
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    extra_args: Vec<OsString>,
    format: String,
    timeout: Duration,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            format: DEFAULT_FORMAT.to_string(),
            timeout,
        }
    }

    /// Arguments placed before each invocation's own, e.g. `--cookies <file>`,
    /// or `-m yt_dlp` when the program is `python3`.
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.extra_args = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    fn probe_args(url: &str) -> Vec<OsString> {
        [
            "--dump-single-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            "--",
            url,
        ]
        .into_iter()
        .map(OsString::from)
        .collect()
    }

    fn download_args(&self, url: &str, output_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        args.push("--format".into());
        args.push(self.format.clone().into());
        args.push("--output".into());
        args.push(output_dir.join(OUTPUT_TEMPLATE).into_os_string());
        for flag in [
            "--no-playlist",
            "--no-progress",
            "--no-warnings",
            "--quiet",
            "--no-simulate",
            "--print",
            "after_move:filepath",
            "--",
        ] {
            args.push(flag.into());
        }
        args.push(url.into());
        args
    }

    async fn run(&self, args: Vec<OsString>) -> Result<Vec<u8>, MediaError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.extra_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so FFmpeg and other helpers yt-dlp spawns can be killed with it
        #[cfg(unix)]
        command.process_group(0);

        tracing::debug!(program = %self.program.display(), "Running yt-dlp");

        let child = command.spawn().map_err(|source| MediaError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;
        let pid = child.id();

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(MediaError::Wait)?,
            Err(_) => {
                // Takes out yt-dlp and its helpers; kill_on_drop covers non-unix
                kill_process_group(pid);
                return Err(MediaError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            return Err(MediaError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(output.stdout)
    }
}

/**
    SIGKILL every process in the group led by `pid`.
*/
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = pid else {
        return;
    };

    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => tracing::warn!(pid, "Failed to kill yt-dlp process group: {}", e),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

#[async_trait]
impl MediaFetcher for YtDlp {
    async fn probe(&self, url: &str) -> Result<VideoInfo, MediaError> {
        let stdout = self.run(Self::probe_args(url)).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    async fn download(&self, url: &str, output_dir: &Path) -> Result<DownloadedFile, MediaError> {
        let stdout = self.run(self.download_args(url, output_dir)).await?;
        let stdout = String::from_utf8_lossy(&stdout);

        // Only the final path is printed, but tolerate stray lines before it
        let path = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .ok_or(MediaError::NoOutput)?;

        Ok(DownloadedFile::new(path))
    }
}
