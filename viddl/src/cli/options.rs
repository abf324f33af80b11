use std::path::PathBuf;
use std::time::Duration;

use crate::media::YtDlp;
use crate::media::ytdlp::DEFAULT_FORMAT;

/// How to invoke yt-dlp, shared by every command.
#[derive(clap::Args, Debug, Clone)]
pub struct YtDlpOptions {
    /// yt-dlp executable
    #[arg(long = "yt-dlp", env = "YTDLP_PATH", default_value = "yt-dlp")]
    pub yt_dlp: PathBuf,

    /// Timeout for each yt-dlp invocation, in seconds
    #[arg(long, env = "YTDLP_TIMEOUT_SECS", default_value = "600")]
    pub timeout: u64,

    /// yt-dlp format selector
    #[arg(long, env = "YTDLP_FORMAT", default_value = DEFAULT_FORMAT)]
    pub format: String,

    /// Extra arguments for every yt-dlp call, space separated
    #[arg(long, env = "YTDLP_EXTRA_ARGS", value_delimiter = ' ', allow_hyphen_values = true)]
    pub yt_dlp_args: Vec<String>,
}

impl YtDlpOptions {
    pub fn build(&self) -> YtDlp {
        YtDlp::new(&self.yt_dlp, Duration::from_secs(self.timeout))
            .with_format(&self.format)
            .with_extra_args(self.yt_dlp_args.iter().filter(|a| !a.is_empty()))
    }
}
