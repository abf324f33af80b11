use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use crate::download::{DownloadConfig, DownloadService, DurationLimit};

use super::options::YtDlpOptions;

#[derive(Parser, Debug)]
pub struct DownloadCommand {
    /// Video URL
    pub url: String,

    /// Directory to write the video to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Longest video accepted, in seconds
    #[arg(long, env = "MAX_DURATION_SECS", default_value = "3600")]
    pub max_duration: u64,

    #[command(flatten)]
    pub ytdlp: YtDlpOptions,
}

impl DownloadCommand {
    pub async fn run(self) -> Result<()> {
        let config = DownloadConfig {
            download_dir: self.output_dir,
            max_duration: DurationLimit(self.max_duration),
            max_concurrent: 1,
        };
        let service = DownloadService::new(Arc::new(self.ytdlp.build()), config);

        let outcome = service
            .download(Some(self.url.as_str()))
            .await
            .with_context(|| format!("Failed to download {}", self.url))?;

        println!("{}", serde_json::to_string_pretty(&outcome)?);
        Ok(())
    }
}
