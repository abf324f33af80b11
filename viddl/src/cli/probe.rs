use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use crate::download::{DownloadConfig, DownloadService};

use super::options::YtDlpOptions;

#[derive(Parser, Debug)]
pub struct ProbeCommand {
    /// Video URL
    pub url: String,

    #[command(flatten)]
    pub ytdlp: YtDlpOptions,
}

impl ProbeCommand {
    pub async fn run(self) -> Result<()> {
        let service = DownloadService::new(Arc::new(self.ytdlp.build()), DownloadConfig::default());

        let info = service
            .probe(Some(self.url.as_str()))
            .await
            .with_context(|| format!("Failed to probe {}", self.url))?;

        println!("{}", serde_json::to_string_pretty(&info)?);
        Ok(())
    }
}
