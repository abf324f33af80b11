use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::logging::{self, LogFormat};

mod download;
mod options;
mod probe;
mod serve;

pub use download::DownloadCommand;
pub use probe::ProbeCommand;
pub use serve::ServeCommand;

#[derive(Parser, Debug)]
#[command(name = "viddl")]
#[command(about = "HTTP service that downloads videos with yt-dlp")]
pub struct Args {
    /// Log output format
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default)
    Serve(ServeCommand),
    /// Print metadata for a video without downloading it
    Probe(ProbeCommand),
    /// Download a single video and exit
    Download(DownloadCommand),
}

impl Args {
    pub async fn run(self) -> Result<()> {
        logging::init(self.log_format)?;

        let command = match self.command {
            Some(command) => command,
            None => Command::Serve(ServeCommand::from_env()?),
        };

        match command {
            Command::Serve(cmd) => cmd.run().await,
            Command::Probe(cmd) => cmd.run().await,
            Command::Download(cmd) => cmd.run().await,
        }
    }
}
