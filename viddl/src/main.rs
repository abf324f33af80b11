use anyhow::Result;
use clap::Parser;

mod cli;
mod download;
mod logging;
mod media;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    cli::Args::parse().run().await
}
