use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Parser;
use tokio::{signal, sync::watch};
use tracing::info;

use crate::download::{DownloadConfig, DownloadService, DurationLimit};
use crate::server::AppState;

use super::options::YtDlpOptions;

#[derive(Parser, Debug)]
pub struct ServeCommand {
    /// Address to bind
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// HTTP server port
    #[arg(short, long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Directory downloaded videos are written to
    #[arg(long, env = "RAILWAY_VOLUME_MOUNT_PATH", default_value = "/data")]
    pub download_dir: PathBuf,

    /// Longest video accepted, in seconds
    #[arg(long, env = "MAX_DURATION_SECS", default_value = "3600")]
    pub max_duration: u64,

    /// Downloads allowed to run at once
    #[arg(long, env = "MAX_CONCURRENT_DOWNLOADS", default_value = "2")]
    pub max_concurrent: usize,

    #[command(flatten)]
    pub ytdlp: YtDlpOptions,
}

impl ServeCommand {
    /// Defaults, overridden by whatever is set in the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::try_parse_from(["serve"])?)
    }

    pub async fn run(self) -> Result<()> {
        // Shutdown signal
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let config = DownloadConfig {
            download_dir: self.download_dir,
            max_duration: DurationLimit(self.max_duration),
            max_concurrent: self.max_concurrent,
        };
        info!(
            download_dir = %config.download_dir.display(),
            max_duration = %config.max_duration,
            max_concurrent = config.max_concurrent,
            yt_dlp = %self.ytdlp.yt_dlp.display(),
            "Starting download service"
        );

        let fetcher = Arc::new(self.ytdlp.build());
        let service = Arc::new(DownloadService::new(fetcher, config));

        let addr = SocketAddr::new(self.host, self.port);
        let mut server_handle = {
            let state = AppState {
                service: Arc::clone(&service),
            };
            tokio::spawn(crate::server::run_server(addr, state, shutdown_rx))
        };

        tokio::select! {
            result = &mut server_handle => {
                // Server stopped without being asked to, e.g. the port was taken
                return match result {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(anyhow!("Server error: {}", e)),
                    Err(e) => Err(anyhow!("Server task failed: {}", e)),
                };
            }
            signal = shutdown_signal() => signal?,
        }

        info!("Shutting down...");
        service.close();
        let _ = shutdown_tx.send(true);

        match server_handle.await {
            Ok(Err(e)) => tracing::error!("Server error during shutdown: {}", e),
            Err(e) => tracing::error!("Server task failed: {}", e),
            Ok(Ok(())) => {}
        }

        info!("Done.");
        Ok(())
    }
}

/// Wait for Ctrl+C, or SIGTERM from a container runtime.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await?;

    Ok(())
}
