use std::path::PathBuf;

use thiserror::Error;

use crate::media::MediaError;

use super::limit::DurationLimit;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("No URL provided")]
    MissingUrl,

    /// Rejected before anything was downloaded
    #[error("Video exceeds maximum duration ({limit})")]
    TooLong { duration: u64, limit: DurationLimit },

    #[error("Failed to create download directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Server is shutting down")]
    ShuttingDown,

    #[error(transparent)]
    Media(#[from] MediaError),
}

impl DownloadError {
    /// Whether the caller sent a request that can never succeed as-is.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingUrl | Self::TooLong { .. })
    }
}
