pub mod error;
pub mod limit;
pub mod service;

pub use error::DownloadError;
pub use limit::DurationLimit;
pub use service::{DownloadConfig, DownloadOutcome, DownloadService};
