use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::media::{MediaFetcher, VideoInfo};

use super::error::DownloadError;
use super::limit::DurationLimit;

pub const STATUS_DOWNLOADED: &str = "Downloaded successfully";

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub download_dir: PathBuf,
    pub max_duration: DurationLimit,
    /// Downloads allowed to run at the same time, extra requests queue
    pub max_concurrent: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("/data"),
            max_duration: DurationLimit::default(),
            max_concurrent: 2,
        }
    }
}

/// Result of a completed download, as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub title: String,
    pub filename: String,
    pub duration: u64,
    pub status: String,
}

/**
    Probes a video, enforces the duration limit, then downloads it into
    the configured directory.
*/
pub struct DownloadService {
    fetcher: Arc<dyn MediaFetcher>,
    config: DownloadConfig,
    permits: Semaphore,
}

impl DownloadService {
    pub fn new(fetcher: Arc<dyn MediaFetcher>, config: DownloadConfig) -> Self {
        let permits = Semaphore::new(config.max_concurrent.max(1));
        Self {
            fetcher,
            config,
            permits,
        }
    }

    /// Stop accepting downloads; queued and future requests fail immediately.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Fetch metadata only.
    pub async fn probe(&self, url: Option<&str>) -> Result<VideoInfo, DownloadError> {
        let url = validate_url(url)?;
        Ok(self.fetcher.probe(url).await?)
    }

    pub async fn download(&self, url: Option<&str>) -> Result<DownloadOutcome, DownloadError> {
        let url = match validate_url(url) {
            Ok(url) => url,
            Err(e) => {
                error!("No URL provided");
                return Err(e);
            }
        };

        let result = self.run_download(url).await;
        if let Err(e) = &result
            && !e.is_client_error()
        {
            error!(url, "Download failed: {}", e);
        }
        result
    }

    async fn run_download(&self, url: &str) -> Result<DownloadOutcome, DownloadError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| DownloadError::ShuttingDown)?;

        let dir = &self.config.download_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| DownloadError::Io {
                path: dir.clone(),
                source,
            })?;
        info!("Download directory: {}", dir.display());

        // Check the duration before committing to a download
        let video = self.fetcher.probe(url).await?;
        let duration = video.whole_seconds();
        info!("Video found: {}, Duration: {}s", video.title, duration);

        let limit = self.config.max_duration;
        if limit.is_exceeded_by(video.duration_secs()) {
            warn!("Video too long: {}s", duration);
            return Err(DownloadError::TooLong { duration, limit });
        }

        let file = self.fetcher.download(url, dir).await?;
        info!("Download complete: {}", file.path().display());

        Ok(DownloadOutcome {
            title: video.title,
            filename: file.file_name(),
            duration,
            status: STATUS_DOWNLOADED.to_string(),
        })
    }
}

fn validate_url(url: Option<&str>) -> Result<&str, DownloadError> {
    match url.map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(DownloadError::MissingUrl),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::media::fake::FakeFetcher;

    fn service(fetcher: Arc<FakeFetcher>, dir: &Path) -> DownloadService {
        DownloadService::new(
            fetcher,
            DownloadConfig {
                download_dir: dir.to_path_buf(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(validate_url(Some(" https://x ")).unwrap(), "https://x");
        assert!(matches!(validate_url(None), Err(DownloadError::MissingUrl)));
        assert!(matches!(
            validate_url(Some("   ")),
            Err(DownloadError::MissingUrl)
        ));
    }

    #[tokio::test]
    async fn test_download_success() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested/data");
        let fetcher = Arc::new(FakeFetcher::with_video("My Video", Some(212.0)));
        let svc = service(Arc::clone(&fetcher), &dir);

        let outcome = svc.download(Some("https://youtu.be/x")).await.unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome {
                title: "My Video".to_string(),
                filename: "My Video.mp4".to_string(),
                duration: 212,
                status: STATUS_DOWNLOADED.to_string(),
            }
        );
        assert!(dir.is_dir());
        assert_eq!(fetcher.downloads.load(Ordering::SeqCst), 1);
        assert_eq!(
            fetcher.urls.lock().unwrap().as_slice(),
            ["https://youtu.be/x"]
        );
    }

    #[tokio::test]
    async fn test_missing_url_never_reaches_fetcher() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::with_video("v", Some(1.0)));
        let svc = service(Arc::clone(&fetcher), tmp.path());

        let err = svc.download(Some("")).await.unwrap_err();
        assert!(matches!(err, DownloadError::MissingUrl));
        assert_eq!(fetcher.probes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_too_long_is_rejected_before_download() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::with_video("Long", Some(3601.0)));
        let svc = service(Arc::clone(&fetcher), tmp.path());

        let err = svc.download(Some("https://youtu.be/x")).await.unwrap_err();
        assert!(matches!(
            err,
            DownloadError::TooLong {
                duration: 3601,
                limit: DurationLimit(3600)
            }
        ));
        assert_eq!(err.to_string(), "Video exceeds maximum duration (1 hour)");
        assert_eq!(fetcher.downloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exact_limit_is_allowed() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::with_video("Exact", Some(3600.0)));
        let svc = service(fetcher, tmp.path());

        let outcome = svc.download(Some("https://youtu.be/x")).await.unwrap();
        assert_eq!(outcome.duration, 3600);
    }

    #[tokio::test]
    async fn test_unknown_duration_counts_as_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::with_video("Live", None));
        let svc = service(fetcher, tmp.path());

        let outcome = svc.download(Some("https://youtu.be/x")).await.unwrap();
        assert_eq!(outcome.duration, 0);
    }

    #[tokio::test]
    async fn test_probe_returns_metadata_without_downloading() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("untouched");
        let fetcher = Arc::new(FakeFetcher::with_video("Meta", Some(7200.0)));
        let svc = service(Arc::clone(&fetcher), &dir);

        let info = svc.probe(Some(" https://youtu.be/x ")).await.unwrap();
        assert_eq!(info.title, "Meta");
        assert_eq!(info.whole_seconds(), 7200);
        assert_eq!(
            fetcher.urls.lock().unwrap().as_slice(),
            ["https://youtu.be/x"]
        );
        assert_eq!(fetcher.downloads.load(Ordering::SeqCst), 0);
        assert!(!dir.exists());

        let err = svc.probe(None).await.unwrap_err();
        assert!(matches!(err, DownloadError::MissingUrl));
        assert_eq!(fetcher.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_probe_failure_propagates() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fetcher = FakeFetcher::with_video("v", Some(1.0));
        fetcher.probe_error = Some("ERROR: Video unavailable".to_string());
        let svc = service(Arc::new(fetcher), tmp.path());

        let err = svc.download(Some("https://youtu.be/x")).await.unwrap_err();
        assert!(matches!(err, DownloadError::Media(_)));
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "ERROR: Video unavailable");
    }

    #[tokio::test]
    async fn test_concurrency_is_capped() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fetcher = FakeFetcher::with_video("v", Some(1.0));
        fetcher.delay = Duration::from_millis(50);
        let fetcher = Arc::new(fetcher);
        let svc = Arc::new(DownloadService::new(
            Arc::clone(&fetcher) as Arc<dyn MediaFetcher>,
            DownloadConfig {
                download_dir: tmp.path().to_path_buf(),
                max_concurrent: 2,
                ..Default::default()
            },
        ));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.download(Some("https://youtu.be/x")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(fetcher.downloads.load(Ordering::SeqCst), 6);
        assert!(fetcher.peak_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_closed_service_rejects() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::with_video("v", Some(1.0)));
        let svc = service(Arc::clone(&fetcher), tmp.path());
        svc.close();

        let err = svc.download(Some("https://youtu.be/x")).await.unwrap_err();
        assert!(matches!(err, DownloadError::ShuttingDown));
        assert_eq!(fetcher.probes.load(Ordering::SeqCst), 0);
    }
}
