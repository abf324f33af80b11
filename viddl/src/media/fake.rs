use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::info::DownloadedFile;
use super::{MediaError, MediaFetcher, VideoInfo};

/// Scripted [`MediaFetcher`] for tests.
#[derive(Default)]
pub struct FakeFetcher {
    pub info: VideoInfo,
    pub probe_error: Option<String>,
    pub download_error: Option<String>,
    pub delay: Duration,
    pub probes: AtomicUsize,
    pub downloads: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with_video(title: &str, duration: Option<f64>) -> Self {
        Self {
            info: VideoInfo {
                id: "fake".to_string(),
                title: title.to_string(),
                duration,
                ext: Some("mp4".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn failure(message: &str) -> MediaError {
        MediaError::NonZeroExit {
            code: 1,
            stderr: message.to_string(),
        }
    }
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn probe(&self, url: &str) -> Result<VideoInfo, MediaError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        match &self.probe_error {
            Some(msg) => Err(Self::failure(msg)),
            None => Ok(self.info.clone()),
        }
    }

    async fn download(&self, _url: &str, output_dir: &Path) -> Result<DownloadedFile, MediaError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.download_error {
            Some(msg) => Err(Self::failure(msg)),
            None => Ok(DownloadedFile::new(
                output_dir.join(format!("{}.mp4", self.info.title)),
            )),
        }
    }
}
