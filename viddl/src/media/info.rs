use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/**
    Metadata reported by `yt-dlp --dump-single-json`.

    Only the fields the service cares about are kept, everything else
    in yt-dlp's (very large) info dict is ignored.
*/
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Length in seconds, may be fractional or missing (live streams)
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
}

impl VideoInfo {
    /// Duration in seconds, treating an unknown duration as zero.
    pub fn duration_secs(&self) -> f64 {
        self.duration.filter(|d| d.is_finite() && *d > 0.0).unwrap_or(0.0)
    }

    /// Duration rounded to whole seconds.
    pub fn whole_seconds(&self) -> u64 {
        self.duration_secs().round() as u64
    }
}

/// A file written by a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    path: PathBuf,
}

impl DownloadedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the file, without its directory.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}
