pub mod info;
pub mod ytdlp;

#[cfg(test)]
pub mod fake;

pub use info::VideoInfo;
pub use ytdlp::{MediaError, MediaFetcher, YtDlp};
