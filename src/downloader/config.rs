//! Configuration structures and defaults for the downloader.
//!
//! A [`DownloaderConfig`] is fixed when the [`Downloader`](super::Downloader)
//! is built and never changes afterwards.
//!
//! # Examples
//!
//! ## Using a Progress Callback
//!
//! ```rust
//! use steadyfetch::downloader::ProgressCallback;
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|downloaded, total| {
//!     println!("{}/{} bytes", downloaded, total);
//! });
//! ```

use crate::download::ChecksumPolicy;
use crate::http::DEFAULT_USER_AGENT;

use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked with `(downloaded_so_far, total_expected)` after every
/// chunk written, when the total size is known.
///
/// It runs inline with the transfer, so it should return quickly.
///
/// `downloaded` only grows while the file is being extended. When a call has
/// to rewrite the file from the start (the server ignored a range request, or
/// a partial file was discarded after a bad `Content-Range`), reports start
/// again from zero, so a later value may be lower than an earlier one.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Default timeout applied to each network wait.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);
/// Default size of one write/progress step.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Configuration structure for the downloader
#[derive(Clone)]
pub struct DownloaderConfig {
    /// Upper bound on each wait for the network: a `HEAD` answer, the
    /// headers of a `GET`, or the next chunk of a body.
    pub timeout: Duration,
    /// Number of retries per call; a call makes at most `max_retries + 1` attempts.
    pub max_retries: u32,
    /// Fixed delay slept before every retry.
    pub retry_delay: Duration,
    /// Maximum number of bytes written between two progress reports.
    pub chunk_size: usize,
    /// How several expected checksums combine.
    pub checksum_policy: ChecksumPolicy,
    /// Check `Content-Range` before appending to a partial file.
    pub verify_content_range: bool,
    /// Identifying `User-Agent` header.
    pub user_agent: String,
    /// Custom HTTP headers.
    pub headers: Option<HeaderMap>,
    /// Progress sink.
    pub progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for DownloaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloaderConfig")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("chunk_size", &self.chunk_size)
            .field("checksum_policy", &self.checksum_policy)
            .field("verify_content_range", &self.verify_content_range)
            .field("user_agent", &self.user_agent)
            .field("headers", &self.headers)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            checksum_policy: ChecksumPolicy::default(),
            verify_content_range: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: None,
            progress_callback: None,
        }
    }
}
