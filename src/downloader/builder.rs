//! Builder pattern implementation for creating Downloader instances.
//!
//! # Examples
//!
//! ```rust
//! use steadyfetch::downloader::DownloaderBuilder;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), steadyfetch::Error> {
//! let downloader = DownloaderBuilder::new()
//!     .timeout(Duration::from_secs(10))
//!     .max_retries(5)
//!     .retry_delay(Duration::from_secs(2))
//!     .on_progress(|downloaded, total| {
//!         println!("{}/{}", downloaded, total);
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use super::{
    config::{DownloaderConfig, ProgressCallback},
    downloader::Downloader,
};
use crate::download::ChecksumPolicy;
use crate::error::Result;
use crate::http::{HttpClientConfig, HttpTransport, Transport};

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A builder used to create a [`Downloader`].
///
/// ```rust
/// # fn main() -> Result<(), steadyfetch::Error> {
/// use steadyfetch::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().max_retries(5).build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct DownloaderBuilder {
    config: DownloaderConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for DownloaderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloaderBuilder")
            .field("config", &self.config)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl DownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloaderBuilder::default()
    }

    /// Set the timeout applied to each network wait.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the number of retries after the first attempt.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Alias of [`max_retries`](Self::max_retries).
    pub fn retries(self, retries: u32) -> Self {
        self.max_retries(retries)
    }

    /// Set the fixed delay slept before each retry.
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.config.retry_delay = retry_delay;
        self
    }

    /// Set the maximum number of bytes written between progress reports.
    ///
    /// Values below one byte are raised to one.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size.max(1);
        self
    }

    /// Set how several expected checksums combine.
    pub fn checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.config.checksum_policy = policy;
        self
    }

    /// Check `Content-Range` on ranged responses before appending.
    ///
    /// When enabled, a server that ignores the `Range` header and answers with
    /// the full body causes the file to be rewritten from the start, and a
    /// ranged answer starting at the wrong offset fails the attempt.
    pub fn verify_content_range(mut self, verify: bool) -> Self {
        self.config.verify_content_range = verify;
        self
    }

    /// Set the identifying `User-Agent`.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the progress callback.
    ///
    /// # Example
    ///
    /// ```rust
    /// use steadyfetch::downloader::DownloaderBuilder;
    /// use std::sync::atomic::{AtomicU64, Ordering};
    /// use std::sync::Arc;
    ///
    /// let seen = Arc::new(AtomicU64::new(0));
    /// let sink = seen.clone();
    /// let downloader = DownloaderBuilder::new()
    ///     .on_progress(move |downloaded, _total| {
    ///         sink.store(downloaded, Ordering::Relaxed);
    ///     })
    ///     .build();
    /// ```
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        self.config.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Set an already shared progress callback.
    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Helper method to get or create a new HeaderMap.
    fn new_header(&self) -> HeaderMap {
        match self.config.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add the http headers.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be merged into a single one.
    ///
    /// See also [`header()`].
    ///
    /// [`header()`]: DownloaderBuilder::header
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.headers = Some(new);
        self
    }

    /// Add the http header
    ///
    /// # Example
    ///
    /// ```
    /// use reqwest::header::{self, HeaderValue};
    /// use steadyfetch::downloader::DownloaderBuilder;
    ///
    /// let auth = HeaderValue::from_str("Basic aGk6MTIzNDU2Cg==").expect("Invalid auth");
    ///
    /// let builder = DownloaderBuilder::new()
    ///     .header(header::AUTHORIZATION, auth)
    ///     .build();
    /// ```
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.headers = Some(new);
        self
    }

    /// Use a custom [`Transport`] instead of the default HTTP client.
    ///
    /// The `User-Agent` and header settings only apply to the default client.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Create the [`Downloader`] with the specified options.
    ///
    /// Fails when the default HTTP client cannot be built, e.g. because the
    /// `User-Agent` is not a valid header value.
    pub fn build(self) -> Result<Downloader> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(HttpClientConfig {
                user_agent: self.config.user_agent.clone(),
                headers: self.config.headers.clone(),
            })?),
        };

        Ok(Downloader::new(self.config, transport))
    }
}
