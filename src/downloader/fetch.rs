//! Small, non-resumable requests sharing the downloader's client and policy.

use super::downloader::Downloader;
use crate::error::{Error, Result};

use futures::StreamExt;
use reqwest::Url;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const PREALLOCATE_LIMIT: usize = 64 * 1024;

/// Body returned by [`Downloader::fetch_url`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedContent {
    /// Decoded JSON document.
    Json(serde_json::Value),
    /// Body decoded as UTF-8 text, invalid sequences replaced.
    Text(String),
}

impl FetchedContent {
    /// The JSON document, if the content was fetched as JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            FetchedContent::Json(value) => Some(value),
            FetchedContent::Text(_) => None,
        }
    }

    /// The text body, if the content was fetched as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FetchedContent::Text(text) => Some(text),
            FetchedContent::Json(_) => None,
        }
    }
}

/// Result of [`Downloader::check_url_availability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// A response arrived with a status code below 400.
    pub available: bool,
    /// Time until the response arrived; zero when none did.
    pub response_time: Duration,
}

impl Availability {
    /// Response time in whole milliseconds.
    pub fn response_time_ms(&self) -> u128 {
        self.response_time.as_millis()
    }
}

impl Downloader {
    /// Fetch a URL into memory.
    ///
    /// Uses the same retry policy as [`download`](Downloader::download), but
    /// every attempt restarts the request from scratch. Returns `None` when
    /// the URL is invalid, every attempt failed, or JSON was requested and the
    /// body is not valid JSON (which is not retried).
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use steadyfetch::DownloaderBuilder;
    ///
    /// # async fn example() -> Result<(), steadyfetch::Error> {
    /// let downloader = DownloaderBuilder::new().build()?;
    /// if let Some(content) = downloader.fetch_url("https://example.test/index.json", true).await {
    ///     println!("{:?}", content.as_json());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_url(&self, url: &str, as_json: bool) -> Option<FetchedContent> {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => {
                warn!(url, error = %e, "Invalid URL");
                return None;
            }
        };

        for attempt in 0..=self.max_retries() {
            if attempt > 0 {
                info!("Retry #{} after {:?} delay", attempt, self.retry_delay());
                tokio::time::sleep(self.retry_delay()).await;
            }

            let body = match self.fetch_once(&url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(%url, error = %e, "Failed to fetch URL");
                    continue;
                }
            };

            if !as_json {
                return Some(FetchedContent::Text(
                    String::from_utf8_lossy(&body).into_owned(),
                ));
            }
            return match serde_json::from_slice(&body) {
                Ok(value) => Some(FetchedContent::Json(value)),
                Err(e) => {
                    warn!(%url, error = %Error::from(e), "Response is not valid JSON");
                    None
                }
            };
        }

        None
    }

    async fn fetch_once(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self
            .bounded(self.timeout(), self.transport().get(url, None))
            .await?;
        if !response.is_success() {
            return Err(Error::HttpStatus {
                status: response.status,
            });
        }

        let mut body = response.body;
        // Content-Length is only a hint; never reserve more than one buffer's worth.
        let hint = response
            .content_length
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or(0);
        let mut buffer = Vec::with_capacity(hint.min(PREALLOCATE_LIMIT));
        while let Some(chunk) = tokio::time::timeout(self.timeout(), body.next())
            .await
            .map_err(|_| Error::Timeout(self.timeout()))?
        {
            buffer.extend_from_slice(&chunk?);
        }

        Ok(buffer)
    }

    /// Check whether a URL answers a `HEAD` request.
    ///
    /// A single request, never retried. Any failure to get a response counts
    /// as unavailable with a zero response time. `timeout` defaults to the
    /// downloader's timeout.
    pub async fn check_url_availability(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Availability {
        let unavailable = Availability {
            available: false,
            response_time: Duration::ZERO,
        };
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => {
                debug!(url, error = %e, "Invalid URL");
                return unavailable;
            }
        };

        let limit = timeout.unwrap_or(self.timeout());
        let started = Instant::now();
        match self.bounded(limit, self.transport().head(&url)).await {
            Ok(probe) => {
                let availability = Availability {
                    available: probe.status < 400,
                    response_time: started.elapsed(),
                };
                debug!(
                    %url,
                    status = probe.status,
                    response_time_ms = availability.response_time_ms() as u64,
                    "URL checked"
                );
                availability
            }
            Err(e) => {
                debug!(%url, error = %e, "URL is not available");
                unavailable
            }
        }
    }
}
