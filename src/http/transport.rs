//! The transport seam between the downloader and the network.
//!
//! The downloader only ever needs two requests: a `HEAD` probe and a streamed
//! `GET`, optionally starting at a byte offset. [`Transport`] captures exactly
//! that, so the downloader's state machine can be driven by a scripted fake in
//! tests and by [`HttpTransport`] everywhere else.
//!
//! Timeouts are not part of the trait; the downloader bounds every await on a
//! transport future itself.

use crate::error::{Error, Result};
use crate::http::client::{create_http_client, HttpClientConfig};
use crate::utils::{
    accepts_byte_ranges, extract_content_range, parse_content_length, ContentRange,
};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::{header::RANGE, Url};
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use tracing::debug;

/// A response body, delivered as a stream of byte chunks.
pub type BodyStream = BoxStream<'static, Result<Bytes>>;

/// Metadata learned from a `HEAD` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status code.
    pub status: u16,
    /// Value of `Content-Length`, if present and numeric.
    pub content_length: Option<u64>,
    /// Whether `Accept-Ranges: bytes` was advertised.
    pub accept_ranges: bool,
}

impl ProbeResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Headers and body of a `GET` request.
pub struct TransferResponse {
    /// HTTP status code.
    pub status: u16,
    /// Value of `Content-Length`, if present and numeric.
    pub content_length: Option<u64>,
    /// Parsed `Content-Range`, for ranged responses.
    pub content_range: Option<ContentRange>,
    /// The response body.
    pub body: BodyStream,
}

impl TransferResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for TransferResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .field("content_range", &self.content_range)
            .finish_non_exhaustive()
    }
}

/// Issues the requests a download needs.
///
/// Implementations must be safe to share between concurrent downloads.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a `HEAD` request.
    async fn head(&self, url: &Url) -> Result<ProbeResponse>;

    /// Issue a streamed `GET`, sending `Range: bytes=<offset>-` when
    /// `range_start` is set.
    async fn get(&self, url: &Url, range_start: Option<u64>) -> Result<TransferResponse>;
}

/// [`Transport`] backed by a shared `reqwest` client with middleware.
#[derive(Clone)]
pub struct HttpTransport {
    client: ClientWithMiddleware,
}

impl HttpTransport {
    /// Creates a transport with a freshly built client.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        Ok(Self::from_client(create_http_client(config)?))
    }

    /// Wraps an existing client.
    pub fn from_client(client: ClientWithMiddleware) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &ClientWithMiddleware {
        &self.client
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn head(&self, url: &Url) -> Result<ProbeResponse> {
        let res = self.client.head(url.clone()).send().await?;
        let headers = res.headers();
        Ok(ProbeResponse {
            status: res.status().as_u16(),
            content_length: parse_content_length(headers),
            accept_ranges: accepts_byte_ranges(headers),
        })
    }

    async fn get(&self, url: &Url, range_start: Option<u64>) -> Result<TransferResponse> {
        let mut req = self.client.get(url.clone());
        if let Some(offset) = range_start {
            debug!(%url, offset, "Requesting byte range");
            req = req.header(RANGE, format!("bytes={}-", offset));
        }

        let res = req.send().await?;
        let headers = res.headers();
        let status = res.status().as_u16();
        let content_length = parse_content_length(headers);
        let content_range = extract_content_range(headers);
        let body = res
            .bytes_stream()
            .map(|chunk| chunk.map_err(Error::from))
            .boxed();

        Ok(TransferResponse {
            status,
            content_length,
            content_range,
            body,
        })
    }
}
