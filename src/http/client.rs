//! HTTP client setup and middleware configuration.
//!
//! Every request issued by one downloader goes through a single shared
//! client, which carries a fixed `User-Agent` plus any extra default headers
//! and traces each request with `reqwest-tracing`.
//!
//! Retries are deliberately not handled by middleware: the downloader owns
//! its retry loop so that a retried transfer can continue from the bytes
//! already written instead of restarting the request from scratch.
//!
//! # Examples
//!
//! ```rust
//! use steadyfetch::http::{create_http_client, HttpClientConfig};
//! use reqwest::header::{HeaderMap, ACCEPT};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut headers = HeaderMap::new();
//! headers.insert(ACCEPT, "*/*".parse()?);
//!
//! let config = HttpClientConfig {
//!     headers: Some(headers),
//!     ..HttpClientConfig::default()
//! };
//!
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

/// `User-Agent` sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("steadyfetch/", env!("CARGO_PKG_VERSION"));

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Identifying `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: None,
        }
    }
}

/// Creates an HTTP client with middleware configuration.
///
/// This function sets up a reqwest client with:
/// - Tracing middleware for request/response logging
/// - The configured `User-Agent`
/// - Optional default headers
///
/// # Example
///
/// ```rust
/// use steadyfetch::http::client::{create_http_client, HttpClientConfig};
///
/// let config = HttpClientConfig::default();
/// let client = create_http_client(config).unwrap();
/// ```
pub fn create_http_client(
    config: HttpClientConfig,
) -> Result<ClientWithMiddleware, crate::error::Error> {
    let mut headers = config.headers.unwrap_or_default();
    let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|e| {
        crate::error::Error::Internal(format!(
            "Invalid user agent \"{}\": {}",
            config.user_agent, e
        ))
    })?;
    headers.insert(USER_AGENT, user_agent);
    let inner_client = reqwest::Client::builder()
        .default_headers(headers)
        .build()?;

    let client = ClientBuilder::new(inner_client)
        // Trace HTTP requests. See the tracing crate to make use of these traces.
        .with(TracingMiddleware::default())
        .build();

    Ok(client)
}
