//! Error handling for the steadyfetch library.
//!
//! Only two kinds of failure ever reach a caller as an [`Error`]: a request
//! that cannot be parsed into an absolute URL, and a filesystem operation that
//! cannot succeed by retrying. Everything else (transport failures, checksum
//! mismatches, failed probes) is folded into a boolean outcome and only shows
//! up in the logs. The remaining variants are used internally to carry
//! failures between the transport and the downloader's state machine.

use std::io;
use thiserror::Error;

/// Errors that can happen when using steadyfetch.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    ///
    /// This variant captures internal errors that don't fit into other categories.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from the underlying URL parser or the expected URL format.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O Error.
    ///
    /// Creating the destination directory, opening the destination file or
    /// hashing it on disk.
    #[error("I/O error")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error raised by the middleware stack wrapping the HTTP client.
    #[error("HTTP middleware error")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// The server answered with a status code outside of the 2xx range.
    #[error("Unexpected HTTP status {status}")]
    HttpStatus { status: u16 },

    /// No response or body chunk arrived within the configured timeout.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A digest was requested for an algorithm this crate does not provide.
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A ranged response did not start at the requested offset.
    #[error("Range response starts at {actual:?}, expected {expected}")]
    RangeMismatch { expected: u64, actual: Option<u64> },

    /// The response body could not be decoded as JSON.
    #[error("JSON decoding error")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Result type alias for operations that can fail with a steadyfetch error.
pub type Result<T> = std::result::Result<T, Error>;
