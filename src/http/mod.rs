//! HTTP module containing client construction and the transport seam.
//!
//! - [`client`] - HTTP client creation and middleware configuration
//! - [`transport`] - The [`Transport`] trait and its `reqwest` implementation
//!
//! # Examples
//!
//! ```rust
//! use steadyfetch::http::{HttpClientConfig, HttpTransport};
//!
//! # fn example() -> Result<(), steadyfetch::Error> {
//! let transport = HttpTransport::new(HttpClientConfig {
//!     user_agent: "my-tool/1.0".to_string(),
//!     ..HttpClientConfig::default()
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod transport;

pub use client::{create_http_client, HttpClientConfig, DEFAULT_USER_AGENT};
pub use transport::{BodyStream, HttpTransport, ProbeResponse, TransferResponse, Transport};
