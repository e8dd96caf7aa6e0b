//! steadyfetch downloads a remote resource into a local file, surviving
//! transient network failures, continuing partial files with byte ranges when
//! the server supports them, and verifying the result against checksums.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use steadyfetch::{DownloadRequest, DownloaderBuilder, Error};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let downloader = DownloaderBuilder::new()
//!     .on_progress(|downloaded, total| println!("{}/{}", downloaded, total))
//!     .build()?;
//!
//! let request = DownloadRequest::try_from("https://example.test/file.bin")?
//!     .destination("downloads/file.bin")
//!     .checksum("sha256", "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
//!
//! let outcome = downloader.download(&request).await?;
//! if !outcome.succeeded() {
//!     eprintln!("partial or unverified data left at {}", outcome.final_path().display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`download`] - Request and outcome types, checksum verification
//! - [`downloader`] - The `Downloader`, its builder, configuration and state machine
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`http`] - HTTP client construction and the `Transport` seam
//! - [`utils`] - Response header parsing

pub mod download;
pub mod downloader;
pub mod error;
pub mod http;
pub mod utils;

pub use download::checksum::{file_digest, validate_file, ChecksumPolicy, HashAlgorithm, Hasher};
pub use download::{DownloadOutcome, DownloadRequest, Reason};
pub use downloader::{
    Availability, Downloader, DownloaderBuilder, FetchedContent, ProgressCallback, TransferPhase,
};
pub use error::{Error, Result};
pub use http::{
    create_http_client, HttpClientConfig, HttpTransport, ProbeResponse, TransferResponse,
    Transport,
};
