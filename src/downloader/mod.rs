//! Downloader module containing the core state machine, builder pattern, and configuration.
//!
//! - `downloader` - The [`Downloader`] and its resumable, verified `download`
//! - `fetch` - In-memory fetches and availability checks sharing the same client
//! - `builder` - [`DownloaderBuilder`] for flexible configuration
//! - `config` - Configuration structure, defaults and the progress callback type
//! - `state` - Per-call transfer bookkeeping and phases
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use steadyfetch::downloader::DownloaderBuilder;
//! use steadyfetch::download::DownloadRequest;
//! use std::convert::TryFrom;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = DownloaderBuilder::new().build()?;
//!
//! let request = DownloadRequest::try_from("https://example.test/file.bin")?;
//! let outcome = downloader.download(&request).await?;
//! assert!(outcome.succeeded());
//! # Ok(())
//! # }
//! ```
//!
//! ## Advanced Configuration
//!
//! ```rust
//! use steadyfetch::downloader::DownloaderBuilder;
//! use steadyfetch::download::ChecksumPolicy;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = DownloaderBuilder::new()
//!     .max_retries(5)
//!     .retry_delay(Duration::from_secs(1))
//!     .checksum_policy(ChecksumPolicy::All)
//!     .verify_content_range(true)
//!     .on_progress(|downloaded, total| {
//!         println!("{:.1}%", downloaded as f64 * 100.0 / total as f64);
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod downloader;
pub mod fetch;
pub mod state;

pub use builder::DownloaderBuilder;
pub use config::{DownloaderConfig, ProgressCallback};
pub use downloader::Downloader;
pub use fetch::{Availability, FetchedContent};
pub use state::TransferPhase;
