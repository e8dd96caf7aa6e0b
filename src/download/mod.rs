//! Download description, outcome and integrity checks.
//!
//! - [`request`] - The [`DownloadRequest`] handed to the downloader
//! - [`outcome`] - The [`DownloadOutcome`] it returns
//! - [`checksum`] - Incremental hashing and checksum verification
//!
//! # Examples
//!
//! ```rust
//! use steadyfetch::download::DownloadRequest;
//! use std::convert::TryFrom;
//!
//! let request = DownloadRequest::try_from("https://example.test/file.bin")?
//!     .destination("downloads/file.bin")
//!     .checksum("sha256", "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
//! assert_eq!(request.expected_checksums.len(), 1);
//! # Ok::<(), steadyfetch::Error>(())
//! ```

pub mod checksum;
pub mod outcome;
pub mod request;

pub use checksum::{validate_file, ChecksumPolicy, HashAlgorithm, Hasher};
pub use outcome::{DownloadOutcome, Reason};
pub use request::{DownloadRequest, FALLBACK_FILENAME};
