//! Download request description.
//!
//! A [`DownloadRequest`] names the remote resource, where it should land on
//! disk, whether an existing file may be replaced, and which checksums the
//! result must satisfy. It is immutable once handed to the downloader.

use crate::error::Error;

use reqwest::Url;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::path::{Path, PathBuf};

/// File name used when the URL path does not end with one.
pub const FALLBACK_FILENAME: &str = "download.tmp";

/// Represents a file to be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// URL of the file to download.
    pub url: Url,
    /// Where to store the file. Derived from the URL when absent.
    pub destination: Option<PathBuf>,
    /// Replace (or continue) an existing file instead of keeping it.
    pub overwrite: bool,
    /// Expected hex digests keyed by algorithm name.
    pub expected_checksums: BTreeMap<String, String>,
}

impl DownloadRequest {
    /// Creates a new [`DownloadRequest`] for `url`.
    ///
    /// ```rust
    /// use steadyfetch::DownloadRequest;
    /// use reqwest::Url;
    ///
    /// let request = DownloadRequest::new(&Url::parse("https://example.test/file.bin")?)
    ///     .overwrite(true)
    ///     .checksum("sha256", "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    /// assert!(request.overwrite);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(url: &Url) -> Self {
        Self {
            url: url.clone(),
            destination: None,
            overwrite: false,
            expected_checksums: BTreeMap::new(),
        }
    }

    /// Sets the destination path.
    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Sets whether an existing destination may be replaced or continued.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Adds an expected checksum.
    pub fn checksum(mut self, algorithm: impl Into<String>, hex_digest: impl Into<String>) -> Self {
        self.expected_checksums
            .insert(algorithm.into(), hex_digest.into());
        self
    }

    /// Replaces the whole set of expected checksums.
    pub fn checksums(mut self, checksums: BTreeMap<String, String>) -> Self {
        self.expected_checksums = checksums;
        self
    }

    /// File name derived from the last URL path segment.
    ///
    /// Percent-encoded characters are decoded. Returns `None` when the path is
    /// empty or ends with a `/`.
    pub fn url_filename(&self) -> Option<String> {
        let segment = self.url.path_segments()?.next_back()?;
        if segment.is_empty() {
            return None;
        }
        let decoded: String = form_urlencoded::parse(segment.as_bytes())
            .map(|(key, val)| [key, val].concat())
            .collect();
        if decoded.is_empty() || decoded == "." || decoded == ".." || decoded.contains('/') {
            return None;
        }
        Some(decoded)
    }

    /// The path the file is written to.
    ///
    /// Either the explicit destination, or the URL file name (falling back to
    /// [`FALLBACK_FILENAME`]) under the platform temporary directory.
    pub fn resolve_destination(&self) -> PathBuf {
        self.resolve_destination_in(&std::env::temp_dir())
    }

    pub(crate) fn resolve_destination_in(&self, base: &Path) -> PathBuf {
        match &self.destination {
            Some(destination) => destination.clone(),
            None => base.join(
                self.url_filename()
                    .unwrap_or_else(|| FALLBACK_FILENAME.to_string()),
            ),
        }
    }
}

impl TryFrom<&Url> for DownloadRequest {
    type Error = crate::error::Error;

    fn try_from(value: &Url) -> Result<Self, Self::Error> {
        match value.scheme() {
            "http" | "https" => Ok(DownloadRequest::new(value)),
            scheme => Err(Error::InvalidUrl(format!(
                "The url \"{}\" uses the unsupported scheme \"{}\"",
                value, scheme
            ))),
        }
    }
}

impl TryFrom<&str> for DownloadRequest {
    type Error = crate::error::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Url::parse(value)
            .map_err(|e| {
                Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", value, e))
            })
            .and_then(|u| DownloadRequest::try_from(&u))
    }
}
