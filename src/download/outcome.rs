//! Download outcome.
//!
//! The stable contract of a download is a boolean plus the path data was
//! written to. [`Reason`] and the byte count are diagnostic extras.

use std::path::{Path, PathBuf};

/// Why a download ended the way it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The resource was transferred (fully or by continuing a partial file).
    Downloaded,
    /// The destination already existed and was kept untouched.
    AlreadyPresent,
    /// The partial file on disk already had the full expected size.
    AlreadyComplete,
    /// The file on disk does not match the expected checksums.
    ChecksumMismatch,
    /// Every transfer attempt failed.
    TransferFailed,
}

/// Represents the result of one download call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    succeeded: bool,
    final_path: PathBuf,
    bytes_on_disk: u64,
    reason: Reason,
}

impl DownloadOutcome {
    /// Create a successful [`DownloadOutcome`].
    pub fn success(final_path: impl Into<PathBuf>, bytes_on_disk: u64, reason: Reason) -> Self {
        Self {
            succeeded: true,
            final_path: final_path.into(),
            bytes_on_disk,
            reason,
        }
    }

    /// Create a failed [`DownloadOutcome`].
    pub fn failure(final_path: impl Into<PathBuf>, bytes_on_disk: u64, reason: Reason) -> Self {
        Self {
            succeeded: false,
            final_path: final_path.into(),
            bytes_on_disk,
            reason,
        }
    }

    /// Whether the file at [`final_path`](Self::final_path) can be trusted.
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Where data was written. Also set on failure, so the caller can decide
    /// whether to keep or remove a partial or mismatching file.
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Size of the destination file when the call returned.
    pub fn bytes_on_disk(&self) -> u64 {
        self.bytes_on_disk
    }

    /// Get a reference to the outcome's reason.
    pub fn reason(&self) -> &Reason {
        &self.reason
    }

    /// Consume the outcome, keeping only the stable `(succeeded, path)` pair.
    pub fn into_parts(self) -> (bool, PathBuf) {
        (self.succeeded, self.final_path)
    }
}
