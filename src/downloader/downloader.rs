//! Core downloader implementation with fetch logic.
//!
//! One `download` call runs the whole state machine described in
//! [`state`](super::state) sequentially: it owns no background tasks and takes
//! no locks, so awaiting it suspends the calling task until the file is on
//! disk (or every attempt failed), including the delays between retries.
//!
//! Two concurrent downloads to the same destination race on the filesystem;
//! callers that may do this must serialize them.
//!
//! A continued transfer trusts the server: once `Range` is sent the returned
//! bytes are appended as they come, unless
//! [`verify_content_range`](super::DownloaderBuilder::verify_content_range)
//! is enabled.
//!
//! # Examples
//!
//! ```rust,no_run
//! use steadyfetch::{DownloadRequest, DownloaderBuilder};
//!
//! # async fn example() -> Result<(), steadyfetch::Error> {
//! let downloader = DownloaderBuilder::new().build()?;
//! let request = DownloadRequest::try_from("https://example.test/file.bin")?
//!     .destination("downloads/file.bin")
//!     .overwrite(true);
//!
//! let outcome = downloader.download(&request).await?;
//! println!("{} -> {}", outcome.succeeded(), outcome.final_path().display());
//! # Ok(())
//! # }
//! ```

use super::config::DownloaderConfig;
use super::state::{ResumePlan, TransferPhase, TransferState};
use crate::download::{checksum::validate_file, DownloadOutcome, DownloadRequest, Reason};
use crate::error::{Error, Result};
use crate::http::{BodyStream, Transport};

use futures::StreamExt;
use std::fmt;
use std::future::Future;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::{fs, fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, info, warn};

/// Represents the download controller.
///
/// A downloader can be created via its builder:
///
/// ```rust
/// # fn main() -> Result<(), steadyfetch::Error> {
/// use steadyfetch::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Downloader {
    config: DownloaderConfig,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Why a single transfer attempt stopped.
#[derive(Debug)]
enum AttemptError {
    /// Worth retrying: network error, timeout, bad status, short body.
    Transport(Error),
    /// Not worth retrying: the local filesystem refused an operation.
    Filesystem(Error),
}

impl Downloader {
    /// Creates a new Downloader with the given configuration.
    pub(crate) fn new(config: DownloaderConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Gets the timeout applied to each network wait.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Gets the number of retries per download.
    pub fn max_retries(&self) -> u32 {
        self.config.max_retries
    }

    /// Gets the delay slept before each retry.
    pub fn retry_delay(&self) -> Duration {
        self.config.retry_delay
    }

    /// Gets the maximum chunk written between progress reports.
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    /// Gets the transport used for every request.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Download `request.url` to its destination.
    ///
    /// Transport failures and checksum mismatches are reported through
    /// [`DownloadOutcome::succeeded`]; the returned path always names the file
    /// data was (or would have been) written to, which is left in place on
    /// failure.
    ///
    /// # Errors
    ///
    /// Only filesystem failures are returned as errors: the destination
    /// directory cannot be created, or the destination cannot be opened,
    /// written or read back for hashing.
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome> {
        let mut state = TransferState::new(request.resolve_destination());

        if let Some(outcome) = self.check_existing(request, &mut state).await? {
            return Ok(outcome);
        }

        if let Some(parent) = state.destination.parent() {
            if !parent.as_os_str().is_empty() {
                debug!("Creating destination directory {:?}", parent);
                fs::create_dir_all(parent).await?;
            }
        }

        state.transition(TransferPhase::Probing);
        if let Some(outcome) = self.probe(request, &mut state).await? {
            return Ok(outcome);
        }

        state.transition(TransferPhase::Transferring);
        loop {
            match self.attempt(request, &mut state).await {
                Ok(()) => break,
                Err(AttemptError::Filesystem(e)) => return Err(e),
                Err(AttemptError::Transport(e)) => {
                    state.attempt += 1;
                    warn!(
                        url = %request.url,
                        attempt = state.attempt,
                        error = %e,
                        "Download attempt failed"
                    );

                    let on_disk = file_size(&state.destination).await?.unwrap_or(0);
                    let plan = state.plan_for(on_disk);
                    state.apply(plan);
                    if plan == ResumePlan::Complete {
                        debug!(path = %state.destination.display(), "Every byte is on disk");
                        break;
                    }

                    if state.attempt > self.config.max_retries {
                        state.transition(TransferPhase::Failed);
                        warn!(
                            url = %request.url,
                            attempts = state.attempt,
                            "Giving up on download"
                        );
                        return Ok(DownloadOutcome::failure(
                            &state.destination,
                            on_disk,
                            Reason::TransferFailed,
                        ));
                    }

                    if let ResumePlan::Resume(offset) = plan {
                        debug!(offset, "Will resume on retry");
                    }

                    state.transition(TransferPhase::RetryWait);
                    info!(
                        "Retry #{} after {:?} delay",
                        state.attempt, self.config.retry_delay
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                    state.transition(TransferPhase::Transferring);
                }
            }
        }

        info!(url = %request.url, path = %state.destination.display(), "Downloaded file");
        self.finish(request, &mut state, Reason::Downloaded).await
    }

    /// `Init`: keep an existing destination unless overwriting was requested.
    async fn check_existing(
        &self,
        request: &DownloadRequest,
        state: &mut TransferState,
    ) -> Result<Option<DownloadOutcome>> {
        if request.overwrite {
            return Ok(None);
        }
        let Some(size) = file_size(&state.destination).await? else {
            return Ok(None);
        };

        debug!(
            path = %state.destination.display(),
            "File already exists and overwrite is disabled"
        );
        state.bytes_on_disk = size;
        self.finish(request, state, Reason::AlreadyPresent)
            .await
            .map(Some)
    }

    /// `Probing`: learn the size and range support, best effort.
    ///
    /// Returns an outcome when the file on disk is already complete.
    async fn probe(
        &self,
        request: &DownloadRequest,
        state: &mut TransferState,
    ) -> Result<Option<DownloadOutcome>> {
        let probe = match self.bounded(self.config.timeout, self.transport.head(&request.url)).await
        {
            Ok(probe) if probe.is_success() => probe,
            Ok(probe) => {
                warn!(url = %request.url, status = probe.status, "Probe rejected, downloading without resume");
                return Ok(None);
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "Failed to get file info");
                return Ok(None);
            }
        };

        state.known_total_size = probe.content_length;
        if !(probe.accept_ranges && request.overwrite) {
            return Ok(None);
        }
        let Some(on_disk) = file_size(&state.destination).await? else {
            return Ok(None);
        };
        if state.known_total_size.is_none() {
            debug!("Server size unknown, not resuming");
            return Ok(None);
        }

        let plan = state.plan_for(on_disk);
        state.apply(plan);
        match plan {
            ResumePlan::Complete => {
                debug!(path = %state.destination.display(), "File already fully downloaded");
                self.finish(request, state, Reason::AlreadyComplete)
                    .await
                    .map(Some)
            }
            ResumePlan::Resume(offset) => {
                debug!(offset, "Resuming download");
                Ok(None)
            }
            ResumePlan::Restart => {
                if on_disk > 0 {
                    warn!(
                        path = %state.destination.display(),
                        on_disk,
                        expected = ?state.known_total_size,
                        "Local file is larger than the resource, restarting"
                    );
                }
                Ok(None)
            }
        }
    }

    /// `Transferring`: one `GET`, streamed to disk.
    async fn attempt(
        &self,
        request: &DownloadRequest,
        state: &mut TransferState,
    ) -> std::result::Result<(), AttemptError> {
        debug!(url = %request.url, range = ?state.range_header(), "Fetching");
        let response = self
            .bounded(
                self.config.timeout,
                self.transport.get(&request.url, state.range_start),
            )
            .await
            .map_err(AttemptError::Transport)?;

        if !response.is_success() {
            return Err(AttemptError::Transport(Error::HttpStatus {
                status: response.status,
            }));
        }

        if let Some(offset) = state.range_start {
            if self.config.verify_content_range {
                match response.content_range {
                    _ if response.status == 200 => {
                        warn!(offset, "Server ignored the range request, rewriting from the start");
                        state.apply(ResumePlan::Restart);
                    }
                    Some(range) if range.start == offset => {}
                    other => {
                        state.discard_partial = true;
                        return Err(AttemptError::Transport(Error::RangeMismatch {
                            expected: offset,
                            actual: other.map(|r| r.start),
                        }));
                    }
                }
            }
        }

        let offset = state.range_start.unwrap_or(0);
        let expected_end = match response.content_length {
            Some(len) => Some(offset.checked_add(len).ok_or_else(|| {
                AttemptError::Transport(Error::Internal(format!(
                    "content length {} at offset {} overflows",
                    len, offset
                )))
            })?),
            None => None,
        };
        if let Some(total) = response.content_range.and_then(|r| r.total).or(expected_end) {
            state.known_total_size = Some(total);
        }

        let append = state.range_start.is_some();
        debug!("Creating destination file {:?}", &state.destination);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&state.destination)
            .await
            .map_err(|e| AttemptError::Filesystem(e.into()))?;

        state.bytes_on_disk = offset;
        let streamed = self.stream_body(response.body, &mut file, state).await;
        let flushed = file.flush().await;
        streamed?;
        flushed.map_err(|e| AttemptError::Filesystem(e.into()))?;

        if let Some(end) = expected_end {
            if state.bytes_on_disk < end {
                return Err(AttemptError::Transport(Error::Internal(format!(
                    "body ended after {} of {} bytes",
                    state.bytes_on_disk, end
                ))));
            }
        }

        Ok(())
    }

    /// Write the body in chunks of at most `chunk_size`, reporting progress.
    async fn stream_body(
        &self,
        mut body: BodyStream,
        file: &mut fs::File,
        state: &mut TransferState,
    ) -> std::result::Result<(), AttemptError> {
        debug!("Retrieving chunks...");
        loop {
            let chunk = match tokio::time::timeout(self.config.timeout, body.next()).await {
                Err(_) => return Err(AttemptError::Transport(Error::Timeout(self.config.timeout))),
                Ok(None) => return Ok(()),
                Ok(Some(Err(e))) => return Err(AttemptError::Transport(e)),
                Ok(Some(Ok(chunk))) => chunk,
            };

            for piece in chunk.chunks(self.config.chunk_size) {
                file.write_all(piece)
                    .await
                    .map_err(|e| AttemptError::Filesystem(e.into()))?;
                state.bytes_on_disk += piece.len() as u64;

                if let (Some(callback), Some(total)) =
                    (&self.config.progress_callback, state.known_total_size)
                {
                    callback(state.bytes_on_disk, total);
                }
            }
        }
    }

    /// `Validating`: check the file on disk against the expected checksums.
    async fn finish(
        &self,
        request: &DownloadRequest,
        state: &mut TransferState,
        reason: Reason,
    ) -> Result<DownloadOutcome> {
        let bytes_on_disk = file_size(&state.destination)
            .await?
            .unwrap_or(state.bytes_on_disk);

        state.transition(TransferPhase::Validating);
        if request.expected_checksums.is_empty() {
            state.transition(TransferPhase::Done);
            return Ok(DownloadOutcome::success(
                &state.destination,
                bytes_on_disk,
                reason,
            ));
        }

        let valid = validate_file(
            &state.destination,
            &request.expected_checksums,
            self.config.checksum_policy,
        )
        .await?;

        let outcome = if valid {
            state.transition(TransferPhase::Done);
            DownloadOutcome::success(&state.destination, bytes_on_disk, reason)
        } else {
            state.transition(TransferPhase::Failed);
            warn!(path = %state.destination.display(), "File failed checksum validation");
            DownloadOutcome::failure(&state.destination, bytes_on_disk, Reason::ChecksumMismatch)
        };
        debug_assert!(state.phase().is_terminal());
        Ok(outcome)
    }

    /// Await a transport future for at most `limit`.
    pub(crate) async fn bounded<T>(
        &self,
        limit: Duration,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(limit, future)
            .await
            .map_err(|_| Error::Timeout(limit))?
    }
}

/// Size of the file at `path`, or `None` when it does not exist.
async fn file_size(path: &Path) -> Result<Option<u64>> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata.len())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
