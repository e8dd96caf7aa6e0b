//! Per-call transfer state.
//!
//! One [`TransferState`] lives for the duration of a single `download` call
//! and is discarded when it returns. It tracks where the call is in the
//! download state machine:
//!
//! ```text
//! Init -> Probing -> Transferring <-> RetryWait -> Validating -> Done | Failed
//! ```
//!
//! `Init` may go straight to `Validating` when the destination already
//! exists, and so may `Probing` when the file on disk is already complete.
//! A failed probe never leads to `Failed`; it only leaves no resume metadata.

use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Phase of a single download call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Init,
    Probing,
    Transferring,
    RetryWait,
    Validating,
    Done,
    Failed,
}

impl TransferPhase {
    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: TransferPhase) -> bool {
        use TransferPhase::*;

        matches!(
            (self, next),
            (Init, Probing)
                | (Init, Validating)
                | (Probing, Transferring)
                | (Probing, Validating)
                | (Transferring, RetryWait)
                | (Transferring, Validating)
                | (Transferring, Failed)
                | (RetryWait, Transferring)
                | (Validating, Done)
                | (Validating, Failed)
        )
    }

    /// Whether the call has finished.
    pub fn is_terminal(self) -> bool {
        matches!(self, TransferPhase::Done | TransferPhase::Failed)
    }
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferPhase::Init => "init",
            TransferPhase::Probing => "probing",
            TransferPhase::Transferring => "transferring",
            TransferPhase::RetryWait => "retry-wait",
            TransferPhase::Validating => "validating",
            TransferPhase::Done => "done",
            TransferPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the next transfer attempt should do with the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResumePlan {
    /// Truncate and fetch the whole resource.
    Restart,
    /// Append, requesting bytes from the given offset.
    Resume(u64),
    /// The file already holds every expected byte.
    Complete,
}

/// Mutable bookkeeping of one download call.
#[derive(Debug, Clone)]
pub(crate) struct TransferState {
    pub(crate) destination: PathBuf,
    pub(crate) known_total_size: Option<u64>,
    pub(crate) bytes_on_disk: u64,
    pub(crate) range_start: Option<u64>,
    pub(crate) attempt: u32,
    /// Set when the partial file must not be continued on the next attempt.
    pub(crate) discard_partial: bool,
    phase: TransferPhase,
}

impl TransferState {
    pub(crate) fn new(destination: PathBuf) -> Self {
        Self {
            destination,
            known_total_size: None,
            bytes_on_disk: 0,
            range_start: None,
            attempt: 0,
            discard_partial: false,
            phase: TransferPhase::Init,
        }
    }

    pub(crate) fn phase(&self) -> TransferPhase {
        self.phase
    }

    pub(crate) fn transition(&mut self, next: TransferPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid transition {} -> {}",
            self.phase,
            next
        );
        debug!(
            path = %self.destination.display(),
            from = %self.phase,
            to = %next,
            attempt = self.attempt,
            "Download phase change"
        );
        self.phase = next;
    }

    /// `Range` header value for the next request, if continuing.
    pub(crate) fn range_header(&self) -> Option<String> {
        self.range_start.map(|offset| format!("bytes={}-", offset))
    }

    /// Decide how to treat `on_disk` bytes already present at the destination.
    ///
    /// More bytes than the known total means the local file is corrupt.
    pub(crate) fn plan_for(&self, on_disk: u64) -> ResumePlan {
        if self.discard_partial || on_disk == 0 {
            return ResumePlan::Restart;
        }
        match self.known_total_size {
            Some(total) if on_disk > total => ResumePlan::Restart,
            Some(total) if on_disk == total => ResumePlan::Complete,
            _ => ResumePlan::Resume(on_disk),
        }
    }

    /// Apply a plan to the state that drives the next request.
    pub(crate) fn apply(&mut self, plan: ResumePlan) {
        self.discard_partial = false;
        match plan {
            ResumePlan::Restart => {
                self.range_start = None;
                self.bytes_on_disk = 0;
            }
            ResumePlan::Resume(offset) => {
                self.range_start = Some(offset);
                self.bytes_on_disk = offset;
            }
            ResumePlan::Complete => {
                self.range_start = None;
                if let Some(total) = self.known_total_size {
                    self.bytes_on_disk = total;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_total(total: Option<u64>) -> TransferState {
        let mut state = TransferState::new(PathBuf::from("/tmp/file.bin"));
        state.known_total_size = total;
        state
    }

    #[test]
    fn test_transitions() {
        use TransferPhase::*;

        assert!(Init.can_transition_to(Probing));
        assert!(Probing.can_transition_to(Transferring));
        assert!(Transferring.can_transition_to(RetryWait));
        assert!(RetryWait.can_transition_to(Transferring));
        assert!(Validating.can_transition_to(Failed));

        assert!(!Probing.can_transition_to(Failed));
        assert!(!Transferring.can_transition_to(Done));
        assert!(!RetryWait.can_transition_to(Validating));
        assert!(!Done.can_transition_to(Transferring));
        assert!(Done.is_terminal() && Failed.is_terminal());
    }

    #[test]
    fn test_plan_resume() {
        let state = state_with_total(Some(1000));
        assert_eq!(state.plan_for(400), ResumePlan::Resume(400));
        assert_eq!(state.plan_for(0), ResumePlan::Restart);
        assert_eq!(state.plan_for(1000), ResumePlan::Complete);
    }

    #[test]
    fn test_oversized_local_file_restarts() {
        let state = state_with_total(Some(1000));
        assert_eq!(state.plan_for(1200), ResumePlan::Restart);
    }

    #[test]
    fn test_unknown_total_resumes() {
        let state = state_with_total(None);
        assert_eq!(state.plan_for(10), ResumePlan::Resume(10));
    }

    #[test]
    fn test_discarded_partial_restarts_once() {
        let mut state = state_with_total(Some(1000));
        state.discard_partial = true;
        let plan = state.plan_for(400);
        assert_eq!(plan, ResumePlan::Restart);

        state.apply(plan);
        assert!(!state.discard_partial);
        assert_eq!(state.range_header(), None);
        assert_eq!(state.plan_for(400), ResumePlan::Resume(400));
    }

    #[test]
    fn test_range_header() {
        let mut state = state_with_total(Some(1000));
        state.apply(ResumePlan::Resume(400));
        assert_eq!(state.range_header().as_deref(), Some("bytes=400-"));
        assert_eq!(state.bytes_on_disk, 400);
    }
}
