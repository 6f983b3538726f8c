//! Terminal outcome delivery.
//!
//! [`CompletionNotifier`] owns the caller's terminal callback and hands
//! it a [`TrackingOutcome`] at most once per session.

use autoinsight_core::snapshot::StatusSnapshot;

/// Why a tracking session ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The backend reported the job as failed.
    JobFailed,
    /// No terminal status within the attempt budget.
    TimedOut,
    /// Status queries kept failing (classifying error policy only).
    Unreachable,
    /// A status query was refused outright, e.g. the job is unknown
    /// (classifying error policy only).
    QueryRejected,
}

/// Final result of a tracking session, passed to the terminal callback.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingOutcome {
    /// The job finished; carries the final snapshot with all results.
    Completed(Box<StatusSnapshot>),
    /// The session ended in `Failed`.
    Failed {
        kind: FailureKind,
        /// Same text as the state's `error_message`.
        message: String,
        /// Last snapshot, when the failure was reported by the backend.
        snapshot: Option<Box<StatusSnapshot>>,
    },
}

impl TrackingOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TrackingOutcome::Completed(_))
    }
}

/// Callback invoked with the terminal outcome.
pub type TerminalCallback = Box<dyn FnOnce(TrackingOutcome) + Send + 'static>;

/// Fires the terminal callback exactly once.
pub struct CompletionNotifier {
    callback: Option<TerminalCallback>,
}

impl CompletionNotifier {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(TrackingOutcome) + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Deliver `outcome`. Returns `false` (and drops the outcome) if the
    /// callback already fired.
    pub fn notify(&mut self, outcome: TrackingOutcome) -> bool {
        match self.callback.take() {
            Some(callback) => {
                callback(outcome);
                true
            }
            None => {
                tracing::debug!("Terminal callback already fired, ignoring outcome");
                false
            }
        }
    }

    pub fn has_fired(&self) -> bool {
        self.callback.is_none()
    }
}

impl std::fmt::Debug for CompletionNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionNotifier")
            .field("fired", &self.has_fired())
            .finish()
    }
}
