//! Local tracking state machine for one analysis session.
//!
//! [`TrackingState`] is owned and mutated by a single tracker task.
//! Observers receive clones. Phases only move forward:
//!
//! ```text
//! Idle -> Starting -> Processing -> Completed
//!   \         \            \
//!    `---------`------------`----> Failed
//! ```
//!
//! Once a terminal phase is reached every mutator becomes a no-op.

use serde::Serialize;

use crate::phase_labels::{LABEL_COMPLETE, LABEL_STARTING, STAGE_LOADING};
use crate::types::Timestamp;

/// Coarse lifecycle of the local tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Starting,
    Processing,
    Completed,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }

    /// Whether moving from `self` to `next` respects the forward-only order.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, Starting)
                | (Idle, Failed)
                | (Starting, Processing)
                | (Starting, Failed)
                | (Processing, Completed)
                | (Processing, Failed)
        )
    }
}

/// Snapshot of what the tracker currently knows about a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingState {
    phase: Phase,
    progress_percent: u8,
    phase_label: String,
    error_message: Option<String>,
    poll_count: u32,
    notified: bool,
    started_at: Option<Timestamp>,
    finished_at: Option<Timestamp>,
}

impl Default for TrackingState {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            progress_percent: 0,
            phase_label: String::new(),
            error_message: None,
            poll_count: 0,
            notified: false,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Heuristic completion percentage, 0..=100.
    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn phase_label(&self) -> &str {
        &self.phase_label
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Number of status queries issued, including failed ones.
    pub fn poll_count(&self) -> u32 {
        self.poll_count
    }

    /// Set once, when a terminal phase is first reached.
    pub fn notified(&self) -> bool {
        self.notified
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<Timestamp> {
        self.finished_at
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// `Idle -> Starting`, right before the start request goes out.
    pub fn begin_launch(&mut self) -> bool {
        if !self.transition(Phase::Starting) {
            return false;
        }
        self.phase_label = LABEL_STARTING.to_string();
        self.started_at = Some(chrono::Utc::now());
        true
    }

    /// `Starting -> Processing`, once the backend accepted the job.
    pub fn mark_processing(&mut self) -> bool {
        if !self.transition(Phase::Processing) {
            return false;
        }
        self.progress_percent = 0;
        self.phase_label = STAGE_LOADING.to_string();
        true
    }

    /// Count one status query. Returns the new count, or `None` once
    /// the session is terminal.
    pub fn record_poll(&mut self) -> Option<u32> {
        if self.is_terminal() {
            return None;
        }
        self.poll_count = self.poll_count.saturating_add(1);
        Some(self.poll_count)
    }

    /// Update progress and label while processing.
    ///
    /// Progress never decreases and never exceeds 100.
    pub fn advance(&mut self, percent: u8, label: &str) -> bool {
        if self.phase != Phase::Processing {
            return false;
        }
        self.progress_percent = self.progress_percent.max(percent.min(100));
        self.phase_label = label.to_string();
        true
    }

    /// `Processing -> Completed`.
    ///
    /// Returns `true` only for the call that reached the terminal phase,
    /// which is also the call that sets [`notified`](Self::notified).
    pub fn complete(&mut self) -> bool {
        if !self.transition(Phase::Completed) {
            return false;
        }
        self.progress_percent = 100;
        self.phase_label = LABEL_COMPLETE.to_string();
        true
    }

    /// Move to `Failed` from any non-terminal phase.
    ///
    /// Returns `true` only for the call that reached the terminal phase.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.transition(Phase::Failed) {
            return false;
        }
        self.error_message = Some(message.into());
        true
    }

    fn transition(&mut self, next: Phase) -> bool {
        if !self.phase.can_transition_to(next) {
            tracing::warn!(
                from = ?self.phase,
                to = ?next,
                "Rejected tracking phase transition",
            );
            return false;
        }
        self.phase = next;
        if next.is_terminal() {
            self.notified = true;
            self.finished_at = Some(chrono::Utc::now());
        }
        true
    }
}
