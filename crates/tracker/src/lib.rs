//! Progress tracking for remote analysis jobs.
//!
//! Starts a job through an
//! [`AnalysisBackend`](autoinsight_core::backend::AnalysisBackend), polls
//! its status on a fixed interval, infers a phase label and heuristic
//! progress from the partial results, and reports the terminal outcome
//! exactly once.

pub mod inference;
pub mod launcher;
pub mod notifier;
pub mod poller;
pub mod tracker;

pub use launcher::{launch, LaunchError};
pub use notifier::{FailureKind, TrackingOutcome};
pub use poller::{PollerConfig, PollingHandle, QueryErrorPolicy, StatusPoller};
pub use tracker::{AnalysisTracker, LaunchFailure};
