//! Shared domain types for tracking AutoInsight analysis jobs.
//!
//! Holds the wire schema of the analysis backend (launch options and
//! status snapshots), the local tracking state machine, and the
//! [`backend::AnalysisBackend`] seam that the tracker polls through.

pub mod backend;
pub mod error;
pub mod launch_config;
pub mod phase_labels;
pub mod snapshot;
pub mod tracking;
pub mod types;
