//! HTTP client for the AutoInsight analysis backend.
//!
//! [`api::AnalysisApi`] wraps the start and status endpoints with
//! [`reqwest`] and implements
//! [`AnalysisBackend`](autoinsight_core::backend::AnalysisBackend) so the
//! tracker can poll through it.

pub mod api;

pub use api::{AnalysisApi, ApiError};
