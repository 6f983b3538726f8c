//! Seam between the tracker and whatever reaches the analysis backend.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::launch_config::LaunchConfig;
use crate::snapshot::StatusSnapshot;
use crate::types::AnalysisId;

/// The two backend calls the tracker needs.
///
/// `autoinsight_client::AnalysisApi` implements this over HTTP; tests
/// substitute scripted fakes.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Ask the backend to start analysing `id` with `config`.
    async fn start(&self, id: &AnalysisId, config: &LaunchConfig) -> Result<(), BackendError>;

    /// Fetch the current status of `id`.
    async fn status(&self, id: &AnalysisId) -> Result<StatusSnapshot, BackendError>;
}
