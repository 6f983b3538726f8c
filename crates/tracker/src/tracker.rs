//! Launch-then-poll entry point.

use std::sync::Arc;

use autoinsight_core::backend::AnalysisBackend;
use autoinsight_core::launch_config::LaunchConfig;
use autoinsight_core::tracking::TrackingState;
use autoinsight_core::types::AnalysisId;

use crate::launcher::{launch, LaunchError};
use crate::notifier::TrackingOutcome;
use crate::poller::{PollerConfig, PollingHandle, StatusPoller};

/// A launch that never reached polling, with the resulting `Failed` state.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct LaunchFailure {
    #[source]
    pub error: LaunchError,
    pub state: TrackingState,
}

/// Tracks analysis jobs on one backend: starts each job, then polls it.
#[derive(Clone)]
pub struct AnalysisTracker {
    backend: Arc<dyn AnalysisBackend>,
    poller: StatusPoller,
}

impl AnalysisTracker {
    /// Tracker with the default polling parameters.
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self::with_config(backend, PollerConfig::default())
    }

    pub fn with_config(backend: Arc<dyn AnalysisBackend>, config: PollerConfig) -> Self {
        let poller = StatusPoller::new(Arc::clone(&backend), config);
        Self { backend, poller }
    }

    /// Start the job and begin polling it.
    ///
    /// Returns the polling handle once the backend accepted the job. A
    /// rejected start never polls and never calls either callback.
    pub async fn track<T, F>(
        &self,
        id: AnalysisId,
        config: &LaunchConfig,
        on_tick: T,
        on_terminal: F,
    ) -> Result<PollingHandle, LaunchFailure>
    where
        T: FnMut(&TrackingState) + Send + 'static,
        F: FnOnce(TrackingOutcome) + Send + 'static,
    {
        let mut state = TrackingState::new();
        if let Err(error) = launch(self.backend.as_ref(), &id, config, &mut state).await {
            return Err(LaunchFailure { error, state });
        }
        Ok(self.poller.start(id, state, on_tick, on_terminal))
    }

    /// Poll a job that was started elsewhere.
    pub fn resume<T, F>(&self, id: AnalysisId, on_tick: T, on_terminal: F) -> PollingHandle
    where
        T: FnMut(&TrackingState) + Send + 'static,
        F: FnOnce(TrackingOutcome) + Send + 'static,
    {
        self.poller
            .start(id, TrackingState::new(), on_tick, on_terminal)
    }
}
