//! One-shot analysis start request.

use autoinsight_core::backend::AnalysisBackend;
use autoinsight_core::error::BackendError;
use autoinsight_core::launch_config::LaunchConfig;
use autoinsight_core::phase_labels::MSG_LAUNCH_FAILED;
use autoinsight_core::tracking::{Phase, TrackingState};
use autoinsight_core::types::AnalysisId;

/// Errors returned by [`launch`].
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The start request failed. Fatal for the session; never retried.
    #[error("Failed to start analysis: {0}")]
    Rejected(#[from] BackendError),

    /// The session already left `Idle`; no request was sent.
    #[error("Analysis already launched (phase {0:?})")]
    AlreadyLaunched(Phase),
}

impl LaunchError {
    /// Text recorded as the session's error message.
    pub fn message(&self) -> &str {
        match self {
            LaunchError::Rejected(e) => e.detail().unwrap_or(MSG_LAUNCH_FAILED),
            LaunchError::AlreadyLaunched(_) => MSG_LAUNCH_FAILED,
        }
    }
}

/// Send the start request for `id` and move `state` along.
///
/// On success `state` is `Processing` and the caller should start
/// polling. On failure `state` is `Failed` with the backend's error
/// detail (or a generic message) and polling must not start.
pub async fn launch(
    backend: &dyn AnalysisBackend,
    id: &AnalysisId,
    config: &LaunchConfig,
    state: &mut TrackingState,
) -> Result<(), LaunchError> {
    if state.phase() != Phase::Idle {
        return Err(LaunchError::AlreadyLaunched(state.phase()));
    }
    state.begin_launch();

    tracing::info!(
        analysis_id = %id,
        correlation_method = %config.correlation_method,
        report_format = %config.report_format,
        "Starting analysis",
    );

    match backend.start(id, config).await {
        Ok(()) => {
            state.mark_processing();
            tracing::info!(analysis_id = %id, "Analysis accepted by backend");
            Ok(())
        }
        Err(e) => {
            let err = LaunchError::Rejected(e);
            tracing::error!(analysis_id = %id, error = %err, "Failed to start analysis");
            state.fail(err.message());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use autoinsight_core::phase_labels::STAGE_LOADING;
    use autoinsight_core::snapshot::StatusSnapshot;

    use super::*;

    struct StartOnly {
        result: Result<(), BackendError>,
        calls: AtomicUsize,
    }

    impl StartOnly {
        fn new(result: Result<(), BackendError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AnalysisBackend for StartOnly {
        async fn start(&self, _: &AnalysisId, _: &LaunchConfig) -> Result<(), BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }

        async fn status(&self, _: &AnalysisId) -> Result<StatusSnapshot, BackendError> {
            panic!("launcher must not query status");
        }
    }

    #[tokio::test]
    async fn success_moves_to_processing() {
        let backend = StartOnly::new(Ok(()));
        let mut state = TrackingState::new();

        launch(&backend, &"a1".into(), &LaunchConfig::default(), &mut state)
            .await
            .unwrap();

        assert_eq!(state.phase(), Phase::Processing);
        assert_eq!(state.phase_label(), STAGE_LOADING);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejection_uses_backend_detail() {
        let backend = StartOnly::new(Err(BackendError::Api {
            status: 400,
            detail: Some("Unsupported file type".into()),
        }));
        let mut state = TrackingState::new();

        let err = launch(&backend, &"a1".into(), &LaunchConfig::default(), &mut state)
            .await
            .unwrap_err();

        assert_matches!(err, LaunchError::Rejected(_));
        assert_eq!(state.phase(), Phase::Failed);
        assert_eq!(state.error_message(), Some("Unsupported file type"));
        assert!(state.notified());
    }

    #[tokio::test]
    async fn transport_failure_uses_generic_message() {
        let backend = StartOnly::new(Err(BackendError::Transport("connection refused".into())));
        let mut state = TrackingState::new();

        let result = launch(&backend, &"a1".into(), &LaunchConfig::default(), &mut state).await;

        assert!(result.is_err());
        assert_eq!(state.error_message(), Some("Failed to start analysis"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_launch_sends_nothing() {
        let backend = StartOnly::new(Ok(()));
        let mut state = TrackingState::new();
        let id: AnalysisId = "a1".into();

        launch(&backend, &id, &LaunchConfig::default(), &mut state)
            .await
            .unwrap();
        let err = launch(&backend, &id, &LaunchConfig::default(), &mut state)
            .await
            .unwrap_err();

        assert_matches!(err, LaunchError::AlreadyLaunched(Phase::Processing));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.phase(), Phase::Processing);
    }
}
