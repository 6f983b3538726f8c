//! End-to-end tests for [`AnalysisTracker`]: launch followed by polling.

mod common;

use assert_matches::assert_matches;
use autoinsight_core::error::BackendError;
use autoinsight_core::launch_config::LaunchConfig;
use autoinsight_core::tracking::Phase;
use autoinsight_core::types::AnalysisId;
use autoinsight_tracker::{AnalysisTracker, LaunchError, TrackingOutcome};

use common::{completed, processing, processing_through, Recorder, ScriptedBackend};

#[tokio::test(start_paused = true)]
async fn track_launches_then_polls_to_completion() {
    let backend = ScriptedBackend::new(completed())
        .then(processing())
        .then(processing_through(3))
        .into_arc();
    let recorder = Recorder::new();
    let tracker = AnalysisTracker::new(backend.clone());

    let handle = tracker
        .track(
            AnalysisId::new("job-1"),
            &LaunchConfig::default(),
            recorder.on_tick(),
            recorder.on_terminal(),
        )
        .await
        .expect("launch should succeed");
    assert_eq!(handle.state().phase(), Phase::Processing);

    let final_state = handle.wait().await;

    assert_eq!(backend.start_calls(), 1);
    assert_eq!(backend.status_calls(), 3);
    assert_eq!(final_state.phase(), Phase::Completed);
    assert!(final_state.started_at().is_some());
    assert!(final_state.finished_at().is_some());
    assert_eq!(recorder.progress_values(), vec![5, 10]);
    assert_eq!(
        recorder.labels(),
        vec!["Loading and validating data...", "Detecting outliers..."]
    );
    assert!(recorder.outcome().unwrap().1.is_completed());
}

#[tokio::test(start_paused = true)]
async fn rejected_launch_never_polls() {
    let backend = ScriptedBackend::new(processing())
        .rejecting_start(BackendError::Api {
            status: 400,
            detail: Some("Dataset has no numeric columns".into()),
        })
        .into_arc();
    let recorder = Recorder::new();
    let tracker = AnalysisTracker::new(backend.clone());

    let failure = tracker
        .track(
            AnalysisId::new("job-1"),
            &LaunchConfig::default(),
            recorder.on_tick(),
            recorder.on_terminal(),
        )
        .await
        .unwrap_err();

    assert_matches!(failure.error, LaunchError::Rejected(_));
    assert_eq!(failure.state.phase(), Phase::Failed);
    assert_eq!(
        failure.state.error_message(),
        Some("Dataset has no numeric columns")
    );

    tokio::time::sleep(std::time::Duration::from_secs(10)).await;
    assert_eq!(backend.status_calls(), 0);
    assert_eq!(recorder.tick_count(), 0);
    assert_eq!(recorder.outcome_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn resume_tracks_job_started_elsewhere() {
    let backend = ScriptedBackend::new(completed()).into_arc();
    let recorder = Recorder::new();
    let tracker = AnalysisTracker::new(backend.clone());

    let handle = tracker.resume(
        AnalysisId::new("job-1"),
        recorder.on_tick(),
        recorder.on_terminal(),
    );
    assert_eq!(handle.analysis_id().as_str(), "job-1");
    let final_state = handle.wait().await;

    assert_eq!(backend.start_calls(), 0);
    assert_eq!(final_state.phase(), Phase::Completed);
    assert_matches!(recorder.outcome().unwrap().1, TrackingOutcome::Completed(_));
}
