//! Shared fixtures for tracker integration tests.
//!
//! [`ScriptedBackend`] replays queued status responses and then repeats
//! a fallback forever. [`Recorder`] captures callback invocations with
//! their (paused) Tokio timestamps.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use autoinsight_core::backend::AnalysisBackend;
use autoinsight_core::error::BackendError;
use autoinsight_core::launch_config::LaunchConfig;
use autoinsight_core::snapshot::{
    ColumnStatistics, CorrelationSummary, DatasetInfo, JobStatus, LlmInsight, OutlierSummary,
    StatusSnapshot, Visualization,
};
use autoinsight_core::tracking::TrackingState;
use autoinsight_core::types::AnalysisId;
use autoinsight_tracker::TrackingOutcome;
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

pub type StatusResult = Result<StatusSnapshot, BackendError>;

pub struct ScriptedBackend {
    start_result: Result<(), BackendError>,
    responses: Mutex<VecDeque<StatusResult>>,
    fallback: StatusResult,
    start_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl ScriptedBackend {
    /// Backend answering every status query with `fallback` once the
    /// queued responses run out.
    pub fn new(fallback: StatusResult) -> Self {
        Self {
            start_result: Ok(()),
            responses: Mutex::new(VecDeque::new()),
            fallback,
            start_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn then(self, response: StatusResult) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn then_n(self, n: usize, response: StatusResult) -> Self {
        (0..n).fold(self, |backend, _| backend.then(response.clone()))
    }

    pub fn rejecting_start(mut self, error: BackendError) -> Self {
        self.start_result = Err(error);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn start(&self, _id: &AnalysisId, _config: &LaunchConfig) -> Result<(), BackendError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.start_result.clone()
    }

    async fn status(&self, _id: &AnalysisId) -> StatusResult {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

pub fn processing() -> StatusResult {
    Ok(StatusSnapshot::new(JobStatus::Processing))
}

/// A `processing` snapshot with the first `stages` result sections filled.
pub fn processing_through(stages: usize) -> StatusResult {
    let mut snapshot = StatusSnapshot::new(JobStatus::Processing);
    if stages >= 1 {
        snapshot.dataset_info = Some(DatasetInfo {
            rows: 500,
            columns: 8,
            memory_usage: Some("31.4 KB".into()),
        });
    }
    if stages >= 2 {
        snapshot.column_statistics.push(ColumnStatistics {
            name: "revenue".into(),
            dtype: "float64".into(),
            ..Default::default()
        });
    }
    if stages >= 3 {
        snapshot.correlation = Some(CorrelationSummary::default());
    }
    if stages >= 4 {
        snapshot.outliers.push(OutlierSummary {
            column: "revenue".into(),
            outlier_count: 4,
            outlier_percentage: 0.8,
        });
    }
    if stages >= 5 {
        snapshot.visualizations.push(Visualization {
            name: "Correlation heatmap".into(),
            kind: "png".into(),
            ..Default::default()
        });
    }
    if stages >= 6 {
        snapshot.llm_insights.push(LlmInsight {
            section: "Executive Summary".into(),
            content: "Revenue is seasonal.".into(),
            confidence: Some("high".into()),
        });
    }
    Ok(snapshot)
}

pub fn completed() -> StatusResult {
    let mut snapshot = processing_through(6)?;
    snapshot.status = JobStatus::Completed;
    snapshot.report_url = Some("/reports/job-1/report_job-1.pdf".into());
    Ok(snapshot)
}

pub fn failed(error: Option<&str>) -> StatusResult {
    let mut snapshot = StatusSnapshot::new(JobStatus::Failed);
    snapshot.error = error.map(str::to_string);
    Ok(snapshot)
}

pub fn transport_error() -> StatusResult {
    Err(BackendError::Transport("connection refused".into()))
}

// ---------------------------------------------------------------------------
// Callback recorder
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Recorder {
    ticks: Mutex<Vec<(Instant, TrackingState)>>,
    outcomes: Mutex<Vec<(Instant, TrackingOutcome)>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_tick(self: &Arc<Self>) -> impl FnMut(&TrackingState) + Send + 'static {
        let recorder = Arc::clone(self);
        move |state| {
            recorder
                .ticks
                .lock()
                .unwrap()
                .push((Instant::now(), state.clone()));
        }
    }

    pub fn on_terminal(self: &Arc<Self>) -> impl FnOnce(TrackingOutcome) + Send + 'static {
        let recorder = Arc::clone(self);
        move |outcome| {
            recorder
                .outcomes
                .lock()
                .unwrap()
                .push((Instant::now(), outcome));
        }
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.lock().unwrap().len()
    }

    pub fn progress_values(&self) -> Vec<u8> {
        self.ticks
            .lock()
            .unwrap()
            .iter()
            .map(|(_, state)| state.progress_percent())
            .collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.ticks
            .lock()
            .unwrap()
            .iter()
            .map(|(_, state)| state.phase_label().to_string())
            .collect()
    }

    pub fn last_tick_at(&self) -> Option<Instant> {
        self.ticks.lock().unwrap().last().map(|(at, _)| *at)
    }

    pub fn outcome_count(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }

    pub fn outcome(&self) -> Option<(Instant, TrackingOutcome)> {
        self.outcomes.lock().unwrap().first().cloned()
    }
}
