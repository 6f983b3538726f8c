//! Fixed-interval status polling for one analysis session.
//!
//! [`StatusPoller::start`] spawns a single Tokio task that owns the
//! session's [`TrackingState`] and its recurring timer. Each tick issues
//! one status query, folds the response into the state, and stops the
//! timer as soon as a terminal condition is reached. The returned
//! [`PollingHandle`] is the only way to observe or cancel the session.

use std::sync::Arc;
use std::time::Duration;

use autoinsight_core::backend::AnalysisBackend;
use autoinsight_core::error::BackendError;
use autoinsight_core::phase_labels::{MSG_ANALYSIS_FAILED, MSG_TIMED_OUT, MSG_UNREACHABLE};
use autoinsight_core::snapshot::{JobStatus, StatusSnapshot};
use autoinsight_core::tracking::{Phase, TrackingState};
use autoinsight_core::types::AnalysisId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::inference::{infer_phase, next_progress};
use crate::notifier::{CompletionNotifier, FailureKind, TrackingOutcome};

/// Default delay between status queries.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default attempt budget: about two minutes at the default interval.
const DEFAULT_MAX_ATTEMPTS: u32 = 120;

const DEFAULT_PROGRESS_STEP: u8 = 5;

/// Progress shown while processing never reaches 100 before completion.
const DEFAULT_PROGRESS_CAP: u8 = 95;

/// Pause between observing completion and notifying the caller.
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// What to do when a status query itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryErrorPolicy {
    /// Log and wait for the next tick. Failed queries still count
    /// toward `max_attempts`, so a dead backend ends as a timeout.
    #[default]
    Swallow,
    /// End the session on the first non-transient error, or after
    /// `unreachable_after` consecutive transient errors.
    Classify { unreachable_after: u32 },
}

/// Tunable parameters for a polling session.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay before the first query and between queries.
    pub interval: Duration,
    /// Hard cap on status queries, failed ones included.
    pub max_attempts: u32,
    /// Progress added per `processing` response.
    pub progress_step: u8,
    /// Upper bound for progress until the job completes.
    pub progress_cap: u8,
    /// Delay between completion and the terminal callback.
    pub settle_delay: Duration,
    pub error_policy: QueryErrorPolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            progress_step: DEFAULT_PROGRESS_STEP,
            progress_cap: DEFAULT_PROGRESS_CAP,
            settle_delay: DEFAULT_SETTLE_DELAY,
            error_policy: QueryErrorPolicy::default(),
        }
    }
}

/// Callback invoked with the updated state after each `processing` tick.
pub type TickCallback = Box<dyn FnMut(&TrackingState) + Send + 'static>;

/// Starts polling sessions against one backend.
#[derive(Clone)]
pub struct StatusPoller {
    backend: Arc<dyn AnalysisBackend>,
    config: PollerConfig,
}

impl StatusPoller {
    pub fn new(backend: Arc<dyn AnalysisBackend>, config: PollerConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Spawn the polling task for `id`.
    ///
    /// `state` is normally the `Processing` state left by
    /// [`launch`](crate::launcher::launch). A job started elsewhere may
    /// be tracked from a fresh `Idle` state. A state that is already
    /// terminal is returned unchanged without any query or callback.
    ///
    /// `on_tick` runs on the polling task, in poll order, and never
    /// after `on_terminal`. `on_terminal` runs at most once.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<T, F>(
        &self,
        id: AnalysisId,
        state: TrackingState,
        on_tick: T,
        on_terminal: F,
    ) -> PollingHandle
    where
        T: FnMut(&TrackingState) + Send + 'static,
        F: FnOnce(TrackingOutcome) + Send + 'static,
    {
        let (state_tx, state_rx) = watch::channel(state.clone());
        let cancel = CancellationToken::new();

        let session = PollSession {
            backend: Arc::clone(&self.backend),
            id: id.clone(),
            config: self.config.clone(),
            state,
            state_tx,
            on_tick: Box::new(on_tick),
            notifier: CompletionNotifier::new(on_terminal),
            consecutive_errors: 0,
        };

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move { session.run(task_cancel).await });

        PollingHandle {
            id,
            cancel: cancel.clone(),
            state: state_rx,
            task,
            guard: cancel.drop_guard(),
        }
    }
}

/// Owned handle to a running polling session.
///
/// Dropping the handle cancels the session. Use [`detach`](Self::detach)
/// to let it run to completion unobserved.
pub struct PollingHandle {
    id: AnalysisId,
    cancel: CancellationToken,
    state: watch::Receiver<TrackingState>,
    task: JoinHandle<TrackingState>,
    guard: DropGuard,
}

impl PollingHandle {
    pub fn analysis_id(&self) -> &AnalysisId {
        &self.id
    }

    /// Stop polling now. No callback fires afterwards, including a
    /// completion still waiting out its settle delay. Idempotent, and a
    /// no-op once the session has ended on its own.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!(analysis_id = %self.id, "Cancelling analysis tracking");
            self.cancel.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the polling task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Latest published state.
    pub fn state(&self) -> TrackingState {
        self.state.borrow().clone()
    }

    /// A receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<TrackingState> {
        self.state.clone()
    }

    /// Wait for the session to end and return its final state.
    ///
    /// After a cancellation this is the state as of the last completed
    /// tick.
    pub async fn wait(self) -> TrackingState {
        let PollingHandle {
            id,
            state,
            task,
            guard,
            ..
        } = self;

        let final_state = match task.await {
            Ok(final_state) => final_state,
            Err(e) => {
                tracing::error!(analysis_id = %id, error = %e, "Polling task aborted");
                state.borrow().clone()
            }
        };
        drop(guard);
        final_state
    }

    /// Let the session run without this handle. Returns the task handle
    /// and the token that still cancels it.
    pub fn detach(self) -> (JoinHandle<TrackingState>, CancellationToken) {
        let cancel = self.guard.disarm();
        (self.task, cancel)
    }
}

impl std::fmt::Debug for PollingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingHandle")
            .field("analysis_id", &self.id)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

/// Control flow after one tick.
enum TickFlow {
    Continue,
    /// Stop without notifying (cancelled mid-tick).
    Stop,
    /// Terminal condition reached; notify after `settle`.
    Finish {
        outcome: TrackingOutcome,
        settle: Duration,
    },
}

/// State owned by the polling task.
struct PollSession {
    backend: Arc<dyn AnalysisBackend>,
    id: AnalysisId,
    config: PollerConfig,
    state: TrackingState,
    state_tx: watch::Sender<TrackingState>,
    on_tick: TickCallback,
    notifier: CompletionNotifier,
    consecutive_errors: u32,
}

impl PollSession {
    async fn run(mut self, cancel: CancellationToken) -> TrackingState {
        if self.state.is_terminal() {
            tracing::debug!(analysis_id = %self.id, "Session already terminal, not polling");
            return self.state;
        }
        self.ensure_processing();

        tracing::info!(
            analysis_id = %self.id,
            interval_ms = self.config.interval.as_millis() as u64,
            max_attempts = self.config.max_attempts,
            "Status polling started",
        );

        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.config.interval, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let (outcome, settle) = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(analysis_id = %self.id, poll_count = self.state.poll_count(), "Status polling cancelled");
                    return self.state;
                }
                _ = ticker.tick() => {
                    match self.tick(&cancel).await {
                        TickFlow::Continue => {}
                        TickFlow::Stop => return self.state,
                        TickFlow::Finish { outcome, settle } => break (outcome, settle),
                    }
                }
            }
        };
        drop(ticker);

        if !settle.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(analysis_id = %self.id, "Cancelled during settle delay, not notifying");
                    return self.state;
                }
                _ = tokio::time::sleep(settle) => {}
            }
        }

        self.notifier.notify(outcome);
        self.state
    }

    /// Bring a not-yet-launched state up to `Processing`.
    fn ensure_processing(&mut self) {
        if self.state.phase() == Phase::Processing {
            return;
        }
        if self.state.phase() == Phase::Idle {
            self.state.begin_launch();
        }
        tracing::debug!(analysis_id = %self.id, "Tracking a job launched elsewhere");
        self.state.mark_processing();
        self.publish();
    }

    async fn tick(&mut self, cancel: &CancellationToken) -> TickFlow {
        let Some(attempt) = self.state.record_poll() else {
            return TickFlow::Stop;
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return TickFlow::Stop,
            result = self.backend.status(&self.id) => result,
        };

        let flow = match result {
            Ok(snapshot) => {
                self.consecutive_errors = 0;
                self.apply_snapshot(snapshot, attempt, cancel)
            }
            Err(e) => self.handle_query_error(e, attempt),
        };

        match flow {
            TickFlow::Continue if attempt >= self.config.max_attempts => {
                tracing::warn!(
                    analysis_id = %self.id,
                    poll_count = attempt,
                    "No terminal status within attempt budget",
                );
                self.finish_failed(FailureKind::TimedOut, MSG_TIMED_OUT.to_string(), None)
            }
            TickFlow::Continue => {
                self.publish();
                TickFlow::Continue
            }
            other => other,
        }
    }

    fn apply_snapshot(
        &mut self,
        snapshot: StatusSnapshot,
        attempt: u32,
        cancel: &CancellationToken,
    ) -> TickFlow {
        match snapshot.status {
            JobStatus::Processing => {
                let percent = next_progress(
                    self.state.progress_percent(),
                    self.config.progress_step,
                    self.config.progress_cap,
                );
                let label = infer_phase(&snapshot);
                self.state.advance(percent, label);

                tracing::debug!(
                    analysis_id = %self.id,
                    poll_count = attempt,
                    progress = self.state.progress_percent(),
                    phase = label,
                    "Analysis in progress",
                );

                if cancel.is_cancelled() {
                    return TickFlow::Stop;
                }
                (self.on_tick)(&self.state);
                TickFlow::Continue
            }
            JobStatus::Completed => {
                if !self.state.complete() {
                    return TickFlow::Stop;
                }
                self.publish();
                tracing::info!(analysis_id = %self.id, poll_count = attempt, "Analysis completed");
                TickFlow::Finish {
                    outcome: TrackingOutcome::Completed(Box::new(snapshot)),
                    settle: self.config.settle_delay,
                }
            }
            JobStatus::Failed => {
                let message = snapshot
                    .error
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(MSG_ANALYSIS_FAILED)
                    .to_string();
                tracing::warn!(analysis_id = %self.id, error = %message, "Backend reported analysis failure");
                self.finish_failed(FailureKind::JobFailed, message, Some(Box::new(snapshot)))
            }
        }
    }

    fn handle_query_error(&mut self, error: BackendError, attempt: u32) -> TickFlow {
        match self.config.error_policy {
            QueryErrorPolicy::Swallow => {
                tracing::warn!(
                    analysis_id = %self.id,
                    poll_count = attempt,
                    error = %error,
                    "Status query failed, retrying on next tick",
                );
                TickFlow::Continue
            }
            QueryErrorPolicy::Classify { unreachable_after } => {
                if !error.is_transient() {
                    tracing::error!(analysis_id = %self.id, error = %error, "Status query rejected");
                    let message = error
                        .detail()
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string());
                    return self.finish_failed(FailureKind::QueryRejected, message, None);
                }

                self.consecutive_errors += 1;
                tracing::warn!(
                    analysis_id = %self.id,
                    poll_count = attempt,
                    consecutive_errors = self.consecutive_errors,
                    error = %error,
                    "Status query failed",
                );
                if self.consecutive_errors >= unreachable_after {
                    return self.finish_failed(
                        FailureKind::Unreachable,
                        MSG_UNREACHABLE.to_string(),
                        None,
                    );
                }
                TickFlow::Continue
            }
        }
    }

    fn finish_failed(
        &mut self,
        kind: FailureKind,
        message: String,
        snapshot: Option<Box<StatusSnapshot>>,
    ) -> TickFlow {
        if !self.state.fail(message.clone()) {
            return TickFlow::Stop;
        }
        self.publish();
        tracing::info!(analysis_id = %self.id, ?kind, error = %message, "Analysis tracking failed");
        TickFlow::Finish {
            outcome: TrackingOutcome::Failed {
                kind,
                message,
                snapshot,
            },
            settle: Duration::ZERO,
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}
