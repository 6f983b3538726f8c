//! `autoinsight-watch` -- start an analysis and follow it to the end.
//!
//! Starts the analysis job on the AutoInsight backend (or attaches to a
//! running one), polls its status, logs inferred progress, and prints a
//! result summary once the job finishes. Ctrl-C stops tracking.
//!
//! # Usage
//!
//! ```text
//! autoinsight-watch [ANALYSIS_ID]
//! ```
//!
//! See [`WatchConfig::from_env`] for the environment variables.
//!
//! # Exit status
//!
//! `0` on completion, `1` on launch, job, or configuration failure,
//! `130` when interrupted.

use std::process::ExitCode;
use std::sync::Arc;

use autoinsight_client::AnalysisApi;
use autoinsight_core::tracking::TrackingState;
use autoinsight_tracker::{AnalysisTracker, TrackingOutcome};
use autoinsight_watch::config::{LogFormat, WatchConfig};
use autoinsight_watch::session::{wait_for_end, SessionEnd};
use autoinsight_watch::summary::CompletionSummary;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = WatchConfig::from_env(std::env::args().nth(1));
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or_default());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let http = match reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
    {
        Ok(http) => http,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        api_url = %config.api_url,
        analysis_id = %config.analysis_id,
        resume = config.resume,
        interval_ms = config.poller.interval.as_millis() as u64,
        max_attempts = config.poller.max_attempts,
        "Starting autoinsight-watch",
    );

    let api = Arc::new(AnalysisApi::with_client(http, config.api_url.clone()));
    let tracker = AnalysisTracker::with_config(api, config.poller.clone());

    let on_tick = |state: &TrackingState| {
        tracing::info!(
            progress = state.progress_percent(),
            phase = state.phase_label(),
            "Analysis in progress",
        );
    };
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let on_terminal = move |outcome: TrackingOutcome| {
        let _ = outcome_tx.send(outcome);
    };

    let handle = if config.resume {
        tracker.resume(config.analysis_id.clone(), on_tick, on_terminal)
    } else {
        match tracker
            .track(config.analysis_id.clone(), &config.launch, on_tick, on_terminal)
            .await
        {
            Ok(handle) => handle,
            Err(failure) => {
                tracing::error!(
                    analysis_id = %config.analysis_id,
                    error = %failure,
                    message = failure.state.error_message().unwrap_or_default(),
                    "Analysis could not be started",
                );
                return ExitCode::FAILURE;
            }
        }
    };

    let end = wait_for_end(tokio::signal::ctrl_c(), outcome_rx).await;
    if matches!(end, SessionEnd::Interrupted) {
        tracing::warn!("Interrupted, stopping tracking");
        handle.cancel();
    }
    let final_state = handle.wait().await;
    let status = ExitCode::from(end.exit_status());

    match end {
        SessionEnd::Finished(TrackingOutcome::Completed(snapshot)) => {
            let summary = CompletionSummary::from_snapshot(&snapshot);
            tracing::info!(
                analysis_id = %config.analysis_id,
                poll_count = final_state.poll_count(),
                "Analysis complete: {summary}",
            );
        }
        SessionEnd::Finished(TrackingOutcome::Failed { kind, message, .. }) => {
            tracing::error!(
                analysis_id = %config.analysis_id,
                ?kind,
                poll_count = final_state.poll_count(),
                error = %message,
                "Analysis failed",
            );
        }
        SessionEnd::Abandoned => {
            tracing::error!(
                analysis_id = %config.analysis_id,
                phase = ?final_state.phase(),
                progress = final_state.progress_percent(),
                "Tracking ended without an outcome",
            );
        }
        SessionEnd::Interrupted => {
            tracing::warn!(
                analysis_id = %config.analysis_id,
                phase = ?final_state.phase(),
                progress = final_state.progress_percent(),
                "Tracking stopped before the analysis finished",
            );
        }
    }
    status
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "autoinsight_watch=info,autoinsight_tracker=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}
