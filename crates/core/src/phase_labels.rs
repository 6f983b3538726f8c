//! Human-readable phase labels shown while an analysis is tracked.
//!
//! The `STAGE_*` labels follow the fixed stage order of the backend
//! analysis pipeline and are chosen by
//! `autoinsight_tracker::inference::infer_phase`.

/// Start request sent, backend has not yet accepted it.
pub const LABEL_STARTING: &str = "Starting analysis...";

/// Dataset summary not yet available.
pub const STAGE_LOADING: &str = "Loading and validating data...";

/// Per-column statistics not yet available.
pub const STAGE_COLUMNS: &str = "Analyzing columns and statistics...";

/// Correlation matrix not yet available.
pub const STAGE_CORRELATIONS: &str = "Calculating correlations...";

/// Outlier detection not yet available.
pub const STAGE_OUTLIERS: &str = "Detecting outliers...";

/// Charts not yet rendered.
pub const STAGE_VISUALIZATIONS: &str = "Generating visualizations...";

/// LLM narrative not yet generated.
pub const STAGE_INSIGHTS: &str = "AI generating insights...";

/// Every partial result is present; only the report remains.
pub const STAGE_REPORT: &str = "Creating final report...";

/// Backend reported the analysis as completed.
pub const LABEL_COMPLETE: &str = "Analysis complete!";

/// Backend reported a failure but supplied no error text.
pub const MSG_ANALYSIS_FAILED: &str = "Analysis failed";

/// The start request failed without a backend-supplied detail.
pub const MSG_LAUNCH_FAILED: &str = "Failed to start analysis";

/// No terminal status was observed within the attempt budget.
pub const MSG_TIMED_OUT: &str = "Analysis timed out";

/// Too many consecutive transient query errors (classifying policy only).
pub const MSG_UNREACHABLE: &str = "Analysis service unreachable";
