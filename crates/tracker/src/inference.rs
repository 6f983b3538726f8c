//! Progress inference from partial status payloads.
//!
//! The backend reports no explicit stage, so the stage is guessed from
//! which result sections are already populated. The checks follow the
//! pipeline's stage order; this only stays monotonic while the backend
//! fills sections in that order and never clears one.

use autoinsight_core::phase_labels::{
    STAGE_COLUMNS, STAGE_CORRELATIONS, STAGE_INSIGHTS, STAGE_LOADING, STAGE_OUTLIERS,
    STAGE_REPORT, STAGE_VISUALIZATIONS,
};
use autoinsight_core::snapshot::StatusSnapshot;

/// Label of the first pipeline stage whose results are still missing.
pub fn infer_phase(snapshot: &StatusSnapshot) -> &'static str {
    if snapshot.dataset_info.is_none() {
        STAGE_LOADING
    } else if snapshot.column_statistics.is_empty() {
        STAGE_COLUMNS
    } else if snapshot.correlation.is_none() {
        STAGE_CORRELATIONS
    } else if snapshot.outliers.is_empty() {
        STAGE_OUTLIERS
    } else if snapshot.visualizations.is_empty() {
        STAGE_VISUALIZATIONS
    } else if snapshot.llm_insights.is_empty() {
        STAGE_INSIGHTS
    } else {
        STAGE_REPORT
    }
}

/// Next value of the progress animation: `current + step`, held at `cap`.
///
/// A `current` already above `cap` is kept as-is.
pub fn next_progress(current: u8, step: u8, cap: u8) -> u8 {
    current.max(current.saturating_add(step).min(cap))
}
