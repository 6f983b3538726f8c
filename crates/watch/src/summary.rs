//! Condensed view of a finished analysis for log output.

use std::fmt;

use autoinsight_core::snapshot::StatusSnapshot;

/// Insight section titles listed in the summary.
const MAX_SECTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSummary {
    pub rows: u64,
    pub columns: u64,
    pub profiled_columns: usize,
    pub high_correlations: usize,
    pub outlier_columns: usize,
    pub visualizations: usize,
    pub insight_sections: Vec<String>,
    pub report_url: Option<String>,
}

impl CompletionSummary {
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Self {
        let (rows, columns) = snapshot
            .dataset_info
            .as_ref()
            .map(|info| (info.rows, info.columns))
            .unwrap_or_default();

        Self {
            rows,
            columns,
            profiled_columns: snapshot.column_statistics.len(),
            high_correlations: snapshot
                .correlation
                .as_ref()
                .map_or(0, |c| c.high_correlations.len()),
            outlier_columns: snapshot
                .outliers
                .iter()
                .filter(|o| o.outlier_count > 0)
                .count(),
            visualizations: snapshot.visualizations.len(),
            insight_sections: snapshot
                .llm_insights
                .iter()
                .take(MAX_SECTIONS)
                .map(|i| i.section.clone())
                .collect(),
            report_url: snapshot.report_url.clone(),
        }
    }
}

impl fmt::Display for CompletionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows x {} columns, {} columns profiled, {} strong correlations, \
             {} columns with outliers, {} visualizations",
            self.rows,
            self.columns,
            self.profiled_columns,
            self.high_correlations,
            self.outlier_columns,
            self.visualizations,
        )?;
        if !self.insight_sections.is_empty() {
            write!(f, "; insights: {}", self.insight_sections.join(", "))?;
        }
        if let Some(url) = &self.report_url {
            write!(f, "; report: {url}")?;
        }
        Ok(())
    }
}
