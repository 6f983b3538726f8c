//! Options sent to the backend when an analysis is started.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Correlation coefficient computed between numeric columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
}

/// Output format of the generated report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    Html,
}

/// Fixed set of options for one analysis run.
///
/// Built once before launch and only ever passed by shared reference;
/// the tracker never changes it after the start request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    pub perform_clustering: bool,
    pub correlation_method: CorrelationMethod,
    pub generate_report: bool,
    pub report_format: ReportFormat,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            perform_clustering: true,
            correlation_method: CorrelationMethod::default(),
            generate_report: true,
            report_format: ReportFormat::default(),
        }
    }
}

/// Returned when a textual option does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for CorrelationMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pearson" => Ok(Self::Pearson),
            "spearman" => Ok(Self::Spearman),
            "kendall" => Ok(Self::Kendall),
            _ => Err(UnknownVariant {
                kind: "correlation method",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "html" => Ok(Self::Html),
            _ => Err(UnknownVariant {
                kind: "report format",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
            Self::Kendall => "kendall",
        })
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
        })
    }
}
