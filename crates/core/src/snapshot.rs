//! Status payload returned by the analysis backend.
//!
//! The backend fills in result sections as its pipeline advances, so a
//! snapshot taken mid-run is a partial result. Only the fields needed
//! for progress inference and for summarizing a finished run are typed;
//! everything else in the payload is ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Backend-reported lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

/// One polled status response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: JobStatus,
    #[serde(default)]
    pub dataset_info: Option<DatasetInfo>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub column_statistics: Vec<ColumnStatistics>,
    #[serde(default)]
    pub correlation: Option<CorrelationSummary>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub outliers: Vec<OutlierSummary>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub visualizations: Vec<Visualization>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub llm_insights: Vec<LlmInsight>,
    #[serde(default)]
    pub error: Option<String>,
    /// Download location of the generated report, once written.
    #[serde(default)]
    pub report_url: Option<String>,
}

impl StatusSnapshot {
    /// An empty snapshot with the given status.
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            dataset_info: None,
            column_statistics: Vec::new(),
            correlation: None,
            outliers: Vec::new(),
            visualizations: Vec::new(),
            llm_insights: Vec::new(),
            error: None,
            report_url: None,
        }
    }
}

/// Shape of the uploaded dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub rows: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub columns: u64,
    /// Pre-formatted size string, e.g. `"1.2 MB"`.
    #[serde(default, deserialize_with = "lenient")]
    pub memory_usage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub dtype: String,
    #[serde(default, deserialize_with = "lenient")]
    pub null_percentage: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub unique_count: u64,
    /// Type-dependent statistics (mean/std for numeric, mode for categorical).
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub high_correlations: Vec<HighCorrelation>,
}

/// A strongly correlated column pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighCorrelation {
    #[serde(default, deserialize_with = "lenient")]
    pub column1: String,
    #[serde(default, deserialize_with = "lenient")]
    pub column2: String,
    #[serde(default, deserialize_with = "lenient")]
    pub correlation: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub strength: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub column: String,
    #[serde(default, deserialize_with = "lenient")]
    pub outlier_count: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub outlier_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Visualization {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    /// Artifact type, `png` or `html`.
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub path: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmInsight {
    #[serde(default, deserialize_with = "lenient")]
    pub section: String,
    #[serde(default, deserialize_with = "lenient")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient")]
    pub confidence: Option<String>,
}

/// Decode a display-only field, falling back to its default (`null`
/// included) when the backend sends an unexpected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Treat an explicit JSON `null` sequence the same as a missing one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
