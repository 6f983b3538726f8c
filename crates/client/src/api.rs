//! REST API client for the analysis endpoints.
//!
//! Wraps the backend HTTP API (analysis start and status retrieval)
//! using [`reqwest`].

use async_trait::async_trait;
use autoinsight_core::backend::AnalysisBackend;
use autoinsight_core::error::BackendError;
use autoinsight_core::launch_config::LaunchConfig;
use autoinsight_core::snapshot::StatusSnapshot;
use autoinsight_core::types::AnalysisId;

/// Path prefix of every versioned backend route.
const API_PREFIX: &str = "/api/v1";

/// HTTP client for a single analysis backend.
#[derive(Debug, Clone)]
pub struct AnalysisApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Analysis API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl AnalysisApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:8000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for custom timeouts or connection pooling).
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    /// Base HTTP URL this client talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Start the analysis pipeline for an uploaded dataset.
    ///
    /// Sends `POST /api/v1/analyze/{id}` with the launch options as the
    /// JSON body. The response body is ignored.
    pub async fn start_analysis(
        &self,
        id: &AnalysisId,
        config: &LaunchConfig,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!("{}{API_PREFIX}/analyze/{id}", self.api_url))
            .json(config)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Retrieve the current status and partial results of an analysis.
    ///
    /// Sends `GET /api/v1/analysis/{id}`.
    pub async fn get_status(&self, id: &AnalysisId) -> Result<StatusSnapshot, ApiError> {
        let response = self
            .client
            .get(format!("{}{API_PREFIX}/analysis/{id}", self.api_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisApi {
    async fn start(&self, id: &AnalysisId, config: &LaunchConfig) -> Result<(), BackendError> {
        Ok(self.start_analysis(id, config).await?)
    }

    async fn status(&self, id: &AnalysisId) -> Result<StatusSnapshot, BackendError> {
        Ok(self.get_status(id).await?)
    }
}

impl From<ApiError> for BackendError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Request(e) if e.is_decode() => BackendError::Decode(e.to_string()),
            ApiError::Request(e) => BackendError::Transport(e.to_string()),
            ApiError::ApiError { status, body } => BackendError::Api {
                status,
                detail: detail_from_body(&body),
            },
        }
    }
}

/// Extract the `detail` field of a JSON error body.
///
/// String details are returned as-is; structured ones (validation
/// error lists) are returned as their JSON text.
fn detail_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_from_string_body() {
        assert_eq!(
            detail_from_body(r#"{"detail":"File not found"}"#).as_deref(),
            Some("File not found")
        );
    }

    #[test]
    fn detail_from_structured_body() {
        let detail = detail_from_body(r#"{"detail":[{"loc":["body"],"msg":"field required"}]}"#);
        assert!(detail.unwrap().contains("field required"));
    }

    #[test]
    fn detail_missing_or_blank() {
        assert_eq!(detail_from_body("Internal Server Error"), None);
        assert_eq!(detail_from_body(r#"{"error":"x"}"#), None);
        assert_eq!(detail_from_body(r#"{"detail":"  "}"#), None);
        assert_eq!(detail_from_body(r#"{"detail":null}"#), None);
    }

    #[test]
    fn api_url_trailing_slash_trimmed() {
        let api = AnalysisApi::new("http://localhost:8000/");
        assert_eq!(api.api_url(), "http://localhost:8000");
    }

    #[test]
    fn api_error_converts_with_detail() {
        let err = ApiError::ApiError {
            status: 404,
            body: r#"{"detail":"Analysis not found"}"#.into(),
        };
        assert_eq!(
            BackendError::from(err),
            BackendError::Api {
                status: 404,
                detail: Some("Analysis not found".into()),
            }
        );
    }
}
