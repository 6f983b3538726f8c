/// Errors surfaced by an [`AnalysisBackend`](crate::backend::AnalysisBackend)
/// call, independent of the transport used to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response (connect, DNS, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status code.
    #[error("Backend error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        status: u16,
        /// Human-readable `detail` field of the error body, when present.
        detail: Option<String>,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Backend-supplied error detail, if the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Whether a later identical request could reasonably succeed.
    ///
    /// Transport failures, request timeouts (408), throttling (429) and
    /// server-side errors (5xx) are transient. Other client errors and
    /// undecodable bodies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => matches!(status, 408 | 429 | 500..=599),
            Self::Decode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_only_from_api_errors() {
        let err = BackendError::Api {
            status: 400,
            detail: Some("File not found".into()),
        };
        assert_eq!(err.detail(), Some("File not found"));
        assert_eq!(BackendError::Transport("refused".into()).detail(), None);
    }

    #[test]
    fn display_without_detail() {
        let err = BackendError::Api {
            status: 502,
            detail: None,
        };
        assert_eq!(err.to_string(), "Backend error (502): no detail");
    }

    #[test]
    fn transient_classification() {
        assert!(BackendError::Transport("reset".into()).is_transient());
        for status in [408, 429, 500, 503] {
            let err = BackendError::Api { status, detail: None };
            assert!(err.is_transient(), "{status} should be transient");
        }
        for status in [400, 404, 422] {
            let err = BackendError::Api { status, detail: None };
            assert!(!err.is_transient(), "{status} should be fatal");
        }
        assert!(!BackendError::Decode("eof".into()).is_transient());
    }
}
