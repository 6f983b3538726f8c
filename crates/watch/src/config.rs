//! Command configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use autoinsight_core::launch_config::LaunchConfig;
use autoinsight_core::types::AnalysisId;
use autoinsight_tracker::{PollerConfig, QueryErrorPolicy};

/// Log output format for the subscriber installed by `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required (set it or pass the analysis id as the first argument)")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for one tracking run.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Base URL of the analysis backend.
    pub api_url: String,
    pub analysis_id: AnalysisId,
    /// Poll a job that is already running instead of starting it.
    pub resume: bool,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    pub poller: PollerConfig,
    pub launch: LaunchConfig,
    pub log_format: LogFormat,
}

impl WatchConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `ANALYSIS_API_URL`     | `http://localhost:8000` |
    /// | `ANALYSIS_ID`          | -- (or first argument)  |
    /// | `ANALYSIS_RESUME`      | `false`                 |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `POLL_INTERVAL_MS`     | `1000`                  |
    /// | `POLL_MAX_ATTEMPTS`    | `120`                   |
    /// | `SETTLE_DELAY_MS`      | `1000`                  |
    /// | `UNREACHABLE_AFTER`    | unset (errors swallowed)|
    /// | `PERFORM_CLUSTERING`   | `true`                  |
    /// | `CORRELATION_METHOD`   | `pearson`               |
    /// | `GENERATE_REPORT`      | `true`                  |
    /// | `REPORT_FORMAT`        | `pdf`                   |
    /// | `LOG_FORMAT`           | `text`                  |
    pub fn from_env(analysis_id_arg: Option<String>) -> Result<Self, ConfigError> {
        Self::from_source(analysis_id_arg, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable lookup.
    pub fn from_source<F>(analysis_id_arg: Option<String>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = var("ANALYSIS_API_URL").unwrap_or_else(|| "http://localhost:8000".into());

        let analysis_id = analysis_id_arg
            .filter(|v| !v.trim().is_empty())
            .or_else(|| var("ANALYSIS_ID"))
            .map(AnalysisId::new)
            .ok_or(ConfigError::Missing("ANALYSIS_ID"))?;

        let defaults = PollerConfig::default();
        let error_policy = match parse_opt::<u32>("UNREACHABLE_AFTER", var("UNREACHABLE_AFTER"))? {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    var: "UNREACHABLE_AFTER",
                    value: "0".into(),
                    reason: "must be at least 1".into(),
                })
            }
            Some(unreachable_after) => QueryErrorPolicy::Classify { unreachable_after },
            None => QueryErrorPolicy::Swallow,
        };
        let poller = PollerConfig {
            interval: parse_opt("POLL_INTERVAL_MS", var("POLL_INTERVAL_MS"))?
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),
            max_attempts: parse_opt("POLL_MAX_ATTEMPTS", var("POLL_MAX_ATTEMPTS"))?
                .unwrap_or(defaults.max_attempts),
            settle_delay: parse_opt("SETTLE_DELAY_MS", var("SETTLE_DELAY_MS"))?
                .map(Duration::from_millis)
                .unwrap_or(defaults.settle_delay),
            error_policy,
            ..defaults
        };
        if poller.interval.is_zero() {
            return Err(ConfigError::Invalid {
                var: "POLL_INTERVAL_MS",
                value: "0".into(),
                reason: "must be positive".into(),
            });
        }

        let launch_defaults = LaunchConfig::default();
        let launch = LaunchConfig {
            perform_clustering: parse_opt("PERFORM_CLUSTERING", var("PERFORM_CLUSTERING"))?
                .unwrap_or(launch_defaults.perform_clustering),
            correlation_method: parse_opt("CORRELATION_METHOD", var("CORRELATION_METHOD"))?
                .unwrap_or(launch_defaults.correlation_method),
            generate_report: parse_opt("GENERATE_REPORT", var("GENERATE_REPORT"))?
                .unwrap_or(launch_defaults.generate_report),
            report_format: parse_opt("REPORT_FORMAT", var("REPORT_FORMAT"))?
                .unwrap_or(launch_defaults.report_format),
        };

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected 'text' or 'json'".into(),
                })
            }
        };

        Ok(Self {
            api_url,
            analysis_id,
            resume: parse_opt("ANALYSIS_RESUME", var("ANALYSIS_RESUME"))?.unwrap_or(false),
            request_timeout: Duration::from_secs(
                parse_opt("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS"))?.unwrap_or(30),
            ),
            poller,
            launch,
            log_format,
        })
    }
}

fn parse_opt<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
