use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while prospecting a site.
///
/// Everything except [`CrawlError::DriverFatal`] is absorbed by the frontier
/// traversal and recorded against the link or step that caused it.
#[derive(Debug, Clone, Error)]
pub enum CrawlError {
    #[error("page load exceeded {timeout:?}: {url}")]
    FetchTimeout { url: String, timeout: Duration },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("oracle returned an invalid response: {0}")]
    OracleInvalidResponse(String),

    #[error("oracle request failed: {0}")]
    OracleTransport(String),

    #[error("browser session is unusable: {0}")]
    DriverFatal(String),

    #[error("invalid site url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("crm sink rejected payload: {0}")]
    Sink(String),
}

/// Serialisable classification of a [`CrawlError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    FetchTimeout,
    Navigation,
    OracleInvalidResponse,
    OracleTransportFailure,
    DriverFatal,
    InvalidUrl,
    Config,
    Sink,
}

impl CrawlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CrawlError::FetchTimeout { .. } => ErrorKind::FetchTimeout,
            CrawlError::Navigation { .. } => ErrorKind::Navigation,
            CrawlError::OracleInvalidResponse(_) => ErrorKind::OracleInvalidResponse,
            CrawlError::OracleTransport(_) => ErrorKind::OracleTransportFailure,
            CrawlError::DriverFatal(_) => ErrorKind::DriverFatal,
            CrawlError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            CrawlError::Config(_) => ErrorKind::Config,
            CrawlError::Sink(_) => ErrorKind::Sink,
        }
    }

    /// Only a dead browser session aborts a crawl
    pub fn is_fatal(&self) -> bool {
        matches!(self, CrawlError::DriverFatal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_driver_errors_are_fatal() {
        assert!(CrawlError::DriverFatal("gone".into()).is_fatal());
        assert!(!CrawlError::OracleTransport("502".into()).is_fatal());
        assert!(
            !CrawlError::FetchTimeout {
                url: "https://a.example/".into(),
                timeout: Duration::from_secs(60),
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_kind_serialises_snake_case() {
        let kind = CrawlError::OracleTransport("reset".into()).kind();
        assert_eq!(
            serde_json::to_string(&kind).unwrap(),
            "\"oracle_transport_failure\""
        );
    }
}
