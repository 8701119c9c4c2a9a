//! Error types
//!
//! [`EngineError`] is what a single provider call can fail with; the
//! dispatcher logs those and only surfaces a [`SearchError`] when the whole
//! request produced nothing.

/// Failure of a single provider call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("too many requests")]
    TooManyRequests,
    #[error("access denied")]
    AccessDenied,
    #[error("CAPTCHA required")]
    Captcha,
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("invalid request parameters: {0}")]
    InvalidParams(String),
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Map an HTTP status to its error, if it is not a success
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            429 => Some(Self::TooManyRequests),
            403 => Some(Self::AccessDenied),
            other => Some(Self::Http(other)),
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16()).unwrap_or(Self::Network(err.to_string()))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Failure of a whole search request
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("query is mandatory")]
    InvalidQuery,

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("search timed out: {0}")]
    Timeout(#[source] EngineError),

    #[error("no results found{}", .source.as_ref().map(|e| format!(": {}", e)).unwrap_or_default())]
    NoResults {
        #[source]
        source: Option<EngineError>,
    },
}

impl SearchError {
    /// Final error for a request that produced no results
    pub fn from_last_error(last_error: Option<EngineError>) -> Self {
        match last_error {
            Some(err) if err.is_timeout() => Self::Timeout(err),
            source => Self::NoResults { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_status_mapping() {
        assert_eq!(EngineError::from_status(200), None);
        assert_eq!(EngineError::from_status(429), Some(EngineError::TooManyRequests));
        assert_eq!(EngineError::from_status(403), Some(EngineError::AccessDenied));
        assert_eq!(EngineError::from_status(502), Some(EngineError::Http(502)));
    }

    #[test]
    fn test_last_error_classification() {
        assert!(matches!(
            SearchError::from_last_error(Some(EngineError::Timeout)),
            SearchError::Timeout(_)
        ));
        assert!(matches!(
            SearchError::from_last_error(Some(EngineError::Http(500))),
            SearchError::NoResults { source: Some(EngineError::Http(500)) }
        ));
        assert!(matches!(
            SearchError::from_last_error(None),
            SearchError::NoResults { source: None }
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(SearchError::InvalidQuery.to_string(), "query is mandatory");
        assert_eq!(
            SearchError::NoResults { source: None }.to_string(),
            "no results found"
        );
        let err = SearchError::NoResults {
            source: Some(EngineError::TooManyRequests),
        };
        assert_eq!(err.to_string(), "no results found: too many requests");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
        assert_send_sync::<SearchError>();
    }
}
