//! Error types for paramharvest

use thiserror::Error;

/// Errors that can occur while fetching from the archive
#[derive(Debug, Error)]
pub enum FetchError {
    /// Domain is missing
    #[error("Missing required parameter: domain")]
    MissingDomain,

    /// Domain cannot be embedded in an archive query
    #[error("Invalid domain: {0:?}")]
    InvalidDomain(String),

    /// Proxy URL was rejected by the HTTP client
    #[error("Invalid proxy URL: {url}")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Attempt did not complete within the per-attempt timeout
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected HTTP status: {0}")]
    HttpStatus(u16),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Every attempt failed
    #[error("Failed to fetch {url} after {attempts} attempts")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    /// Interrupted while waiting between attempts
    #[error("Fetch interrupted")]
    Interrupted,
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::ConnectError(err)
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus(status.as_u16())
        } else {
            FetchError::RequestError(err.to_string())
        }
    }

    /// Returns true if another attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout
                | FetchError::ConnectError(_)
                | FetchError::HttpStatus(_)
                | FetchError::RequestError(_)
        )
    }
}

/// Per-URL failures during normalization
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Raw token is not a parseable absolute URL
    #[error("Malformed URL {url:?}")]
    Malformed {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchError::MissingDomain.to_string(),
            "Missing required parameter: domain"
        );
        assert_eq!(
            FetchError::InvalidDomain("a b".to_string()).to_string(),
            "Invalid domain: \"a b\""
        );
        assert_eq!(
            FetchError::HttpStatus(503).to_string(),
            "Unexpected HTTP status: 503"
        );
        assert_eq!(FetchError::Timeout.to_string(), "Request timed out");
        assert_eq!(FetchError::Interrupted.to_string(), "Fetch interrupted");
    }

    #[test]
    fn test_exhausted_keeps_last_error() {
        let err = FetchError::Exhausted {
            url: "https://web.archive.org/cdx".to_string(),
            attempts: 3,
            last: Box::new(FetchError::HttpStatus(500)),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch https://web.archive.org/cdx after 3 attempts"
        );
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "Unexpected HTTP status: 500");
    }

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Timeout.is_transient());
        assert!(FetchError::HttpStatus(404).is_transient());
        assert!(FetchError::RequestError("reset".to_string()).is_transient());
        assert!(!FetchError::Interrupted.is_transient());
        assert!(!FetchError::MissingDomain.is_transient());
    }

    #[test]
    fn test_malformed_message() {
        let err = NormalizeError::Malformed {
            url: "not a url".to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        };
        assert_eq!(err.to_string(), "Malformed URL \"not a url\"");
    }
}
