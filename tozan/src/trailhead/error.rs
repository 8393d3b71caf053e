//! Trailhead fetch error types.

use crate::cache::CacheError;

/// Errors from fetching trailhead facts.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Page returned a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status { status: u16, url: String },

    /// Source is not available (used by offline sources)
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// Fetched data could not be cached
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Status {
            status: 404,
            url: "https://example.com/trailhead/1".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404 fetching https://example.com/trailhead/1");

        let err = FetchError::Unavailable("offline".into());
        assert_eq!(err.to_string(), "source unavailable: offline");
    }
}
