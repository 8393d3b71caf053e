//! Route duration error types.

use crate::cache::CacheError;

/// Errors from computing route durations.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The driver session could not be started
    #[error("failed to open route session: {0}")]
    Session(String),

    /// The driver failed while computing a route
    #[error("route driver error: {0}")]
    Driver(String),

    /// The driver has no route between the points
    #[error("no route from {from} to {to}")]
    NoRoute { from: String, to: String },

    /// Fixture data could not be loaded
    #[error("failed to load route fixture: {0}")]
    Fixture(String),

    /// Computed duration could not be cached
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RouteError::NoRoute {
            from: "35.0,139.0".into(),
            to: "36.0,138.0".into(),
        };
        assert_eq!(err.to_string(), "no route from 35.0,139.0 to 36.0,138.0");

        let err = RouteError::Session("browser not found".into());
        assert_eq!(err.to_string(), "failed to open route session: browser not found");
    }
}
