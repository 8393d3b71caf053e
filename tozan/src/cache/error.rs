//! Cache store error types.

use std::path::PathBuf;

/// Errors from writing to or maintaining a cache namespace.
///
/// Reads never produce these: an unreadable entry is a miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The namespace directory could not be created
    #[error("failed to create cache directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The payload could not be serialized
    #[error("failed to serialize cache entry {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    /// The entry file could not be written
    #[error("failed to write cache file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Eviction could not list or delete entries
    #[error("failed to evict from {}: {source}", path.display())]
    Evict {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CacheError::Write {
            path: PathBuf::from("/tmp/cache/abc.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "failed to write cache file /tmp/cache/abc.json: denied"
        );
    }
}
