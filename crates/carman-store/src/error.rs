//! Store error types.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures of the persisted key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("Store I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored value could not be (de)serialized.
    ///
    /// The entry is left in place; callers that own the key decide whether
    /// to purge it.
    #[error("Corrupted value for key '{key}': {reason}")]
    Corrupted { key: String, reason: String },

    /// No usable data directory could be resolved for the default store path.
    #[error("Could not resolve a data directory for the store")]
    NoDataDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::Corrupted {
            key: "user_data".to_string(),
            reason: "expected value at line 1".to_string(),
        };
        assert!(err.to_string().contains("user_data"));
    }
}
