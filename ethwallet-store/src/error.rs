//! Error types for the storage backends.

use thiserror::Error;

/// Error returned by storage backend operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not service the call at all (service missing,
    /// permission denied, device in a bad state).
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// An I/O operation against the backing medium failed.
    #[error("i/o error during {context}: {source}")]
    Io {
        /// Context describing the operation.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Stored data could not be parsed back.
    #[error("corrupted data: {0}")]
    Corrupted(String),

    /// Serialization of a value for storage failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Creates an I/O error with context.
    pub fn io<S: Into<String>>(context: S, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a corrupted-data error.
    pub fn corrupted<S: Into<String>>(context: S) -> Self {
        Self::Corrupted(context.into())
    }

    /// Creates an unavailable-backend error.
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Result type alias for storage backend operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::unavailable("keychain locked");
        assert_eq!(format!("{err}"), "backend unavailable: keychain locked");

        let err = StoreError::io(
            "write store file",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(format!("{err}").contains("write store file"));
    }
}
