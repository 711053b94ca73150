//! Error types for scan export.

use scan_types::MeshError;
use thiserror::Error;

/// Result type for scan export operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while writing scan output or loading configuration.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The mesh references vertices it does not have.
    #[error("refusing to write invalid mesh: {0}")]
    InvalidMesh(#[from] MeshError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IoError::from(MeshError::IndexOutOfBounds {
            face: 2,
            index: 9,
            vertex_count: 4,
        });
        assert!(err.to_string().starts_with("refusing to write invalid mesh"));

        let err = IoError::from(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "I/O error: disk full");
    }
}
