//! Source error types
//!
//! Defines the errors that can occur while fetching snapshots from the
//! backend or from local files.

use thiserror::Error;

/// Errors that can occur while fetching sales data
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP transport failed
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend did not answer in time
    #[error("Request timed out")]
    Timeout,

    /// Backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Backend answered successfully but flagged a failure in the body
    #[error("Backend reported an error: {0}")]
    Backend(String),

    /// Reading a snapshot file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV decoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Write request rejected before it was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Snapshot file type not recognised
    #[error("Unsupported snapshot format: {0}")]
    UnsupportedFormat(String),

    /// Operation not offered by this source
    #[error("{operation} is not supported by the {source_name} source")]
    Unsupported {
        operation: &'static str,
        source_name: String,
    },
}

impl SourceError {
    pub fn unsupported(operation: &'static str, source_name: &str) -> Self {
        Self::Unsupported {
            operation,
            source_name: source_name.to_string(),
        }
    }
}

/// Result type alias for source operations
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SourceError::Status {
            status: 500,
            message: "Failed to fetch sales".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 500: Failed to fetch sales");

        let err = SourceError::unsupported("chat", "file");
        assert_eq!(err.to_string(), "chat is not supported by the file source");

        let err = SourceError::InvalidInput("quantity must be at least 1".to_string());
        assert_eq!(err.to_string(), "Invalid input: quantity must be at least 1");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SourceError = io_err.into();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
