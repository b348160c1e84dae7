//! Centralized error types for emlhtml.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the emlhtml library.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified input does not exist.
    #[error("Input not found: {0}")]
    FileNotFound(PathBuf),

    /// The raw bytes could not be turned into a message tree.
    #[error("Unable to parse message: {0}")]
    MessageParse(String),

    /// A hypertext body could not be parsed or rendered back.
    #[error("Unable to parse HTML: {0}")]
    HtmlParse(String),

    /// The message is larger than the configured limit.
    #[error("Message is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge { size: usize, limit: usize },

    /// An invalid path was provided.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Convenience alias for `Result<T, ConvertError>`.
pub type Result<T> = std::result::Result<T, ConvertError>;

impl ConvertError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = ConvertError::io(
            "/tmp/out/attachments",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out/attachments"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_too_large_message() {
        let err = ConvertError::TooLarge {
            size: 20,
            limit: 10,
        };
        assert_eq!(
            err.to_string(),
            "Message is too large (20 bytes, limit 10 bytes)"
        );
    }
}
