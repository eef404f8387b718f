//! Error Types
//!
//! One error enum for the store, the snapshot codec and the orchestrator.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::providers::Capability;

/// Boxed error returned by external collaborators (embedder, vision, speech).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error in {operation}: {reason}")]
    Configuration {
        operation: &'static str,
        reason: String,
    },

    #[error("I/O failure during {operation} on {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt snapshot {}: {reason}", path.display())]
    CorruptData { path: PathBuf, reason: String },

    #[error("embedding failure during {operation}: {source}")]
    Embedding {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("classification failure: {source}")]
    Classification {
        #[source]
        source: BoxError,
    },

    #[error("transcription failure: {source}")]
    Transcription {
        #[source]
        source: BoxError,
    },

    #[error("dimension mismatch in {operation}: expected {expected}, got {actual}")]
    DimensionMismatch {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid vector in {operation}: {reason}")]
    InvalidVector {
        operation: &'static str,
        reason: String,
    },

    #[error("{capability} unavailable: {reason}")]
    Unavailable {
        capability: Capability,
        reason: String,
    },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl Error {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::CorruptData {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for errors where a retry by the caller could plausibly succeed.
    ///
    /// The core never retries; this only helps the calling layer decide.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Io { .. } | Error::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = Error::DimensionMismatch {
            operation: "insert",
            expected: 384,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "dimension mismatch in insert: expected 384, got 3"
        );

        let err = Error::corrupt("/tmp/kb.snap", "bad magic");
        assert!(err.to_string().contains("/tmp/kb.snap"));
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let err = Error::Embedding {
            operation: "query_text",
            source: "model offline".into(),
        };
        assert_eq!(err.source().map(|s| s.to_string()), Some("model offline".to_string()));
    }

    #[test]
    fn test_transient_classification() {
        let io = Error::io(
            "save",
            "/nowhere",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(io.is_transient());

        let mismatch = Error::DimensionMismatch {
            operation: "insert",
            expected: 2,
            actual: 3,
        };
        assert!(!mismatch.is_transient());
    }
}
