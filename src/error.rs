//! Error types for the Kinema library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`KinemaError`] enum. Per-record ingestion failures are represented by
//! the embedding and asset variants and are caught inside the ingestion
//! pipeline; everything else propagates to the caller.
//!
//! # Examples
//!
//! ```
//! use kinema::error::{KinemaError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(KinemaError::invalid_query("missing image modality"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Kinema operations.
#[derive(Error, Debug)]
pub enum KinemaError {
    /// Encoder invocation failure (image decode, model error, bad output).
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// A referenced poster/image asset is absent or unreadable.
    #[error("Asset missing: {0}")]
    AssetMissing(String),

    /// A vector's length disagrees with the collection's effective dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The collection's effective dimension.
        expected: usize,
        /// The dimension actually supplied.
        actual: usize,
    },

    /// A search request is missing a required modality or is otherwise malformed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Collection lifecycle errors (unknown collection, bad configuration).
    #[error("Collection error: {0}")]
    Collection(String),

    /// The vector store is unavailable or rejected a request.
    #[error("Backend error: {0}")]
    Backend(String),

    /// I/O errors (file operations, asset reads, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parse/write errors at the feed boundary
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// HTTP transport errors from remote collaborators
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`KinemaError`].
pub type Result<T> = std::result::Result<T, KinemaError>;

impl KinemaError {
    /// Create a new embedding error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        KinemaError::Embedding(msg.into())
    }

    /// Create a new missing-asset error.
    pub fn asset_missing<S: Into<String>>(msg: S) -> Self {
        KinemaError::AssetMissing(msg.into())
    }

    /// Create a new dimension-mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        KinemaError::DimensionMismatch { expected, actual }
    }

    /// Create a new invalid-query error.
    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        KinemaError::InvalidQuery(msg.into())
    }

    /// Create a new collection error.
    pub fn collection<S: Into<String>>(msg: S) -> Self {
        KinemaError::Collection(msg.into())
    }

    /// Create a new backend error.
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        KinemaError::Backend(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        KinemaError::Other(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        KinemaError::Other(format!("Invalid configuration: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = KinemaError::embedding("corrupt image");
        assert_eq!(error.to_string(), "Embedding error: corrupt image");

        let error = KinemaError::asset_missing("posters/Dune.jpg");
        assert_eq!(error.to_string(), "Asset missing: posters/Dune.jpg");

        let error = KinemaError::invalid_query("missing text modality");
        assert_eq!(error.to_string(), "Invalid query: missing text modality");

        let error = KinemaError::backend("index unavailable");
        assert_eq!(error.to_string(), "Backend error: index unavailable");
    }

    #[test]
    fn test_dimension_mismatch_fields() {
        let error = KinemaError::dimension_mismatch(1280, 768);
        assert_eq!(
            error.to_string(),
            "Dimension mismatch: expected 1280, got 768"
        );
        match error {
            KinemaError::DimensionMismatch { expected, actual } => {
                assert_eq!(expected, 1280);
                assert_eq!(actual, 768);
            }
            _ => panic!("Expected dimension mismatch variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let kinema_error = KinemaError::from(io_error);

        match kinema_error {
            KinemaError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
