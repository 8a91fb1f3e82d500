//! Error types for the `pdfqa` crate.

use thiserror::Error;

/// Errors that can occur in the RAG pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error (bad chunk parameters, bad env values).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The uploaded document is not a parseable PDF.
    #[error("Unsupported format: {0}")]
    UnsupportedFormatError(String),

    /// Text extraction from a valid PDF failed.
    #[error("Extraction error: {0}")]
    ExtractionError(String),

    /// An embedding or LLM backend failed (network, auth, rate-limit,
    /// malformed response).
    #[error("External service error ({provider}): {message}")]
    ExternalServiceError {
        /// The external service that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A search was issued against an index with zero entries.
    #[error("Vector index is empty")]
    EmptyIndexError,

    /// A question was asked before any document was successfully ingested.
    #[error("No document has been ingested yet")]
    NoDocumentIngestedError,

    /// An index operation other than loading failed (persisting to disk,
    /// inserting an entry with mismatched dimensionality).
    #[error("Index error: {0}")]
    IndexError(String),

    /// A persisted index could not be loaded (missing or corrupt files).
    #[error("Index load error: {0}")]
    IndexLoadError(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
