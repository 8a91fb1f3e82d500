//! Data types for uploads, documents, chunks, and answers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A raw uploaded file, alive only for the duration of one ingest call.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// The original filename of the upload.
    pub filename: String,
    /// The declared MIME type of the upload.
    pub content_type: String,
    /// The raw file bytes.
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    /// Create a new uploaded document from its filename, content type, and bytes.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self { filename: filename.into(), content_type: content_type.into(), bytes }
    }
}

/// A source document with extracted text content and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The extracted text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document (e.g. `filename`).
    pub metadata: HashMap<String, String>,
}

/// A contiguous window of a [`Document`]'s text, the unit of embedding
/// and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk, `{document_id}_{ordinal}`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// Zero-based position of this chunk within its document.
    pub ordinal: usize,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Key-value metadata inherited from the parent document.
    pub metadata: HashMap<String, String>,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// A generated answer together with the chunks used as context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The generated answer text, verbatim from the model.
    pub text: String,
    /// The context chunks forwarded to the model, nearest first.
    pub context: Vec<Chunk>,
}
