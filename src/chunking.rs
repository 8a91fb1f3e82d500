//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`],
//! which splits text into fixed-size character windows with configurable
//! overlap between consecutive chunks.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata; embeddings
/// are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into fixed-size chunks by character count with configurable
/// overlap.
///
/// Windows advance by `chunk_size - chunk_overlap` characters, so each chunk
/// after the first starts with the last `chunk_overlap` characters of its
/// predecessor. Text shorter than `chunk_size` yields exactly one chunk.
/// Windows are placed on character boundaries, so multi-byte text is safe.
///
/// Chunk IDs are generated as `{document_id}_{ordinal}`.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero or
    /// `chunk_overlap` is not strictly less than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let text = &document.text;
        // Byte offset of each character, plus the end of the text, so that
        // windows can be sliced on character boundaries.
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        let total_chars = boundaries.len() - 1;

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut ordinal = 0;

        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            let chunk_text = &text[boundaries[start]..boundaries[end]];

            chunks.push(Chunk {
                id: format!("{}_{ordinal}", document.id),
                text: chunk_text.to_string(),
                ordinal,
                document_id: document.id.clone(),
                metadata: document.metadata.clone(),
            });

            if end == total_chars {
                break;
            }
            ordinal += 1;
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn doc(text: &str) -> Document {
        Document { id: "doc_1".to_string(), text: text.to_string(), metadata: HashMap::new() }
    }

    #[test]
    fn overlap_must_be_less_than_chunk_size() {
        assert!(matches!(FixedSizeChunker::new(10, 10), Err(RagError::ConfigError(_))));
        assert!(matches!(FixedSizeChunker::new(10, 20), Err(RagError::ConfigError(_))));
        assert!(matches!(FixedSizeChunker::new(0, 0), Err(RagError::ConfigError(_))));
        assert!(FixedSizeChunker::new(10, 9).is_ok());
    }

    #[test]
    fn short_text_yields_exactly_one_chunk() {
        let chunker = FixedSizeChunker::new(100, 20).unwrap();
        let chunks = chunker.chunk(&doc("short text"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
        assert_eq!(chunks[0].ordinal, 0);
        assert_eq!(chunks[0].id, "doc_1_0");
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = FixedSizeChunker::new(100, 20).unwrap();
        assert!(chunker.chunk(&doc("")).is_empty());
    }

    #[test]
    fn consecutive_chunks_overlap_by_configured_amount() {
        let chunker = FixedSizeChunker::new(4, 2).unwrap();
        let chunks = chunker.chunk(&doc("abcdefgh"));
        assert_eq!(chunks[0].text, "abcd");
        assert_eq!(chunks[1].text, "cdef");
        assert_eq!(chunks[2].text, "efgh");
        for window in chunks.windows(2) {
            let tail: String =
                window[0].text.chars().skip(window[0].text.chars().count() - 2).collect();
            let head: String = window[1].text.chars().take(2).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn multibyte_text_is_split_on_character_boundaries() {
        let chunker = FixedSizeChunker::new(3, 1).unwrap();
        let chunks = chunker.chunk(&doc("héllo wörld"));
        let reconstructed: String = chunks
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.text.chars().skip(if i == 0 { 0 } else { 1 }))
            .collect();
        assert_eq!(reconstructed, "héllo wörld");
    }
}
