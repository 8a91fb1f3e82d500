//! Flat vector index with cosine-similarity search and disk persistence.
//!
//! The index is a plain insertion-ordered list of (chunk, embedding) pairs.
//! It is rebuilt from scratch on every ingest rather than merged, so only
//! one document's chunks are live at a time.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};

/// Name of the serialized embeddings file inside the index directory.
const VECTORS_FILE: &str = "vectors.json";
/// Name of the serialized chunks file inside the index directory.
const CHUNKS_FILE: &str = "chunks.json";
/// Name of the index metadata file inside the index directory.
const META_FILE: &str = "meta.json";

/// One stored (chunk, embedding) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    /// The stored chunk.
    pub chunk: Chunk,
    /// The chunk's embedding vector.
    pub embedding: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct IndexMeta {
    dimensions: usize,
    entry_count: usize,
}

/// An insertion-ordered vector index over chunk embeddings.
///
/// All entries share one dimensionality, fixed by the first insert.
/// Search is brute-force cosine similarity; ties keep insertion order.
#[derive(Debug, Default, PartialEq)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stored entries in insertion order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// The dimensionality of stored embeddings, or `None` if the index is empty.
    pub fn dimensions(&self) -> Option<usize> {
        self.entries.first().map(|e| e.embedding.len())
    }

    /// Append a (chunk, embedding) pair. No duplicate detection is performed.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexError`] if the embedding's dimensionality
    /// does not match the index's existing entries, or is zero.
    pub fn insert(&mut self, chunk: Chunk, embedding: Vec<f32>) -> Result<()> {
        if embedding.is_empty() {
            return Err(RagError::IndexError("embedding must not be empty".to_string()));
        }
        if let Some(dims) = self.dimensions() {
            if embedding.len() != dims {
                return Err(RagError::IndexError(format!(
                    "dimension mismatch: index holds {dims}-dimensional embeddings, got {}",
                    embedding.len()
                )));
            }
        }
        self.entries.push(IndexEntry { chunk, embedding });
        Ok(())
    }

    /// Return the `k` entries nearest to `query_embedding`, nearest first.
    ///
    /// Ties keep insertion order. If `k` exceeds the entry count, all
    /// entries are returned.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndexError`] if the index has zero entries
    /// and `k > 0`.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() {
            if k > 0 {
                return Err(RagError::EmptyIndexError);
            }
            return Ok(Vec::new());
        }

        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, query_embedding),
            })
            .collect();

        // Stable sort, so equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Serialize the index into a directory on disk.
    ///
    /// The directory holds the embedding vectors and a parallel structure
    /// with the chunks; the layout is opaque beyond round-tripping through
    /// [`load`](VectorIndex::load).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexError`] if the directory or its files
    /// cannot be written.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .map_err(|e| RagError::IndexError(format!("failed to create {}: {e}", dir.display())))?;

        let vectors: Vec<&Vec<f32>> = self.entries.iter().map(|e| &e.embedding).collect();
        let chunks: Vec<&Chunk> = self.entries.iter().map(|e| &e.chunk).collect();
        let meta = IndexMeta {
            dimensions: self.dimensions().unwrap_or(0),
            entry_count: self.entries.len(),
        };

        write_json(&dir.join(VECTORS_FILE), &vectors)?;
        write_json(&dir.join(CHUNKS_FILE), &chunks)?;
        write_json(&dir.join(META_FILE), &meta)?;

        info!(path = %dir.display(), entries = self.entries.len(), "saved vector index");
        Ok(())
    }

    /// Deserialize an index previously written by [`save`](VectorIndex::save).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexLoadError`] if the directory is missing,
    /// a file is unreadable or corrupt, or the files disagree with each
    /// other or the recorded metadata.
    pub fn load(dir: &Path) -> Result<Self> {
        let vectors: Vec<Vec<f32>> = read_json(&dir.join(VECTORS_FILE))?;
        let chunks: Vec<Chunk> = read_json(&dir.join(CHUNKS_FILE))?;
        let meta: IndexMeta = read_json(&dir.join(META_FILE))?;

        if vectors.len() != chunks.len() || vectors.len() != meta.entry_count {
            return Err(RagError::IndexLoadError(format!(
                "inconsistent index at {}: {} vectors, {} chunks, {} recorded",
                dir.display(),
                vectors.len(),
                chunks.len(),
                meta.entry_count
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != meta.dimensions) {
            return Err(RagError::IndexLoadError(format!(
                "corrupt index at {}: expected {}-dimensional vectors, found {}",
                dir.display(),
                meta.dimensions,
                bad.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect::<Vec<_>>();

        debug!(path = %dir.display(), entries = entries.len(), "loaded vector index");
        Ok(Self { entries })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path)
        .map_err(|e| RagError::IndexError(format!("failed to create {}: {e}", path.display())))?;
    serde_json::to_writer(file, value)
        .map_err(|e| RagError::IndexError(format!("failed to write {}: {e}", path.display())))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = fs::File::open(path)
        .map_err(|e| RagError::IndexLoadError(format!("failed to open {}: {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| RagError::IndexLoadError(format!("failed to parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn chunk(id: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: format!("text of {id}"),
            ordinal: 0,
            document_id: "doc_1".to_string(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn search_on_empty_index_fails_unless_k_is_zero() {
        let index = VectorIndex::new();
        assert!(matches!(index.search(&[1.0, 0.0], 3), Err(RagError::EmptyIndexError)));
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn insert_rejects_mismatched_dimensions() {
        let mut index = VectorIndex::new();
        index.insert(chunk("a"), vec![1.0, 0.0]).unwrap();
        let err = index.insert(chunk("b"), vec![1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, RagError::IndexError(_)));
    }

    #[test]
    fn nearest_entry_is_returned_first() {
        let mut index = VectorIndex::new();
        index.insert(chunk("a"), vec![1.0, 0.0]).unwrap();
        index.insert(chunk("b"), vec![0.0, 1.0]).unwrap();
        index.insert(chunk("c"), vec![0.7, 0.7]).unwrap();

        let results = index.search(&[0.0, 1.0], 2).unwrap();
        assert_eq!(results[0].chunk.id, "b");
        assert_eq!(results[1].chunk.id, "c");
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut index = VectorIndex::new();
        index.insert(chunk("first"), vec![1.0, 0.0]).unwrap();
        index.insert(chunk("second"), vec![2.0, 0.0]).unwrap(); // same direction, same cosine
        let results = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results[0].chunk.id, "first");
        assert_eq!(results[1].chunk.id, "second");
    }

    #[test]
    fn k_larger_than_entry_count_returns_all_entries() {
        let mut index = VectorIndex::new();
        index.insert(chunk("a"), vec![1.0, 0.0]).unwrap();
        index.insert(chunk("b"), vec![0.0, 1.0]).unwrap();
        let results = index.search(&[1.0, 1.0], 100).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn load_on_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = VectorIndex::load(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, RagError::IndexLoadError(_)));
    }

    #[test]
    fn load_on_corrupt_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = VectorIndex::new();
        index.insert(chunk("a"), vec![1.0, 0.0]).unwrap();
        index.save(dir.path()).unwrap();

        std::fs::write(dir.path().join("vectors.json"), b"not json").unwrap();
        let err = VectorIndex::load(dir.path()).unwrap_err();
        assert!(matches!(err, RagError::IndexLoadError(_)));
    }

    #[test]
    fn save_load_round_trip_preserves_entries_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = VectorIndex::new();
        index.insert(chunk("a"), vec![1.0, 0.0, 0.5]).unwrap();
        index.insert(chunk("b"), vec![0.0, 1.0, -0.5]).unwrap();
        index.insert(chunk("c"), vec![0.3, 0.3, 0.3]).unwrap();

        index.save(dir.path()).unwrap();
        let loaded = VectorIndex::load(dir.path()).unwrap();
        assert_eq!(loaded, index);
    }
}
