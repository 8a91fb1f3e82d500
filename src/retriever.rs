//! Query-time retrieval: embed the question, search the index.

use std::sync::Arc;

use tracing::debug;

use crate::document::Chunk;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::index::VectorIndex;

/// The default number of chunks returned per query.
pub const DEFAULT_TOP_K: usize = 4;

/// Retrieves the chunks nearest to a query string from a [`VectorIndex`].
///
/// Embedder and index errors are propagated unchanged; no recovery is
/// attempted here.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever returning at most `top_k` chunks per query.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self { embedder, top_k }
    }

    /// Embed `query` and return the nearest chunks, nearest first.
    pub async fn retrieve(&self, index: &VectorIndex, query: &str) -> Result<Vec<Chunk>> {
        let query_embedding = self.embedder.embed(query).await?;
        let results = index.search(&query_embedding, self.top_k)?;
        debug!(top_k = self.top_k, hits = results.len(), "retrieved chunks for query");
        Ok(results.into_iter().map(|r| r.chunk).collect())
    }
}
