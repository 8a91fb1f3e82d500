//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] wires the chunker, embedder, vector index, retriever,
//! and answer synthesizer into two operations: [`ingest`](RagPipeline::ingest)
//! and [`ask`](RagPipeline::ask). It owns one [`VectorIndex`] per process
//! lifetime, reloaded from disk at construction.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Answer, Document, UploadedDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::extract_pdf_text;
use crate::index::VectorIndex;
use crate::retriever::Retriever;
use crate::synthesizer::{AnswerSynthesizer, ChatModel};

/// Summary of a successful ingest.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IngestReport {
    /// The identifier assigned to the ingested document.
    pub document_id: String,
    /// Number of chunks indexed.
    pub chunk_count: usize,
}

/// The RAG pipeline orchestrator.
///
/// The pipeline starts `Empty` (no index) and becomes `Ready` after the
/// first successful [`ingest`](RagPipeline::ingest) or when a persisted
/// index is found on disk at construction. Each ingest rebuilds the index
/// from scratch — chunks from earlier documents are replaced, not merged.
///
/// # Known limitation
///
/// The on-disk index directory has no locking: concurrent ingest calls are
/// last-writer-wins and can corrupt it, and an `ask` racing an in-progress
/// ingest may observe the previous index. The in-process index swap itself
/// is atomic behind a read-write lock.
pub struct RagPipeline {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    index: RwLock<Option<VectorIndex>>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Whether a document has been ingested (or a persisted index loaded).
    pub async fn is_ready(&self) -> bool {
        self.index.read().await.is_some()
    }

    /// Ingest an uploaded PDF: extract text, chunk, embed, rebuild the
    /// index, and persist it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::UnsupportedFormatError`] if the upload is not a
    /// parseable PDF, [`RagError::ExtractionError`] if text extraction fails
    /// or yields no text, and propagates embedder and index errors unchanged.
    pub async fn ingest(&self, upload: &UploadedDocument) -> Result<IngestReport> {
        let text = extract_pdf_text(upload)?;

        let mut metadata = HashMap::new();
        metadata.insert("filename".to_string(), upload.filename.clone());
        let document = Document { id: Uuid::new_v4().to_string(), text, metadata };

        // 1. Chunk the document
        let chunks = self.chunker.chunk(&document);
        if chunks.is_empty() {
            error!(document.id = %document.id, filename = %upload.filename, "document yielded no text");
            return Err(RagError::ExtractionError(format!(
                "'{}' contains no extractable text",
                upload.filename
            )));
        }

        // 2. Generate embeddings for all chunk texts
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
        })?;

        // 3. Rebuild the index from scratch
        let mut index = VectorIndex::new();
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            index.insert(chunk, embedding)?;
        }
        let chunk_count = index.len();

        // 4. Persist, then swap in
        index.save(&self.config.index_path).inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "failed to persist index");
        })?;
        *self.index.write().await = Some(index);

        info!(document.id = %document.id, chunk_count, "ingested document");
        Ok(IngestReport { document_id: document.id, chunk_count })
    }

    /// Answer a question against the ingested document.
    ///
    /// Retrieves the nearest chunks and forwards them with the question to
    /// the chat model.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NoDocumentIngestedError`] if no document has been
    /// ingested yet; propagates embedder, index, and chat-model errors
    /// unchanged.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let guard = self.index.read().await;
        let index = guard.as_ref().ok_or(RagError::NoDocumentIngestedError)?;

        let context = self.retriever.retrieve(index, question).await?;
        self.synthesizer.synthesize(question, context).await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All parts are required. [`build()`](RagPipelineBuilder::build) attempts
/// to load a persisted index from the configured path; a missing index
/// leaves the pipeline empty, and a corrupt one is logged and ignored.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
    chat_model: Option<Arc<dyn ChatModel>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the chat model used for answer synthesis.
    pub fn chat_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(model);
        self
    }

    /// Build the [`RagPipeline`], validating that all parts are set and
    /// loading any index persisted at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required part is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::ConfigError("chunker is required".to_string()))?;
        let chat_model = self
            .chat_model
            .ok_or_else(|| RagError::ConfigError("chat_model is required".to_string()))?;

        let index = if config.index_path.exists() {
            match VectorIndex::load(&config.index_path) {
                Ok(index) => {
                    info!(path = %config.index_path.display(), entries = index.len(), "loaded persisted index");
                    Some(index)
                }
                Err(e) => {
                    warn!(path = %config.index_path.display(), error = %e, "ignoring unreadable persisted index");
                    None
                }
            }
        } else {
            None
        };

        let retriever = Retriever::new(Arc::clone(&embedder), config.top_k);
        let synthesizer = AnswerSynthesizer::new(chat_model);

        Ok(RagPipeline {
            config,
            embedder,
            chunker,
            retriever,
            synthesizer,
            index: RwLock::new(index),
        })
    }
}
