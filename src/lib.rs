//! Retrieval-Augmented Generation over PDF documents.
//!
//! `pdfqa` implements a single-document RAG pipeline: upload a PDF, the
//! pipeline extracts and chunks its text, embeds the chunks into a
//! persisted vector index, and answers free-text questions by retrieving
//! the nearest chunks and forwarding them to a hosted LLM.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pdfqa::{
//!     FixedSizeChunker, GroqChatModel, HostedEmbedder, RagConfig, RagPipeline,
//!     UploadedDocument,
//! };
//!
//! let config = RagConfig::from_env()?;
//! let pipeline = RagPipeline::builder()
//!     .config(config.clone())
//!     .embedder(Arc::new(HostedEmbedder::from_env()?.with_model(&config.embedding_model)))
//!     .chunker(Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?))
//!     .chat_model(Arc::new(GroqChatModel::from_env()?.with_model(&config.chat_model)))
//!     .build()?;
//!
//! let upload = UploadedDocument::new("paper.pdf", "application/pdf", bytes);
//! pipeline.ingest(&upload).await?;
//! let answer = pipeline.ask("What is the paper about?").await?;
//! println!("{}", answer.text);
//! ```
//!
//! Each ingest rebuilds the index from scratch; only one document's chunks
//! are live at a time. See [`RagPipeline`] for the concurrency caveats.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod hosted;
pub mod index;
pub mod pipeline;
pub mod retriever;
pub mod synthesizer;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Answer, Chunk, Document, SearchResult, UploadedDocument};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::extract_pdf_text;
pub use hosted::HostedEmbedder;
pub use index::{IndexEntry, VectorIndex};
pub use pipeline::{IngestReport, RagPipeline, RagPipelineBuilder};
pub use retriever::{DEFAULT_TOP_K, Retriever};
pub use synthesizer::{AnswerSynthesizer, ChatModel, GroqChatModel};
