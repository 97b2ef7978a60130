//! # Bidframe - Core API Documentation
//!
//! Bidframe is a retrieval-augmented generation core for drafting and
//! scoring responses to request-for-proposal (RFP) requirements.
//!
//! ## Features
//!
//! - **Embedding index**: exact nearest-neighbor search over fixed-dimension
//!   vectors, with durable directory snapshots (`save`/`load`)
//! - **Indexer**: turns tabular requirement/response exports into indexable
//!   documents via deterministic column detection
//! - **Pipeline**: drives embed → retrieve → generate → post-process → score
//!   for each query, degrading gracefully when the generation backend fails
//! - **Quality scoring**: pure, deterministic 0-100 heuristics over
//!   completeness, clarity, professionalism, and relevance
//! - **Providers**: Ollama-backed embedding and generation models, with the
//!   model capabilities injected as traits so anything else can slot in
//!
//! ## Answering a query against historical responses
//!
//! ```rust,no_run
//! use bidframe::prelude::*;
//! use bidframe::providers::{completions::Ollama, embeddings::OllamaEmbedding};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let store = EmbeddingIndex::load("rfp_store")?;
//!     let pipeline = RagPipeline::new(store, OllamaEmbedding::new(None), Ollama::new(None))
//!         .with_top_k(3);
//!
//!     let response = pipeline.ask("What is your experience with cloud migration?").await?;
//!     println!("{}", response.answer);
//!     if let Some(quality) = &response.quality {
//!         println!("{} ({})", quality.overall, quality.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Indexing a table of historical responses
//!
//! ```rust,no_run
//! use bidframe::prelude::*;
//! use bidframe::providers::embeddings::{OllamaEmbedding, DEFAULT_DIMENSION};
//! use bidframe::providers::completions::Ollama;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let store = EmbeddingIndex::new(DEFAULT_DIMENSION);
//!     let mut pipeline = RagPipeline::new(store, OllamaEmbedding::new(None), Ollama::new(None));
//!
//!     let table = Table::new(
//!         vec!["Requirement".into(), "Response".into()],
//!         vec![vec!["Describe your SLA.".into(), "99.9% uptime.".into()]],
//!     );
//!     let report = pipeline.index_table(&table).await?;
//!     println!("indexed {} documents", report.documents_added);
//!
//!     pipeline.store().save("rfp_store")?;
//!     Ok(())
//! }
//! ```

/// Document representation shared by the index and the ingestion side
pub mod document;

/// Text embedding support: the injected `EmbeddingModel` capability
pub mod embeddings;

/// Error types for all library operations
pub mod error;

/// Answer generation support: the injected `GenerationModel` capability
pub mod generation;

/// Tabular ingestion: column detection and document templating
pub mod indexer;

/// The retrieve→generate→score orchestrator
pub mod pipeline;

/// Convenience prelude exports
pub mod prelude;

/// Builtin embedding and generation model providers
pub mod providers;

/// Deterministic response quality scoring
pub mod scoring;

/// Vector storage, retrieval, and snapshots
pub mod vector_store;
