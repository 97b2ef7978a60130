use crate::{
    embeddings::EmbedderError, generation::GenerationError, indexer::IndexerError,
    pipeline::PipelineError, vector_store::VectorStoreError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("VectorStore error")]
    VectorStore(#[from] VectorStoreError),
    #[error("Embedder error")]
    Embedder(#[from] EmbedderError),
    #[error("Generation error")]
    Generation(#[from] GenerationError),
    #[error("Indexer error")]
    Indexer(#[from] IndexerError),
    #[error("Pipeline error")]
    Pipeline(#[from] PipelineError),
}
