pub(crate) mod ollama;

pub use ollama::OllamaEmbeddingModel as OllamaEmbedding;
pub use ollama::DEFAULT_DIMENSION;
