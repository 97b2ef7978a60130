use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Provider error -> HTTP Status {0}: {1}")]
    ProviderError(u16, String),
    #[error("RequestError: {0}")]
    RequestError(String),
    #[error("ParseError: {0}")]
    ParseError(String),
}

/// Produces answer text from an already-assembled prompt.
///
/// Failures from this trait never cross the pipeline boundary: the
/// orchestrator converts them into a degraded, human-readable answer
/// tagged as a backend failure.
#[async_trait]
pub trait GenerationModel: Send + Sync {
    /// Backend name used in degraded answer text, e.g. `"Ollama"`.
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
