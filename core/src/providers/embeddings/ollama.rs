use crate::embeddings::{EmbedderError, EmbeddingModel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, instrument};

const DEFAULT_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "nomic-embed-text";

/// Embedding dimension `nomic-embed-text` produces; `EmbeddingIndex`
/// construction should use this unless a different model is configured.
pub const DEFAULT_DIMENSION: usize = 384;

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct ModelConfig {
    base_url: Option<String>,
    model: Option<String>,
}

/// Embedding provider backed by a local Ollama instance
/// (`POST {base}/api/embeddings`).
pub struct OllamaEmbeddingModel {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaEmbeddingModel {
    #[instrument]
    #[must_use]
    pub fn new(json_config: Option<&str>) -> Self {
        let (base_url, model) = if let Some(json) = json_config {
            let config = match serde_json::from_str::<ModelConfig>(json) {
                Ok(config) => config,
                Err(e) => {
                    let e = format!("Failed to deserialize json config: {e}");
                    error!(e);
                    panic!("{e}");
                }
            };
            (
                config.base_url.unwrap_or(DEFAULT_URL.to_string()),
                config.model.unwrap_or(DEFAULT_MODEL.to_string()),
            )
        } else {
            (DEFAULT_URL.to_string(), DEFAULT_MODEL.to_string())
        };
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingModel for OllamaEmbeddingModel {
    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let request_body = json!({
            "model": self.model,
            "prompt": text,
        });
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Embedding request failed");
                EmbedderError::RequestError(e.to_string())
            })?;

        let status = response.status();
        debug!(%status, "Received embedding response");

        if status.is_success() {
            let response = response
                .json::<OllamaEmbeddingResponse>()
                .await
                .map_err(|e| EmbedderError::ParseError(e.to_string()))?;
            Ok(response.embedding)
        } else {
            let error_message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_message, "Embedding API returned error");
            Err(EmbedderError::ProviderError(error_message))
        }
    }
}
