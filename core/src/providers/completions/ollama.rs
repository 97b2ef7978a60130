use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::generation::{GenerationError, GenerationModel};

const DEFAULT_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3";
const DEFAULT_TEMP: f64 = 0.7;
const DEFAULT_TOP_P: f64 = 0.9;

/// Non-streaming generation has no progress signal, so the whole request
/// is bounded by one fixed timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct ModelConfig {
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
    top_p: Option<f64>,
}

/// Generation provider backed by a local Ollama instance
/// (`POST {base}/api/generate`, non-streaming).
pub struct OllamaCompletionModel {
    base_url: String,
    model: String,
    temperature: f64,
    top_p: f64,
    client: reqwest::Client,
}

impl OllamaCompletionModel {
    #[instrument]
    #[must_use]
    pub fn new(json_config: Option<&str>) -> Self {
        let (base_url, model, temperature, top_p) = if let Some(json) = json_config {
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
                config.temperature.unwrap_or(DEFAULT_TEMP),
                config.top_p.unwrap_or(DEFAULT_TOP_P),
            )
        } else {
            (
                DEFAULT_URL.to_string(),
                DEFAULT_MODEL.to_string(),
                DEFAULT_TEMP,
                DEFAULT_TOP_P,
            )
        };
        Self {
            base_url,
            model,
            temperature,
            top_p,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl GenerationModel for OllamaCompletionModel {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request_body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "top_p": self.top_p,
            },
        });
        debug!(request_body = ?request_body, "Sending request to Ollama");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Request failed");
                GenerationError::RequestError(e.to_string())
            })?;

        let status = response.status();
        debug!(%status, "Received API response");

        if status.is_success() {
            let response_json: serde_json::Value = response.json().await.map_err(|e| {
                error!(error = ?e, "Failed to parse response JSON");
                GenerationError::ParseError(e.to_string())
            })?;
            let answer = response_json["response"]
                .as_str()
                .ok_or(GenerationError::ParseError(
                    "missing `response` field".to_string(),
                ))?
                .to_string();
            info!(answer_len = answer.len(), "Generation completed");
            Ok(answer)
        } else {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error (failed to read response body)".to_string());
            error!(status = %status, error = %error_msg, "API returned error response");
            Err(GenerationError::ProviderError(status.into(), error_msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn simple_ollama_generation_request() {
        let model = OllamaCompletionModel::new(None);
        let response = model
            .generate("Reply with the single word: okay")
            .await;

        assert!(response.is_ok());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_request_error() {
        // port 9 (discard) is never serving HTTP
        let model = OllamaCompletionModel::new(Some(r#"{"base_url": "http://127.0.0.1:9"}"#));
        let response = model.generate("hello").await;

        assert!(matches!(response, Err(GenerationError::RequestError(_))));
    }

    #[test]
    fn config_overrides_defaults() {
        let model = OllamaCompletionModel::new(Some(
            r#"{"model": "mistral", "temperature": 0.2, "top_p": 0.5}"#,
        ));
        assert_eq!(model.model, "mistral");
        assert_eq!(model.temperature, 0.2);
        assert_eq!(model.top_p, 0.5);
        assert_eq!(model.base_url, DEFAULT_URL);
    }
}
