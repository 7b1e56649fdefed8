//! Ollama provider.
//!
//! Talks to a local Ollama daemon over its native `/api/generate`
//! endpoint with streaming disabled. No authentication; the daemon is
//! assumed to be reachable on localhost unless configured otherwise.

use async_trait::async_trait;
use quill_core::error::LlmError;
use quill_core::llm::{LlmClient, LlmReply};
use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Client for a local Ollama instance.
pub struct OllamaClient {
    model: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ApiGenerateResponse {
    model: String,
    response: String,
}

#[derive(Deserialize)]
struct ApiTagsResponse {
    #[serde(default)]
    models: Vec<ApiModelTag>,
}

#[derive(Deserialize)]
struct ApiModelTag {
    name: String,
}

impl OllamaClient {
    /// Create a client for `model`, optionally overriding the base URL.
    pub fn new(model: impl Into<String>, base_url: Option<&str>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self {
            model: model.into(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }

    /// Models the daemon has pulled, by name. Empty on a non-success
    /// status rather than an error, matching a daemon that is up but
    /// has no models yet.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let body: ApiTagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        Ok(body.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether the daemon answers at all.
    pub async fn health_check(&self) -> Result<bool, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<LlmReply, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending generate request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            warn!(status, body = %message, "Ollama returned error");
            return Err(LlmError::ApiError {
                status_code: status,
                message,
            });
        }

        let api_response: ApiGenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        if api_response.response.is_empty() {
            return Err(LlmError::InvalidResponse("Empty completion".into()));
        }

        Ok(LlmReply {
            text: api_response.response,
            model: api_response.model,
        })
    }
}

fn map_transport_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout(err.to_string())
    } else {
        LlmError::Network(err.to_string())
    }
}
