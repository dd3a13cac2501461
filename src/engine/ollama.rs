//! Ollama completion client.
//!
//! Talks to a local Ollama server through its non-streaming generate
//! endpoint. The refine budget is spent retrying empty completions; a model
//! that keeps returning nothing yields its final answer as-is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CompletionEngine, CompletionRequest, EngineError};
use crate::settings::EngineConfig;

pub struct OllamaEngine {
    model: String,
    base_url: String,
    http: Client,
}

impl OllamaEngine {
    /// Create a new client from configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(EngineError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, EngineError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        debug!(%url, prompt_len = prompt.len(), "generate: sending request");
        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        Ok(parsed.response)
    }
}

#[async_trait]
impl CompletionEngine for OllamaEngine {
    async fn complete(&self, request: CompletionRequest) -> Result<String, EngineError> {
        let attempts = request.refine_budget.max(1);
        let mut output = String::new();

        for attempt in 1..=attempts {
            output = self.generate(&request.prompt).await?;
            if !output.trim().is_empty() {
                return Ok(output);
            }
            warn!(attempt, attempts, "empty completion, retrying within refine budget");
        }

        Ok(output)
    }
}

/// Non-streaming response from `/api/generate`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}
