//! Completion engine abstraction.
//!
//! A completion engine turns one fully rendered prompt into model text. The
//! executor makes exactly one `complete` call per task; any internal
//! refinement an engine performs is bounded by the request's `refine_budget`
//! and invisible to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::settings::EngineConfig;

mod echo;
mod ollama;

pub use echo::EchoEngine;
pub use ollama::OllamaEngine;

/// One fully rendered prompt ready for completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Upper bound on internal refinement attempts the engine may spend on
    /// this prompt. 1 means a single shot; the planner allows 3.
    pub refine_budget: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            refine_budget: 1,
        }
    }

    pub fn with_refine_budget(mut self, refine_budget: u32) -> Self {
        self.refine_budget = refine_budget;
        self
    }
}

/// Errors surfaced by completion engines.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("completion API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid completion response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// Run one prompt to completion and return the raw model text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, EngineError>;
}

/// Create a completion engine based on the provider named in config.
///
/// Supports "ollama" and "echo" providers.
pub fn create_engine(config: &EngineConfig) -> Result<Arc<dyn CompletionEngine>, EngineError> {
    debug!(provider = %config.provider, model = %config.model, "create_engine: called");
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaEngine::from_config(config)?)),
        "echo" => Ok(Arc::new(EchoEngine::new())),
        other => Err(EngineError::InvalidResponse(format!(
            "unknown engine provider: '{}'. Supported: ollama, echo",
            other
        ))),
    }
}
