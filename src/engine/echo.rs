//! Echo engine for development and tests.

use async_trait::async_trait;

use super::{CompletionEngine, CompletionRequest, EngineError};

/// Returns the rendered prompt unchanged.
///
/// Lets the full request path run without a model server: response bodies
/// and stored context end up containing exactly what the executor rendered.
#[derive(Debug, Default)]
pub struct EchoEngine;

impl EchoEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CompletionEngine for EchoEngine {
    async fn complete(&self, request: CompletionRequest) -> Result<String, EngineError> {
        Ok(request.prompt)
    }
}
