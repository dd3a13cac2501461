//! Task execution: prompt assembly and the single engine invocation.
//!
//! The executor renders the agent persona and template into one prompt,
//! calls the completion engine exactly once, and wraps whatever comes back.
//! Engine text that parses as JSON is carried structured; anything else is
//! carried as a string. No schema validation happens here.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::agent::TaskDescriptor;
use crate::engine::{CompletionEngine, CompletionRequest};
use crate::error::Error;
use crate::prompts::Prompts;

/// Flat input mapping handed to a task execution.
///
/// Keys match template placeholder names one to one. Values keep their JSON
/// type until substitution, where non-strings render in their canonical
/// JSON form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskInputs {
    values: BTreeMap<String, Value>,
}

impl TaskInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// String form of an input for prompt substitution.
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.values.get(name).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Raw payload produced by one task execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskOutput(pub Value);

impl TaskOutput {
    /// Wrap engine text, parsing it when it happens to be well-formed JSON.
    pub fn from_engine_text(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Self(value),
            Err(_) => Self(Value::String(text)),
        }
    }

    /// String form injected into downstream prompts: strings verbatim,
    /// structured values in canonical JSON.
    pub fn as_prompt_value(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Renders prompts and runs them through the shared completion engine.
pub struct TaskExecutor {
    engine: Arc<dyn CompletionEngine>,
    prompts: Prompts,
}

impl TaskExecutor {
    pub fn new(engine: Arc<dyn CompletionEngine>) -> Self {
        Self {
            engine,
            prompts: Prompts::new(),
        }
    }

    /// Execute one task: assemble the prompt, call the engine once, wrap the
    /// output. Failures propagate without partial effects.
    #[instrument(skip(self, descriptor, inputs), fields(capability = %descriptor.capability))]
    pub async fn execute(
        &self,
        descriptor: &TaskDescriptor,
        inputs: &TaskInputs,
    ) -> Result<TaskOutput, Error> {
        let invocation_id = Uuid::new_v4();
        let prompt = self.assemble_prompt(descriptor, inputs)?;
        debug!(%invocation_id, prompt_len = prompt.len(), "dispatching completion");

        let request =
            CompletionRequest::new(prompt).with_refine_budget(descriptor.agent.refine_budget);
        let text = self.engine.complete(request).await?;

        info!(%invocation_id, output_len = text.len(), "task completed");
        Ok(TaskOutput::from_engine_text(text))
    }

    fn assemble_prompt(
        &self,
        descriptor: &TaskDescriptor,
        inputs: &TaskInputs,
    ) -> Result<String, Error> {
        let agent = &descriptor.agent;
        let body = self.prompts.render(agent.template, agent.placeholders, inputs)?;
        Ok(format!(
            "You are {role}. {backstory}\nYour goal: {goal}\n\n{body}\nExpected output: {expected}\n",
            role = agent.role,
            backstory = agent.backstory,
            goal = agent.goal,
            body = body,
            expected = descriptor.expected_output,
        ))
    }
}
