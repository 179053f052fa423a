//! The model-backed pipeline stages

pub mod angles;
pub mod resolver;
pub mod synthesizer;

pub use angles::AngleGenerator;
pub use resolver::{EntityResolver, Resolution};
pub use synthesizer::ReportSynthesizer;

use crate::config::ResearchConfig;
use crate::error::Result;
use crate::prompts::Prompt;
use agent_llm::{CompletionRequest, LLMProvider, Message, StructuredOutput, complete_structured};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// A provider bound to the model settings every stage shares
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn LLMProvider>,
    model: String,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ResearchConfig) -> Self {
        Self {
            provider,
            model: config.model.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Render `prompt` with `vars` and ask for a `T`
    pub async fn ask<T: StructuredOutput>(&self, prompt: &Prompt, vars: &impl Serialize) -> Result<T> {
        let input = prompt.render(vars)?;
        debug!(
            prompt = prompt.name,
            provider = self.provider.name(),
            chars = input.len(),
            "Sending structured request"
        );

        let request = CompletionRequest::builder(&self.model)
            .system(prompt.system)
            .add_message(Message::user(input))
            .max_tokens(self.max_tokens)
            .maybe_temperature(self.temperature)
            .build();

        Ok(complete_structured::<T>(self.provider.as_ref(), request).await?)
    }
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
