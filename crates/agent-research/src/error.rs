//! Error types for research operations

use thiserror::Error;

/// Research pipeline errors
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Blank input
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// Missing or invalid configuration, raised before any network call
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A web search call failed
    #[error("Search failed for '{query}': {reason}")]
    SearchFailed { query: String, reason: String },

    /// The discovery search came back empty, so there is nothing to resolve against
    #[error("Discovery search returned no results for '{0}'")]
    NoDiscoveryResults(String),

    /// LLM provider error, including schema validation of structured answers
    #[error("LLM error: {0}")]
    LlmError(#[from] agent_llm::LLMError),

    /// The model answered with a well-formed object that breaks a report invariant
    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    /// Prompt template failed to render
    #[error("Prompt error in '{name}': {detail}")]
    PromptError { name: String, detail: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Local I/O (runtime construction)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for research operations
pub type Result<T> = std::result::Result<T, ResearchError>;

impl ResearchError {
    /// Whether the failure came from a malformed or invalid model answer
    pub fn is_model_output_error(&self) -> bool {
        matches!(
            self,
            ResearchError::InvalidModelOutput(_)
                | ResearchError::LlmError(agent_llm::LLMError::SchemaValidation { .. })
        )
    }
}
