//! LLM provider abstraction layer for deep-research
//!
//! This crate provides provider-agnostic abstractions for asking a Large
//! Language Model for structured output. It includes:
//!
//! - Message types for LLM communication
//! - Completion request/response types, including JSON response formats
//! - JSON schema helpers for describing expected outputs
//! - Structured-output parsing that fails closed on malformed responses
//! - Provider trait for LLM implementations
//! - Concrete provider implementations (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod schema;
pub mod structured;

// Re-export main types
pub use completion::{
    CompletionRequest, CompletionResponse, ResponseFormat, StopReason, TokenUsage,
};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use structured::{StructuredOutput, complete_structured, parse_structured};

// Provider implementations (feature-gated)
#[cfg(any(feature = "anthropic", feature = "openai"))]
pub mod providers;
