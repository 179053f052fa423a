//! Structured (schema-validated) completions
//!
//! A [`StructuredOutput`] type describes itself with a JSON schema. The
//! request carries that schema both as a provider response format and in the
//! system prompt, and the answer is deserialized strictly into the type.
//! Anything that does not parse, or parses but fails [`StructuredOutput::validate`],
//! is a [`LLMError::SchemaValidation`].

use crate::{CompletionRequest, LLMError, LLMProvider, ResponseFormat, Result, StopReason};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

/// A type the model can be asked to produce
pub trait StructuredOutput: DeserializeOwned + Send {
    /// Schema name sent to the provider (letters, digits, underscores)
    const SCHEMA_NAME: &'static str;

    /// JSON schema the answer must match
    fn json_schema() -> Value;

    /// Checks serde cannot express (lengths, non-empty strings)
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Locate the JSON object in a model answer
///
/// Tolerates Markdown code fences and prose around the object. Returns the
/// slice from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse and validate a model answer as `T`
pub fn parse_structured<T: StructuredOutput>(text: &str) -> Result<T> {
    let invalid = |detail: String| LLMError::SchemaValidation {
        schema: T::SCHEMA_NAME.to_string(),
        detail,
    };

    let json = extract_json(text).ok_or_else(|| invalid("no JSON object in answer".to_string()))?;
    let value: T = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;
    value.validate().map_err(invalid)?;
    Ok(value)
}

/// Append the schema contract to a system prompt
fn schema_instructions<T: StructuredOutput>(system: Option<String>) -> String {
    let schema = serde_json::to_string_pretty(&T::json_schema()).unwrap_or_default();
    let contract = format!(
        "Respond with a single JSON object and nothing else. \
         It must match this JSON schema exactly (no extra fields):\n{schema}"
    );
    match system {
        Some(system) if !system.is_empty() => format!("{system}\n\n{contract}"),
        _ => contract,
    }
}

/// Ask `provider` for a `T`
///
/// The request's system prompt is extended with the schema and its response
/// format is set to the schema of `T`.
#[instrument(skip(provider, request), fields(schema = T::SCHEMA_NAME, model = %request.model))]
pub async fn complete_structured<T: StructuredOutput>(
    provider: &dyn LLMProvider,
    mut request: CompletionRequest,
) -> Result<T> {
    request.system = Some(schema_instructions::<T>(request.system.take()));
    request.response_format = Some(ResponseFormat::JsonSchema {
        name: T::SCHEMA_NAME.to_string(),
        schema: T::json_schema(),
    });

    let response = provider.complete(request).await?;
    debug!(
        "Structured answer received - stop_reason: {:?}, tokens: {}",
        response.stop_reason,
        response.usage.total()
    );

    if response.stop_reason == StopReason::MaxTokens {
        return Err(LLMError::SchemaValidation {
            schema: T::SCHEMA_NAME.to_string(),
            detail: "answer truncated at max_tokens".to_string(),
        });
    }

    let text = response.message.text().ok_or_else(|| LLMError::SchemaValidation {
        schema: T::SCHEMA_NAME.to_string(),
        detail: "answer contained no text".to_string(),
    })?;

    parse_structured(&text)
}
