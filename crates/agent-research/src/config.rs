//! Configuration for research runs

use crate::error::{Result, ResearchError};
use agent_utils::env_var;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Model used when `MODEL` is not set
pub const DEFAULT_MODEL: &str = "openai:gpt-5-mini";

/// LLM service backing the structured calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LlmBackend {
    /// OpenAI or any OpenAI-compatible endpoint
    OpenAI,
    /// Anthropic messages API
    Anthropic,
}

impl LlmBackend {
    /// Environment variable holding the API key for this backend
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => f.write_str("openai"),
            Self::Anthropic => f.write_str("anthropic"),
        }
    }
}

impl FromStr for LlmBackend {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(ResearchError::ConfigError(format!(
                "unknown LLM provider '{other}' (expected openai or anthropic)"
            ))),
        }
    }
}

/// A `provider:model` pair such as `openai:gpt-5-mini`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub backend: LlmBackend,
    pub model: String,
}

impl ModelSpec {
    /// Parse a model identifier
    ///
    /// The text before the first `:` names the provider; a bare name means
    /// OpenAI. Local model names containing a colon need the explicit
    /// prefix, e.g. `openai:llama3:8b`.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(ResearchError::ConfigError("model name is empty".to_string()));
        }

        let (backend, model) = match spec.split_once(':') {
            Some((prefix, model)) => (prefix.parse::<LlmBackend>()?, model.trim()),
            None => (LlmBackend::OpenAI, spec),
        };
        if model.is_empty() {
            return Err(ResearchError::ConfigError(format!(
                "model name missing in '{spec}'"
            )));
        }

        Ok(Self {
            backend,
            model: model.to_string(),
        })
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.backend, self.model)
    }
}

/// Web search service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchBackend {
    /// DuckDuckGo web results page (default, no API key required)
    #[default]
    DuckDuckGo,
    /// Brave Search API (requires API key)
    Brave,
}

impl fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuckDuckGo => f.write_str("duckduckgo"),
            Self::Brave => f.write_str("brave"),
        }
    }
}

impl FromStr for SearchBackend {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duckduckgo" | "ddg" => Ok(Self::DuckDuckGo),
            "brave" => Ok(Self::Brave),
            other => Err(ResearchError::ConfigError(format!(
                "unknown search provider '{other}' (expected duckduckgo or brave)"
            ))),
        }
    }
}

/// Configuration for research runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Model for every structured call
    pub model: ModelSpec,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Anthropic API key
    pub anthropic_api_key: Option<String>,

    /// OpenAI-compatible base URL override
    pub openai_api_base: Option<String>,

    /// Web search service
    pub search_backend: SearchBackend,

    /// Brave Search API key
    pub brave_api_key: Option<String>,

    /// Hits requested by the discovery search
    pub discovery_results: usize,

    /// Hits requested per deep-dive search
    pub deep_dive_results: usize,

    /// Discovery hits shown to the angle generator
    pub angle_context_hits: usize,

    /// Hits per angle shown to the report synthesizer
    pub report_context_hits: usize,

    /// Token ceiling per model answer
    pub max_tokens: usize,

    /// Sampling temperature; unset leaves the provider default
    pub temperature: Option<f32>,

    /// Timeout for LLM requests
    pub llm_timeout: Duration,

    /// Timeout for search requests
    pub search_timeout: Duration,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            model: ModelSpec {
                backend: LlmBackend::OpenAI,
                model: "gpt-5-mini".to_string(),
            },
            openai_api_key: None,
            anthropic_api_key: None,
            openai_api_base: None,
            search_backend: SearchBackend::DuckDuckGo,
            brave_api_key: None,
            discovery_results: 10,
            deep_dive_results: 10,
            angle_context_hits: 15,
            report_context_hits: 8,
            max_tokens: 16_000,
            temperature: None,
            llm_timeout: Duration::from_secs(300),
            search_timeout: Duration::from_secs(15),
        }
    }
}

impl ResearchConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResearchConfigBuilder {
        ResearchConfigBuilder::default()
    }

    /// Build and validate a configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }

    /// API key for the configured LLM backend
    pub fn llm_api_key(&self) -> Option<&str> {
        match self.model.backend {
            LlmBackend::OpenAI => self.openai_api_key.as_deref(),
            LlmBackend::Anthropic => self.anthropic_api_key.as_deref(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Local OpenAI-compatible servers usually run without a key
        let keyless_local =
            self.model.backend == LlmBackend::OpenAI && self.openai_api_base.is_some();
        if self.llm_api_key().is_none() && !keyless_local {
            return Err(ResearchError::ConfigError(format!(
                "{} is required for model '{}'",
                self.model.backend.api_key_var(),
                self.model
            )));
        }

        if self.search_backend == SearchBackend::Brave && self.brave_api_key.is_none() {
            return Err(ResearchError::ConfigError(
                "BRAVE_SEARCH_API_KEY is required when using the brave search provider"
                    .to_string(),
            ));
        }

        if self.discovery_results == 0 || self.deep_dive_results == 0 {
            return Err(ResearchError::ConfigError(
                "search result counts must be greater than 0".to_string(),
            ));
        }

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ResearchError::ConfigError(format!(
                    "temperature {t} is outside 0.0..=2.0"
                )));
            }
        }

        Ok(())
    }
}

/// Builder for ResearchConfig
#[derive(Debug, Default)]
pub struct ResearchConfigBuilder {
    model: Option<String>,
    openai_api_key: Option<String>,
    anthropic_api_key: Option<String>,
    openai_api_base: Option<String>,
    search_backend: Option<String>,
    brave_api_key: Option<String>,
    discovery_results: Option<usize>,
    deep_dive_results: Option<usize>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    llm_timeout: Option<Duration>,
    search_timeout: Option<Duration>,
}

impl ResearchConfigBuilder {
    /// Set the model as `provider:model`
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the OpenAI API key
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the Anthropic API key
    pub fn anthropic_api_key(mut self, key: impl Into<String>) -> Self {
        self.anthropic_api_key = Some(key.into());
        self
    }

    /// Set an OpenAI-compatible base URL
    pub fn openai_api_base(mut self, base: impl Into<String>) -> Self {
        self.openai_api_base = Some(base.into());
        self
    }

    /// Set the search provider by name (`duckduckgo` or `brave`)
    pub fn search_backend(mut self, backend: impl Into<String>) -> Self {
        self.search_backend = Some(backend.into());
        self
    }

    /// Set the Brave Search API key
    pub fn brave_api_key(mut self, key: impl Into<String>) -> Self {
        self.brave_api_key = Some(key.into());
        self
    }

    /// Set the discovery search size
    pub fn discovery_results(mut self, count: usize) -> Self {
        self.discovery_results = Some(count);
        self
    }

    /// Set the per-angle search size
    pub fn deep_dive_results(mut self, count: usize) -> Self {
        self.deep_dive_results = Some(count);
        self
    }

    /// Set the token ceiling per answer
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the LLM request timeout
    pub fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = Some(timeout);
        self
    }

    /// Set the search request timeout
    pub fn search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = Some(timeout);
        self
    }

    /// Fill unset fields from the process environment
    pub fn with_env(self) -> Self {
        self.with_env_from(env_var)
    }

    /// Fill unset fields from `lookup`
    ///
    /// Reads `MODEL`, `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `OPENAI_API_BASE`,
    /// `SEARCH_PROVIDER` and `BRAVE_SEARCH_API_KEY`. Values already set on the
    /// builder win.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        self.model = self.model.or_else(|| lookup("MODEL"));
        self.openai_api_key = self.openai_api_key.or_else(|| lookup("OPENAI_API_KEY"));
        self.anthropic_api_key = self.anthropic_api_key.or_else(|| lookup("ANTHROPIC_API_KEY"));
        self.openai_api_base = self.openai_api_base.or_else(|| lookup("OPENAI_API_BASE"));
        self.search_backend = self.search_backend.or_else(|| lookup("SEARCH_PROVIDER"));
        self.brave_api_key = self.brave_api_key.or_else(|| lookup("BRAVE_SEARCH_API_KEY"));
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResearchConfig> {
        let defaults = ResearchConfig::default();

        let model = ModelSpec::parse(self.model.as_deref().unwrap_or(DEFAULT_MODEL))?;
        let search_backend = match self.search_backend {
            Some(name) => name.parse()?,
            None => defaults.search_backend,
        };

        let config = ResearchConfig {
            model,
            openai_api_key: self.openai_api_key,
            anthropic_api_key: self.anthropic_api_key,
            openai_api_base: self.openai_api_base,
            search_backend,
            brave_api_key: self.brave_api_key,
            discovery_results: self.discovery_results.unwrap_or(defaults.discovery_results),
            deep_dive_results: self.deep_dive_results.unwrap_or(defaults.deep_dive_results),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            llm_timeout: self.llm_timeout.unwrap_or(defaults.llm_timeout),
            search_timeout: self.search_timeout.unwrap_or(defaults.search_timeout),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_model_spec_parse() {
        let spec = ModelSpec::parse("openai:gpt-5-mini").unwrap();
        assert_eq!(spec.backend, LlmBackend::OpenAI);
        assert_eq!(spec.model, "gpt-5-mini");

        let spec = ModelSpec::parse("anthropic:claude-sonnet-4-5").unwrap();
        assert_eq!(spec.backend, LlmBackend::Anthropic);
        assert_eq!(spec.to_string(), "anthropic:claude-sonnet-4-5");

        let spec = ModelSpec::parse("gpt-4o").unwrap();
        assert_eq!(spec.backend, LlmBackend::OpenAI);

        let spec = ModelSpec::parse("openai:llama3:8b").unwrap();
        assert_eq!(spec.backend, LlmBackend::OpenAI);
        assert_eq!(spec.model, "llama3:8b");

        assert!(ModelSpec::parse("").is_err());
        assert!(ModelSpec::parse("openai:").is_err());
        assert!(matches!(
            ModelSpec::parse("ollama:llama3"),
            Err(ResearchError::ConfigError(msg)) if msg.contains("ollama")
        ));
    }

    #[test]
    fn test_search_backend_parse() {
        assert_eq!("duckduckgo".parse::<SearchBackend>().unwrap(), SearchBackend::DuckDuckGo);
        assert_eq!("Brave".parse::<SearchBackend>().unwrap(), SearchBackend::Brave);
        assert!("bing".parse::<SearchBackend>().is_err());
    }

    #[test]
    fn test_default_config_from_env() {
        let config = ResearchConfig::builder()
            .with_env_from(env(&[("OPENAI_API_KEY", "sk-test")]))
            .build()
            .unwrap();

        assert_eq!(config.model.to_string(), DEFAULT_MODEL);
        assert_eq!(config.llm_api_key(), Some("sk-test"));
        assert_eq!(config.search_backend, SearchBackend::DuckDuckGo);
        assert_eq!(config.discovery_results, 10);
        assert_eq!(config.report_context_hits, 8);
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let result = ResearchConfig::builder().with_env_from(env(&[])).build();
        match result {
            Err(ResearchError::ConfigError(msg)) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("Expected config error, got {other:?}"),
        }

        let result = ResearchConfig::builder()
            .with_env_from(env(&[
                ("MODEL", "anthropic:claude-sonnet-4-5"),
                ("OPENAI_API_KEY", "sk-test"),
            ]))
            .build();
        match result {
            Err(ResearchError::ConfigError(msg)) => assert!(msg.contains("ANTHROPIC_API_KEY")),
            other => panic!("Expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_local_openai_base_without_key() {
        let config = ResearchConfig::builder()
            .openai_api_base("http://localhost:1234/v1")
            .model("qwen2.5-7b-instruct")
            .build()
            .unwrap();
        assert_eq!(config.llm_api_key(), None);
    }

    #[test]
    fn test_builder_overrides_env() {
        let config = ResearchConfig::builder()
            .model("anthropic:claude-sonnet-4-5")
            .with_env_from(env(&[
                ("MODEL", "openai:gpt-4o"),
                ("ANTHROPIC_API_KEY", "ak-test"),
            ]))
            .build()
            .unwrap();

        assert_eq!(config.model.backend, LlmBackend::Anthropic);
        assert_eq!(config.llm_api_key(), Some("ak-test"));
    }

    #[test]
    fn test_brave_requires_key() {
        let result = ResearchConfig::builder()
            .openai_api_key("sk-test")
            .search_backend("brave")
            .build();
        assert!(matches!(result, Err(ResearchError::ConfigError(_))));

        let config = ResearchConfig::builder()
            .openai_api_key("sk-test")
            .search_backend("brave")
            .brave_api_key("bk-test")
            .build()
            .unwrap();
        assert_eq!(config.search_backend, SearchBackend::Brave);
    }

    #[test]
    fn test_validation_bounds() {
        let config = ResearchConfig {
            openai_api_key: Some("sk-test".to_string()),
            deep_dive_results: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ResearchConfig {
            openai_api_key: Some("sk-test".to_string()),
            temperature: Some(3.5),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
