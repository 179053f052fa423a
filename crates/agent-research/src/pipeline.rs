//! The research pipeline driver
//!
//! classify -> resolve (discovery search) -> angles -> deep-dive fan-out -> report

use crate::agents::{AngleGenerator, EntityResolver, ModelClient, ReportSynthesizer};
use crate::classifier::classify;
use crate::config::{LlmBackend, ResearchConfig};
use crate::error::{Result, ResearchError};
use crate::fanout::deep_dive;
use crate::models::ResearchReport;
use crate::search::{SearchProvider, create_search_provider};
use agent_llm::LLMProvider;
use agent_llm::providers::{AnthropicProvider, OpenAIConfig, OpenAIProvider};
use std::sync::Arc;
use tracing::{info, instrument};

/// OpenAI client settings for `config`
///
/// A custom `OPENAI_API_BASE` usually means a local OpenAI-compatible server,
/// which gets `json_object` requests instead of full JSON schemas.
fn openai_config(config: &ResearchConfig) -> OpenAIConfig {
    // Keyless local servers still expect a bearer header
    let key = config.llm_api_key().unwrap_or("not-needed");
    let openai = OpenAIConfig::new(key).with_timeout(config.llm_timeout.as_secs());
    match &config.openai_api_base {
        Some(base) => openai.with_api_base(base).with_structured_outputs(false),
        None => openai,
    }
}

/// Build the LLM provider selected in `config`
pub fn create_llm_provider(config: &ResearchConfig) -> Result<Arc<dyn LLMProvider>> {
    match config.model.backend {
        LlmBackend::OpenAI => Ok(Arc::new(OpenAIProvider::with_config(openai_config(config))?)),
        LlmBackend::Anthropic => {
            let key = config.llm_api_key().ok_or_else(|| {
                ResearchError::ConfigError("ANTHROPIC_API_KEY is not set".to_string())
            })?;
            Ok(Arc::new(AnthropicProvider::with_timeout(
                key,
                config.llm_timeout.as_secs(),
            )?))
        }
    }
}

/// Runs the whole research sequence for one query
pub struct ResearchPipeline {
    search: Arc<dyn SearchProvider>,
    resolver: EntityResolver,
    angles: AngleGenerator,
    synthesizer: ReportSynthesizer,
    deep_dive_results: usize,
}

impl ResearchPipeline {
    /// Assemble a pipeline over explicit providers
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        search: Arc<dyn SearchProvider>,
        config: &ResearchConfig,
    ) -> Self {
        let model = ModelClient::new(provider, config);
        Self {
            resolver: EntityResolver::new(
                model.clone(),
                Arc::clone(&search),
                config.discovery_results,
                config.angle_context_hits,
            ),
            angles: AngleGenerator::new(model.clone(), config.angle_context_hits),
            synthesizer: ReportSynthesizer::new(
                model,
                config.angle_context_hits,
                config.report_context_hits,
            ),
            search,
            deep_dive_results: config.deep_dive_results,
        }
    }

    /// Assemble a pipeline with the providers `config` selects
    pub fn from_config(config: &ResearchConfig) -> Result<Self> {
        config.validate()?;
        let provider = create_llm_provider(config)?;
        let search = create_search_provider(config)?;
        info!(
            "Using model {} with {} search",
            config.model, config.search_backend
        );
        Ok(Self::new(provider, search, config))
    }

    /// Research `query` and return the report
    ///
    /// A blank query is rejected before any network call. Deep-dive search
    /// failures only thin out the report; every other failure is returned.
    #[instrument(skip(self))]
    pub async fn run(&self, query: &str) -> Result<ResearchReport> {
        let kind = classify(query);
        if kind.text().is_empty() {
            return Err(ResearchError::EmptyQuery);
        }

        info!("Input: {:?}", kind.text());
        if kind.is_ticker() {
            info!("Detected ticker, resolving to company and context");
        } else {
            info!("Treating input as free-text query");
        }

        let resolution = self.resolver.resolve(&kind).await?;
        let angles = self
            .angles
            .generate(&resolution.resolved, &resolution.discovery)
            .await?;
        let dives = deep_dive(self.search.as_ref(), &angles, self.deep_dive_results).await;

        self.synthesizer
            .synthesize(&resolution.resolved, &angles, &resolution.discovery, &dives)
            .await
    }

    /// Blocking form of [`run`](Self::run) for synchronous callers
    ///
    /// Builds its own runtime, so it must not be called from inside one.
    pub fn run_blocking(&self, query: &str) -> Result<ResearchReport> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run(query))
    }
}

/// Research `query` with configuration from `.env` and the environment,
/// blocking until done
pub fn research_blocking(query: &str) -> Result<ResearchReport> {
    if query.trim().is_empty() {
        return Err(ResearchError::EmptyQuery);
    }
    agent_utils::load_dotenv();
    let config = ResearchConfig::from_env()?;
    ResearchPipeline::from_config(&config)?.run_blocking(query)
}
