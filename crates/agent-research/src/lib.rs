//! Deep research over web search and a structured-output LLM
//!
//! Given a stock ticker (`NVDA`) or a free-text topic, this crate runs a fixed
//! pipeline:
//!
//! - Classify the query as ticker or free text
//! - Run one discovery search and resolve the subject behind the query
//! - Generate 3-4 non-overlapping research angles
//! - Search every angle concurrently, tolerating failed branches
//! - Synthesize a structured [`ResearchReport`] with cited evidence
//!
//! Every model answer is validated against a strict schema; the final report
//! holds exactly one section per angle and every evidence item cites a source.
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_research::{ResearchConfig, ResearchPipeline, format};
//!
//! #[tokio::main]
//! async fn main() -> agent_research::Result<()> {
//!     let config = ResearchConfig::from_env()?;
//!     let pipeline = ResearchPipeline::from_config(&config)?;
//!
//!     let report = pipeline.run("NVDA").await?;
//!     println!("{}", format::to_markdown(&report));
//!
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fanout;
pub mod format;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod search;

pub use classifier::{QueryKind, classify};
pub use config::{LlmBackend, ModelSpec, ResearchConfig, ResearchConfigBuilder, SearchBackend};
pub use error::{ResearchError, Result};
pub use fanout::{BranchOutcome, DeepDive, deep_dive};
pub use models::{Evidence, ReportSection, ResearchReport, ResolvedQuery, SearchAngles, Source, Swot};
pub use pipeline::{ResearchPipeline, create_llm_provider, research_blocking};
pub use search::{SearchHit, SearchProvider, create_search_provider};
