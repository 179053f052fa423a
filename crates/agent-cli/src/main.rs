//! Command-line interface for deep-research
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//!
//! deep-research NVDA
//! deep-research --markdown --output report.md "solid-state battery makers"
//! deep-research --model anthropic:claude-sonnet-4-5 --search brave AAPL
//! ```

use agent_research::{ResearchConfig, ResearchPipeline, format};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "deep-research", version)]
#[command(about = "Research a stock ticker or topic and print a cited report", long_about = None)]
struct Args {
    /// Ticker (e.g. NVDA) or free-text research question
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Print the full Markdown report instead of the summary
    #[arg(long)]
    markdown: bool,

    /// Also write the Markdown report to this file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Model as provider:model (overrides MODEL)
    #[arg(long, value_name = "PROVIDER:MODEL")]
    model: Option<String>,

    /// Search backend: duckduckgo or brave (overrides SEARCH_PROVIDER)
    #[arg(long, value_name = "BACKEND")]
    search: Option<String>,
}

impl Args {
    fn query(&self) -> String {
        self.query.join(" ").trim().to_string()
    }

    fn config(&self) -> agent_research::Result<ResearchConfig> {
        let mut builder = ResearchConfig::builder();
        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        if let Some(search) = &self.search {
            builder = builder.search_backend(search);
        }
        builder.with_env().build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agent_utils::load_dotenv();
    agent_utils::init_tracing_with_default("warn,agent_research=info,deep_research=info");

    let args = Args::parse();
    let query = args.query();
    anyhow::ensure!(!query.is_empty(), "query cannot be empty");

    let config = args.config()?;
    let pipeline = ResearchPipeline::from_config(&config)?;

    info!("Running research for: {:?}", query);
    let report = pipeline.run(&query).await?;
    let markdown = format::to_markdown(&report);

    if let Some(path) = &args.output {
        tokio::fs::write(path, &markdown)
            .await
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    if args.markdown {
        println!("{markdown}");
    } else {
        println!("\n--- REPORT ---\n");
        println!("{}", format::to_summary(&report));
        if args.output.is_none() {
            println!("Run with --markdown for the full report.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_words_are_joined() {
        let args = Args::try_parse_from(["deep-research", "solid-state", "battery", "makers"]).unwrap();
        assert_eq!(args.query(), "solid-state battery makers");
        assert!(!args.markdown);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "deep-research",
            "--markdown",
            "-o",
            "nvda.md",
            "--model",
            "anthropic:claude-sonnet-4-5",
            "--search",
            "brave",
            "NVDA",
        ])
        .unwrap();

        assert!(args.markdown);
        assert_eq!(args.output, Some(PathBuf::from("nvda.md")));
        assert_eq!(args.model.as_deref(), Some("anthropic:claude-sonnet-4-5"));
        assert_eq!(args.query(), "NVDA");
    }

    #[test]
    fn test_query_is_required() {
        assert!(Args::try_parse_from(["deep-research"]).is_err());
    }

    #[test]
    fn test_unknown_search_backend_fails_config() {
        let args =
            Args::try_parse_from(["deep-research", "--search", "bing", "--model", "gpt-4o", "NVDA"])
                .unwrap();
        assert!(args.config().is_err());
    }
}
