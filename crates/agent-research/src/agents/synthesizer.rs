//! Report synthesis from all gathered search results

use super::ModelClient;
use crate::error::{Result, ResearchError};
use crate::fanout::DeepDive;
use crate::models::{ResearchReport, ResolvedQuery, SearchAngles};
use crate::prompts::REPORT;
use crate::search::SearchHit;
use agent_llm::StructuredOutput;
use serde::Serialize;
use tracing::{info, instrument};

#[derive(Serialize)]
struct DiveContext<'a> {
    angle: &'a str,
    hits: &'a [SearchHit],
}

#[derive(Serialize)]
struct ReportContext<'a> {
    context: String,
    search_query: &'a str,
    discovery: &'a [SearchHit],
    dives: Vec<DiveContext<'a>>,
}

/// Turns the resolved subject and every search result into a report
pub struct ReportSynthesizer {
    model: ModelClient,
    discovery_hits: usize,
    hits_per_angle: usize,
}

impl ReportSynthesizer {
    pub fn new(model: ModelClient, discovery_hits: usize, hits_per_angle: usize) -> Self {
        Self {
            model,
            discovery_hits,
            hits_per_angle,
        }
    }

    /// Ask for the report and check it against the angles
    ///
    /// Failed branches reach the model as "no results". The answer must hold
    /// one section per angle and every evidence item must carry a source.
    #[instrument(skip_all, fields(subject = %resolved.subject, angles = angles.len()))]
    pub async fn synthesize(
        &self,
        resolved: &ResolvedQuery,
        angles: &SearchAngles,
        discovery: &[SearchHit],
        dives: &[DeepDive],
    ) -> Result<ResearchReport> {
        info!("Synthesizing structured report");

        let vars = ReportContext {
            context: resolved.context_line(),
            search_query: &resolved.search_query,
            discovery: cap(discovery, self.discovery_hits),
            dives: dives
                .iter()
                .map(|dive| DiveContext {
                    angle: &dive.angle,
                    hits: cap(dive.hits(), self.hits_per_angle),
                })
                .collect(),
        };

        let report: ResearchReport = self.model.ask(&REPORT, &vars).await?;
        report.validate_against(angles).map_err(|detail| {
            ResearchError::InvalidModelOutput(format!("{}: {detail}", ResearchReport::SCHEMA_NAME))
        })?;

        info!(
            "Report ready: {} sections, {} evidence items, {} sources",
            report.sections.len(),
            report.evidence_count(),
            report.sources.len()
        );
        Ok(report)
    }
}

fn cap(hits: &[SearchHit], limit: usize) -> &[SearchHit] {
    &hits[..hits.len().min(limit)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedProvider;
    use crate::config::ResearchConfig;
    use crate::fanout::BranchOutcome;
    use crate::models::tests::sample_report;
    use std::sync::Arc;

    fn resolved() -> ResolvedQuery {
        ResolvedQuery {
            is_ticker: true,
            subject: "NVIDIA".to_string(),
            keywords: vec!["GPUs".to_string(), "AI".to_string()],
            search_query: "NVIDIA GPUs AI".to_string(),
        }
    }

    fn angles(n: usize) -> SearchAngles {
        SearchAngles {
            angles: (0..n).map(|i| format!("angle {i}")).collect(),
        }
    }

    fn hits(prefix: &str, n: usize) -> Vec<SearchHit> {
        (1..=n)
            .map(|i| SearchHit::new(format!("https://e.com/{prefix}/{i}"), format!("{prefix} {i}"), "s"))
            .collect()
    }

    fn dives(n: usize) -> Vec<DeepDive> {
        (0..n)
            .map(|i| DeepDive {
                angle: format!("angle {i}"),
                outcome: if i == 1 {
                    BranchOutcome::Failed("HTTP 503".to_string())
                } else {
                    BranchOutcome::Hits(hits(&format!("a{i}"), 12))
                },
            })
            .collect()
    }

    fn synthesizer(provider: Arc<ScriptedProvider>) -> ReportSynthesizer {
        ReportSynthesizer::new(ModelClient::new(provider, &ResearchConfig::default()), 15, 8)
    }

    #[tokio::test]
    async fn test_synthesize_builds_context() {
        let provider = Arc::new(ScriptedProvider::new().answer(
            "research_report",
            serde_json::to_value(sample_report(3)).unwrap(),
        ));

        let report = synthesizer(provider.clone())
            .synthesize(&resolved(), &angles(3), &hits("d", 20), &dives(3))
            .await
            .unwrap();
        assert_eq!(report.sections.len(), 3);

        let input = provider.last_input("research_report").unwrap();
        assert!(input.contains("report on NVIDIA (GPUs, AI)"));
        assert!(input.contains("15. d 15"));
        assert!(!input.contains("d 16"));
        assert!(input.contains("8. a0 8"));
        assert!(!input.contains("a0 9"));
        assert!(input.contains("--- Deep-dive angle 2: angle 1 ---\n(no results)"));
    }

    #[tokio::test]
    async fn test_section_count_mismatch_rejected() {
        let provider = Arc::new(ScriptedProvider::new().answer(
            "research_report",
            serde_json::to_value(sample_report(2)).unwrap(),
        ));

        let err = synthesizer(provider)
            .synthesize(&resolved(), &angles(3), &hits("d", 5), &dives(3))
            .await
            .unwrap_err();

        assert!(matches!(&err, ResearchError::InvalidModelOutput(msg) if msg.contains("2 sections for 3 angles")));
        assert!(err.is_model_output_error());
    }

    #[tokio::test]
    async fn test_evidence_without_source_rejected() {
        let mut report = sample_report(3);
        report.sections[0].evidence[0].source.url = String::new();
        let provider = Arc::new(
            ScriptedProvider::new()
                .answer("research_report", serde_json::to_value(report).unwrap()),
        );

        let err = synthesizer(provider)
            .synthesize(&resolved(), &angles(3), &hits("d", 5), &dives(3))
            .await
            .unwrap_err();
        assert!(err.is_model_output_error());
    }
}
