//! Angle generation

use super::ModelClient;
use crate::error::Result;
use crate::models::{ResolvedQuery, SearchAngles};
use crate::prompts::ANGLES;
use crate::search::SearchHit;
use serde_json::json;
use tracing::{info, instrument};

/// Splits a resolved subject into 3-4 independent search directions
pub struct AngleGenerator {
    model: ModelClient,
    context_hits: usize,
}

impl AngleGenerator {
    pub fn new(model: ModelClient, context_hits: usize) -> Self {
        Self {
            model,
            context_hits,
        }
    }

    #[instrument(skip_all, fields(subject = %resolved.subject))]
    pub async fn generate(
        &self,
        resolved: &ResolvedQuery,
        discovery: &[SearchHit],
    ) -> Result<SearchAngles> {
        info!("Generating 3-4 search angles");

        let hits = &discovery[..discovery.len().min(self.context_hits)];
        let angles: SearchAngles = self
            .model
            .ask(
                &ANGLES,
                &json!({
                    "context": resolved.context_line(),
                    "is_ticker": resolved.is_ticker,
                    "search_query": resolved.search_query,
                    "hits": hits,
                }),
            )
            .await?;

        info!("Angles: {:?}", angles.angles);
        Ok(angles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedProvider;
    use crate::config::ResearchConfig;
    use std::sync::Arc;

    fn resolved() -> ResolvedQuery {
        ResolvedQuery {
            is_ticker: true,
            subject: "NVIDIA".to_string(),
            keywords: vec!["GPUs".to_string()],
            search_query: "NVIDIA GPUs".to_string(),
        }
    }

    fn discovery(n: usize) -> Vec<SearchHit> {
        (1..=n)
            .map(|i| SearchHit::new(format!("https://e.com/{i}"), format!("Hit {i}"), "snippet"))
            .collect()
    }

    #[tokio::test]
    async fn test_generate_caps_prompt_hits() {
        let provider = Arc::new(ScriptedProvider::new().answer(
            "search_angles",
            json!({"angles": [
                "NVIDIA SWOT analysis",
                "NVIDIA stock performance last 12 months",
                "NVIDIA competition AMD Intel market share",
                "NVIDIA latest quarterly results guidance"
            ]}),
        ));
        let generator =
            AngleGenerator::new(ModelClient::new(provider.clone(), &ResearchConfig::default()), 15);

        let angles = generator.generate(&resolved(), &discovery(20)).await.unwrap();
        assert_eq!(angles.len(), 4);

        let input = provider.last_input("search_angles").unwrap();
        assert!(input.contains("Subject: NVIDIA (GPUs)"));
        assert!(input.contains("15. Hit 15"));
        assert!(!input.contains("Hit 16"));
    }

    #[tokio::test]
    async fn test_too_few_angles_rejected() {
        let provider = Arc::new(
            ScriptedProvider::new().answer("search_angles", json!({"angles": ["only one", "two"]})),
        );
        let generator =
            AngleGenerator::new(ModelClient::new(provider, &ResearchConfig::default()), 15);

        let err = generator.generate(&resolved(), &discovery(3)).await.unwrap_err();
        assert!(err.is_model_output_error());
    }
}
