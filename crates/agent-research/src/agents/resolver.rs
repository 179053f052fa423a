//! Entity resolution: discovery search plus a normalized subject

use super::ModelClient;
use crate::classifier::QueryKind;
use crate::error::{Result, ResearchError};
use crate::models::ResolvedQuery;
use crate::prompts::RESOLVE;
use crate::search::{SearchHit, SearchProvider};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

/// Output of the resolution stage
#[derive(Debug, Clone)]
pub struct Resolution {
    pub resolved: ResolvedQuery,
    /// Hits from the discovery search, reused by later stages
    pub discovery: Vec<SearchHit>,
}

/// Resolves a classified query against one discovery search
pub struct EntityResolver {
    model: ModelClient,
    search: Arc<dyn SearchProvider>,
    discovery_results: usize,
    context_hits: usize,
}

impl EntityResolver {
    pub fn new(
        model: ModelClient,
        search: Arc<dyn SearchProvider>,
        discovery_results: usize,
        context_hits: usize,
    ) -> Self {
        Self {
            model,
            search,
            discovery_results,
            context_hits,
        }
    }

    /// Search phrase for the discovery search
    pub fn discovery_query(kind: &QueryKind) -> String {
        match kind {
            QueryKind::Ticker(symbol) => format!("{symbol} stock company"),
            QueryKind::FreeText(text) => text.clone(),
        }
    }

    /// Run the discovery search and ask the model for the subject
    ///
    /// Fails when the search errors or comes back empty, or when the answer
    /// does not validate. `is_ticker` on the result always follows `kind`.
    #[instrument(skip(self, kind), fields(query = kind.text()))]
    pub async fn resolve(&self, kind: &QueryKind) -> Result<Resolution> {
        let search = Self::discovery_query(kind);
        info!("Running discovery search: {}", search);

        let discovery = self.search.search(&search, self.discovery_results).await?;
        if discovery.is_empty() {
            return Err(ResearchError::NoDiscoveryResults(search));
        }
        info!("Discovery: {} results", discovery.len());

        let hits = &discovery[..discovery.len().min(self.context_hits)];
        let mut resolved: ResolvedQuery = self
            .model
            .ask(
                &RESOLVE,
                &json!({
                    "query": kind.text(),
                    "is_ticker": kind.is_ticker(),
                    "search": search,
                    "hits": hits,
                }),
            )
            .await?;
        resolved.is_ticker = kind.is_ticker();

        info!("Resolved: {}", resolved.context_line());
        Ok(Resolution {
            resolved,
            discovery,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedProvider;
    use crate::classifier::classify;
    use crate::config::ResearchConfig;
    use crate::search::MockSearchProvider;
    use mockall::predicate::*;

    fn model(provider: ScriptedProvider) -> (ModelClient, Arc<ScriptedProvider>) {
        let provider = Arc::new(provider);
        let client = ModelClient::new(provider.clone(), &ResearchConfig::default());
        (client, provider)
    }

    fn nvidia_hits() -> Vec<SearchHit> {
        vec![SearchHit::new(
            "https://www.nvidia.com/",
            "NVIDIA",
            "NVIDIA Corporation designs GPUs and AI systems.",
        )]
    }

    #[tokio::test]
    async fn test_resolve_ticker() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .with(eq("NVDA stock company"), eq(10))
            .times(1)
            .returning(|_, _| Ok(nvidia_hits()));

        // The model claims free text; the classifier wins
        let (client, provider) = model(ScriptedProvider::new().answer(
            "resolved_query",
            json!({
                "is_ticker": false,
                "subject": "NVIDIA Corporation",
                "keywords": ["semiconductors", "GPUs", "AI"],
                "search_query": "NVIDIA semiconductors GPUs AI"
            }),
        ));
        let resolver = EntityResolver::new(client, Arc::new(search), 10, 15);

        let resolution = resolver.resolve(&classify("NVDA")).await.unwrap();

        assert!(resolution.resolved.is_ticker);
        assert_eq!(resolution.resolved.subject, "NVIDIA Corporation");
        assert_eq!(resolution.discovery.len(), 1);

        let input = provider.last_input("resolved_query").unwrap();
        assert!(input.contains("Input: NVDA"));
        assert!(input.contains("NVIDIA Corporation designs GPUs"));
    }

    #[tokio::test]
    async fn test_resolve_free_text_searches_verbatim() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .with(eq("solid-state battery makers"), always())
            .times(1)
            .returning(|_, _| {
                Ok(vec![SearchHit::new("https://e.com/ssb", "SSB", "QuantumScape and others")])
            });

        let (client, _) = model(ScriptedProvider::new().answer(
            "resolved_query",
            json!({
                "is_ticker": true,
                "subject": "Solid-state batteries",
                "keywords": ["EV"],
                "search_query": "solid-state battery makers"
            }),
        ));
        let resolver = EntityResolver::new(client, Arc::new(search), 10, 15);

        let resolution = resolver
            .resolve(&classify("solid-state battery makers"))
            .await
            .unwrap();
        assert!(!resolution.resolved.is_ticker);
    }

    #[tokio::test]
    async fn test_empty_discovery_is_fatal() {
        let mut search = MockSearchProvider::new();
        search.expect_search().returning(|_, _| Ok(Vec::new()));

        let (client, provider) = model(ScriptedProvider::new());
        let resolver = EntityResolver::new(client, Arc::new(search), 10, 15);

        let result = resolver.resolve(&classify("zzqx unknown topic")).await;
        assert!(matches!(result, Err(ResearchError::NoDiscoveryResults(_))));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_discovery_search_failure_is_fatal() {
        let mut search = MockSearchProvider::new();
        search.expect_search().returning(|q, _| {
            Err(ResearchError::SearchFailed {
                query: q.to_string(),
                reason: "HTTP 503".to_string(),
            })
        });

        let (client, _) = model(ScriptedProvider::new());
        let resolver = EntityResolver::new(client, Arc::new(search), 10, 15);

        let result = resolver.resolve(&classify("AAPL")).await;
        assert!(matches!(result, Err(ResearchError::SearchFailed { .. })));
    }

    #[tokio::test]
    async fn test_invalid_answer_is_model_output_error() {
        let mut search = MockSearchProvider::new();
        search.expect_search().returning(|_, _| Ok(nvidia_hits()));

        let (client, _) = model(
            ScriptedProvider::new().answer_text("resolved_query", "I could not find that ticker."),
        );
        let resolver = EntityResolver::new(client, Arc::new(search), 10, 15);

        let err = resolver.resolve(&classify("NVDA")).await.unwrap_err();
        assert!(err.is_model_output_error());
    }
}
