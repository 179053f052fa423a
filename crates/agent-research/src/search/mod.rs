//! Web search backends
//!
//! Every backend answers a query with an ordered list of [`SearchHit`]s. The
//! pipeline only sees the [`SearchProvider`] trait, so tests swap in a mock.

mod brave;
mod duckduckgo;

pub use brave::BraveSearch;
pub use duckduckgo::DuckDuckGoSearch;

use crate::config::{ResearchConfig, SearchBackend};
use crate::error::{Result, ResearchError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One web search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
        }
    }
}

/// A web search backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` and return at most `max_results` hits in ranking order
    ///
    /// An empty list is a valid answer; transport or decoding problems are
    /// reported as [`ResearchError::SearchFailed`].
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Build the search backend selected in `config`
pub fn create_search_provider(config: &ResearchConfig) -> Result<Arc<dyn SearchProvider>> {
    match config.search_backend {
        SearchBackend::DuckDuckGo => Ok(Arc::new(DuckDuckGoSearch::with_timeout(
            config.search_timeout,
        )?)),
        SearchBackend::Brave => {
            let key = config.brave_api_key.clone().ok_or_else(|| {
                ResearchError::ConfigError("BRAVE_SEARCH_API_KEY is not set".to_string())
            })?;
            Ok(Arc::new(BraveSearch::with_timeout(key, config.search_timeout)?))
        }
    }
}

fn search_failed(query: &str, reason: impl ToString) -> ResearchError {
    ResearchError::SearchFailed {
        query: query.to_string(),
        reason: reason.to_string(),
    }
}

/// Drop hits without a URL and repeated URLs, keeping first occurrence
fn dedup_hits(hits: Vec<SearchHit>, max_results: usize) -> Vec<SearchHit> {
    let mut seen = std::collections::HashSet::new();
    hits.into_iter()
        .filter(|hit| !hit.url.is_empty() && seen.insert(hit.url.clone()))
        .take(max_results)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_hits() {
        let hits = vec![
            SearchHit::new("https://a.example", "A", "first"),
            SearchHit::new("", "no url", "dropped"),
            SearchHit::new("https://a.example", "A again", "dup"),
            SearchHit::new("https://b.example", "B", "second"),
            SearchHit::new("https://c.example", "C", "third"),
        ];

        let hits = dedup_hits(hits, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].snippet, "first");
        assert_eq!(hits[1].url, "https://b.example");
    }

    #[test]
    fn test_create_search_provider() {
        let config = ResearchConfig {
            openai_api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(create_search_provider(&config).is_ok());

        let config = ResearchConfig {
            search_backend: SearchBackend::Brave,
            ..config
        };
        assert!(matches!(
            create_search_provider(&config),
            Err(ResearchError::ConfigError(_))
        ));
    }
}
