//! Brave Search API backend

use super::{SearchHit, SearchProvider, dedup_hits, search_failed};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const API_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave caps `count` at 20
const MAX_COUNT: usize = 20;

/// Brave web search
pub struct BraveSearch {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl BraveSearch {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, Duration::from_secs(15))
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            api_url: API_URL.to_string(),
        })
    }

    /// Point at a different endpoint (test servers, proxies)
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for BraveSearch {
    #[instrument(skip(self), fields(backend = "brave"))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let count = max_results.clamp(1, MAX_COUNT).to_string();

        let response = self
            .client
            .get(&self.api_url)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| search_failed(query, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(search_failed(query, format!("HTTP {status}: {body}")));
        }

        let body = response.text().await.map_err(|e| search_failed(query, e))?;
        let hits = parse_response(&body, max_results).map_err(|e| search_failed(query, e))?;

        debug!(count = hits.len(), "Brave search complete");
        Ok(hits)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BraveResponse {
    web: WebResults,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WebResults {
    results: Vec<WebResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WebResult {
    title: String,
    url: String,
    description: String,
}

fn parse_response(body: &str, max_results: usize) -> serde_json::Result<Vec<SearchHit>> {
    let response: BraveResponse = serde_json::from_str(body)?;
    let hits = response
        .web
        .results
        .into_iter()
        .map(|r| {
            let title = if r.title.is_empty() { r.url.clone() } else { r.title };
            SearchHit::new(r.url, title, r.description)
        })
        .collect();
    Ok(dedup_hits(hits, max_results))
}
