//! DuckDuckGo web search via the HTML results page (no API key)

use super::{SearchHit, SearchProvider, dedup_hits, search_failed};
use crate::error::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, instrument};

const API_URL: &str = "https://html.duckduckgo.com/html/";

static RESULTS: LazyLock<Selector> = LazyLock::new(|| css("#links"));
static RESULT: LazyLock<Selector> = LazyLock::new(|| css("div.result"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| css("a.result__a"));
static SNIPPET: LazyLock<Selector> = LazyLock::new(|| css(".result__snippet"));

fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector is valid")
}

/// DuckDuckGo web search
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    api_url: String,
}

impl DuckDuckGoSearch {
    /// Create a backend with a 15s request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(15))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                "Mozilla/5.0 (compatible; deep-research/",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()?;
        Ok(Self {
            client,
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
impl SearchProvider for DuckDuckGoSearch {
    #[instrument(skip(self), fields(backend = "duckduckgo"))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| search_failed(query, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(search_failed(query, format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| search_failed(query, e))?;
        let hits = parse_results(&body, max_results).map_err(|e| search_failed(query, e))?;

        debug!(count = hits.len(), "DuckDuckGo search complete");
        Ok(hits)
    }
}

/// Extract organic results from a results page
///
/// A page without the results container (rate-limit or challenge pages) is
/// an error; a container with no results is an empty answer.
fn parse_results(body: &str, max_results: usize) -> std::result::Result<Vec<SearchHit>, String> {
    let document = Html::parse_document(body);
    let Some(container) = document.select(&RESULTS).next() else {
        return Err("response is not a DuckDuckGo results page".to_string());
    };

    let hits = container
        .select(&RESULT)
        .filter(|result| !result.value().classes().any(|c| c == "result--ad"))
        .filter_map(|result| {
            let link = result.select(&TITLE).next()?;
            let url = result_url(link.value().attr("href")?)?;
            let snippet = result
                .select(&SNIPPET)
                .next()
                .map(|s| inner_text(&s))
                .unwrap_or_default();
            let title = inner_text(&link);
            let title = if title.is_empty() { url.clone() } else { title };
            Some(SearchHit::new(url, title, snippet))
        })
        .collect();

    Ok(dedup_hits(hits, max_results))
}

fn inner_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Target of a result link
///
/// Organic links go through `//duckduckgo.com/l/?uddg=<target>`; any other
/// link back into duckduckgo.com (ads, internal pages) is dropped.
fn result_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let url = reqwest::Url::parse(&absolute).ok()?;

    let internal = url
        .host_str()
        .is_some_and(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"));
    if !internal {
        return matches!(url.scheme(), "http" | "https").then_some(absolute);
    }
    if url.path() != "/l/" {
        return None;
    }
    url.query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, target)| target.into_owned())
        .filter(|target| target.starts_with("http"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResearchError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NVDA_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<div id="links" class="results">
  <div class="result results_links results_links_deep result--ad">
    <h2 class="result__title"><a class="result__a" href="https://duckduckgo.com/y.js?ad_domain=broker.example">Trade NVDA now</a></h2>
    <a class="result__snippet" href="https://duckduckgo.com/y.js">Zero commission.</a>
  </div>
  <div class="result results_links results_links_deep web-result">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.nvidia.com%2Fen%2Dus%2F&amp;rut=abc">
        NVIDIA - World Leader in <b>AI</b> Computing
      </a>
    </h2>
    <a class="result__snippet" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.nvidia.com%2Fen%2Dus%2F">NVIDIA designs <b>GPUs</b> for gaming and data centers.</a>
  </div>
  <div class="result results_links results_links_deep web-result">
    <h2 class="result__title"><a class="result__a" href="https://finance.example.com/quote/NVDA">NVDA quote</a></h2>
    <a class="result__snippet">Nvidia Corporation (NVDA) stock price and news.</a>
  </div>
  <div class="result results_links results_links_deep web-result">
    <h2 class="result__title"><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.nvidia.com%2Fen%2Dus%2F">Duplicate</a></h2>
  </div>
</div>
</body></html>"#;

    const EMPTY_PAGE: &str = r#"<html><body>
<div id="links" class="results"><div class="no-results">No results.</div></div>
</body></html>"#;

    #[test]
    fn test_parse_results_page() {
        let hits = parse_results(NVDA_PAGE, 10).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://www.nvidia.com/en-us/");
        assert_eq!(hits[0].title, "NVIDIA - World Leader in AI Computing");
        assert_eq!(hits[0].snippet, "NVIDIA designs GPUs for gaming and data centers.");
        assert_eq!(hits[1].url, "https://finance.example.com/quote/NVDA");
        assert!(hits.iter().all(|hit| !hit.url.contains("duckduckgo.com")));
    }

    #[test]
    fn test_parse_respects_max_results() {
        assert_eq!(parse_results(NVDA_PAGE, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_no_results() {
        assert!(parse_results(EMPTY_PAGE, 10).unwrap().is_empty());
    }

    #[test]
    fn test_parse_challenge_page_is_error() {
        assert!(parse_results("<html><body>anomaly detected</body></html>", 10).is_err());
    }

    #[test]
    fn test_result_url() {
        assert_eq!(
            result_url("//duckduckgo.com/l/?uddg=https%3A%2F%2Fa.example%2Fx%3Fy%3D1&rut=z").as_deref(),
            Some("https://a.example/x?y=1")
        );
        assert_eq!(result_url("https://b.example/").as_deref(), Some("https://b.example/"));
        assert_eq!(result_url("https://duckduckgo.com/y.js?ad=1"), None);
        assert_eq!(result_url("/html/?q=next"), None);
    }

    async fn backend(server: &MockServer) -> DuckDuckGoSearch {
        DuckDuckGoSearch::new()
            .unwrap()
            .with_api_url(format!("{}/html/", server.uri()))
    }

    #[tokio::test]
    async fn test_search_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "NVDA stock company"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(NVDA_PAGE, "text/html"))
            .expect(1)
            .mount(&server)
            .await;

        let hits = backend(&server)
            .await
            .search("NVDA stock company", 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = backend(&server).await.search("NVDA", 10).await.unwrap_err();
        assert!(matches!(
            err,
            ResearchError::SearchFailed { ref query, ref reason } if query == "NVDA" && reason.contains("503")
        ));
    }

    #[tokio::test]
    async fn test_search_challenge_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(202)
                    .set_body_raw("<html><body>Unfortunately, bots use DuckDuckGo too.</body></html>", "text/html"),
            )
            .mount(&server)
            .await;

        let err = backend(&server).await.search("NVDA", 10).await.unwrap_err();
        assert!(matches!(err, ResearchError::SearchFailed { .. }));
    }

    #[tokio::test]
    async fn test_search_unreachable() {
        let search = DuckDuckGoSearch::with_timeout(Duration::from_secs(2))
            .unwrap()
            .with_api_url("http://127.0.0.1:1/html/");

        let err = search.search("NVDA", 10).await.unwrap_err();
        assert!(matches!(err, ResearchError::SearchFailed { .. }));
    }
}
