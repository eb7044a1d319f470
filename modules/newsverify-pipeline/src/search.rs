use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use newsverify_common::{Config, SourceRef, SourceTier};

use crate::traits::WebSearcher;

/// Results requested from the provider for each query.
pub const SEARCH_MAX_RESULTS: usize = 5;

pub const TIER_1_DOMAINS: &[&str] = &["reuters.com", "apnews.com", "bbc.com", "aljazeera.com"];
pub const TIER_2_DOMAINS: &[&str] = &[
    "thehindu.com",
    "indianexpress.com",
    "dhakatribune.com",
    "dawn.com",
];

const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const SERPER_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// Substring match against the static domain lists; tier 1 wins over tier 2.
pub fn classify_source(url: &str) -> SourceTier {
    if TIER_1_DOMAINS.iter().any(|d| url.contains(d)) {
        SourceTier::Tier1
    } else if TIER_2_DOMAINS.iter().any(|d| url.contains(d)) {
        SourceTier::Tier2
    } else {
        SourceTier::Tier3
    }
}

// --- Evidence gathering ---

/// Optional post-processing of a claim's aggregated sources. The default
/// keeps every source from every query, duplicates included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvidencePolicy {
    pub dedup_across_queries: bool,
    pub max_sources: Option<usize>,
}

impl EvidencePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            dedup_across_queries: config.dedup_sources_across_queries,
            max_sources: config.max_sources_per_claim,
        }
    }

    pub fn apply(&self, mut sources: Vec<SourceRef>) -> Vec<SourceRef> {
        if self.dedup_across_queries {
            let mut seen = HashSet::new();
            sources.retain(|s| seen.insert(s.url.clone()));
        }
        if let Some(max) = self.max_sources {
            sources.truncate(max);
        }
        sources
    }
}

pub struct EvidenceSearcher {
    searcher: Arc<dyn WebSearcher>,
    max_results: usize,
}

impl EvidenceSearcher {
    pub fn new(searcher: Arc<dyn WebSearcher>) -> Self {
        Self {
            searcher,
            max_results: SEARCH_MAX_RESULTS,
        }
    }

    /// One query's tiered sources. Results without a URL are skipped and a
    /// URL repeated within this result set is kept only the first time.
    pub async fn search_query(&self, query: &str) -> Result<Vec<SourceRef>> {
        let results = self
            .searcher
            .search(query, self.max_results)
            .await
            .with_context(|| format!("Web search failed for query {query:?}"))?;

        let mut seen = HashSet::new();
        let sources: Vec<SourceRef> = results
            .into_iter()
            .take(self.max_results)
            .filter(|r| !r.url.is_empty())
            .filter(|r| seen.insert(r.url.clone()))
            .map(|r| SourceRef {
                tier: classify_source(&r.url),
                title: r.title,
                url: r.url,
                snippet: r.snippet,
            })
            .collect();

        info!(
            query,
            provider = self.searcher.name(),
            sources = sources.len(),
            "Query searched"
        );
        Ok(sources)
    }

    /// Search every query in order and concatenate the results, then apply
    /// the policy.
    pub async fn gather(&self, queries: &[String], policy: &EvidencePolicy) -> Result<Vec<SourceRef>> {
        let mut sources = Vec::new();
        for query in queries {
            sources.extend(self.search_query(query).await?);
        }
        Ok(policy.apply(sources))
    }
}

// --- DuckDuckGo (keyless HTML endpoint) ---

pub struct DuckDuckGoSearcher {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newsverify/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build DuckDuckGo HTTP client")?;
        Ok(Self {
            client,
            endpoint: DUCKDUCKGO_HTML_URL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl WebSearcher for DuckDuckGoSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        info!(query, max_results, "DuckDuckGo search");

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .context("DuckDuckGo request failed")?
            .error_for_status()
            .context("DuckDuckGo returned an error status")?;

        let html = resp
            .text()
            .await
            .context("Failed to read DuckDuckGo response")?;

        let mut results = parse_duckduckgo_html(&html);
        results.truncate(max_results);

        info!(query, count = results.len(), "DuckDuckGo search complete");
        Ok(results)
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector parses")
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join("").trim().to_string()
}

/// DuckDuckGo wraps result links in a `/l/?uddg=<target>` redirect.
fn unwrap_redirect(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let parsed = url::Url::parse(&absolute).ok()?;

    if parsed.path().starts_with("/l/") {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned());
    }
    matches!(parsed.scheme(), "http" | "https").then_some(absolute)
}

/// Organic results from the DuckDuckGo HTML page, ads excluded, in page order.
pub fn parse_duckduckgo_html(html: &str) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let result_sel = selector("div.result");
    let link_sel = selector("a.result__a");
    let snippet_sel = selector(".result__snippet");

    document
        .select(&result_sel)
        .filter(|r| !r.value().classes().any(|c| c == "result--ad"))
        .filter_map(|r| {
            let link = r.select(&link_sel).next()?;
            let href = link.value().attr("href")?;
            let Some(url) = unwrap_redirect(href) else {
                warn!(href, "Skipping DuckDuckGo result with unusable link");
                return None;
            };
            Some(SearchResult {
                url,
                title: element_text(link),
                snippet: r
                    .select(&snippet_sel)
                    .next()
                    .map(element_text)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

// --- Serper (Google Search) ---

pub struct SerperSearcher {
    api_key: String,
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, serde::Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, serde::Deserialize)]
struct SerperResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

impl SerperSearcher {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Serper HTTP client")?;
        Ok(Self {
            api_key: api_key.to_string(),
            client,
            endpoint: SERPER_URL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl WebSearcher for SerperSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        info!(query, max_results, "Serper search");

        let body = serde_json::json!({
            "q": query,
            "num": max_results,
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Serper API request failed")?
            .error_for_status()
            .context("Serper API returned an error status")?;

        let data: SerperResponse = resp
            .json()
            .await
            .context("Failed to parse Serper response")?;

        let results: Vec<SearchResult> = data
            .organic
            .into_iter()
            .map(|r| SearchResult {
                url: r.link,
                title: r.title,
                snippet: r.snippet,
            })
            .collect();

        info!(query, count = results.len(), "Serper search complete");
        Ok(results)
    }

    fn name(&self) -> &str {
        "serper"
    }
}
