// Test mocks for the verification pipeline.
//
// Three mocks matching the three trait boundaries:
// - MockFetcher (ArticleFetcher): HashMap-based URL→HTML
// - MockSearcher (WebSearcher): HashMap-based query→results, records queries
// - MockJudge (JudgmentProvider): canned model replies, records prompts
//
// Every mock returns `Err` for inputs it was not told about.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::fetch::FetchError;
use crate::search::SearchResult;
use crate::traits::{ArticleFetcher, JudgmentProvider, WebSearcher};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Builder pattern: `.on_page()`, `.on_status()`.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    statuses: HashMap<String, u16>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Answer this URL with an HTTP error status.
    pub fn on_status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }
}

#[async_trait]
impl ArticleFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Some(&status) = self.statuses.get(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Network {
                url: url.to_string(),
                message: "MockFetcher: no page registered".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockSearcher {
    results: HashMap<String, Vec<SearchResult>>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_search(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }

    /// Queries issued so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _)| q.clone())
            .collect()
    }

    pub fn max_results_seen(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(|(_, n)| *n).collect()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        self.results
            .get(query)
            .cloned()
            .ok_or_else(|| anyhow!("MockSearcher: no results registered for {query:?}"))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// MockJudge
// ---------------------------------------------------------------------------

/// Claims, bias and score replies are global; entity and verdict replies are
/// keyed by claim text.
#[derive(Default)]
pub struct MockJudge {
    claims: Option<String>,
    entities: HashMap<String, String>,
    verdicts: HashMap<String, String>,
    bias: Option<String>,
    score: Option<String>,
    classify_calls: Mutex<Vec<(String, String)>>,
    score_calls: Mutex<Vec<(String, String)>>,
}

impl MockJudge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_claims(mut self, raw: &str) -> Self {
        self.claims = Some(raw.to_string());
        self
    }

    pub fn on_entities(mut self, claim: &str, raw: &str) -> Self {
        self.entities.insert(claim.to_string(), raw.to_string());
        self
    }

    pub fn on_verdict(mut self, claim: &str, analysis: &str) -> Self {
        self.verdicts.insert(claim.to_string(), analysis.to_string());
        self
    }

    pub fn on_bias(mut self, analysis: &str) -> Self {
        self.bias = Some(analysis.to_string());
        self
    }

    pub fn on_score(mut self, assessment: &str) -> Self {
        self.score = Some(assessment.to_string());
        self
    }

    /// `(claim, sources_text)` for every classify call.
    pub fn classify_calls(&self) -> Vec<(String, String)> {
        self.classify_calls.lock().unwrap().clone()
    }

    /// `(claims_summary, bias_text)` for every score call.
    pub fn score_calls(&self) -> Vec<(String, String)> {
        self.score_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JudgmentProvider for MockJudge {
    async fn extract_claims(&self, _article_text: &str) -> Result<String> {
        self.claims
            .clone()
            .ok_or_else(|| anyhow!("MockJudge: no claims registered"))
    }

    async fn extract_entities(&self, claim: &str) -> Result<String> {
        self.entities
            .get(claim)
            .cloned()
            .ok_or_else(|| anyhow!("MockJudge: no entities registered for {claim:?}"))
    }

    async fn classify(&self, claim: &str, sources_text: &str) -> Result<String> {
        self.classify_calls
            .lock()
            .unwrap()
            .push((claim.to_string(), sources_text.to_string()));
        self.verdicts
            .get(claim)
            .cloned()
            .ok_or_else(|| anyhow!("MockJudge: no verdict registered for {claim:?}"))
    }

    async fn assess_bias(&self, _article_text: &str) -> Result<String> {
        self.bias
            .clone()
            .ok_or_else(|| anyhow!("MockJudge: no bias analysis registered"))
    }

    async fn score(&self, claims_summary: &str, bias_text: &str) -> Result<String> {
        self.score_calls
            .lock()
            .unwrap()
            .push((claims_summary.to_string(), bias_text.to_string()));
        self.score
            .clone()
            .ok_or_else(|| anyhow!("MockJudge: no score registered"))
    }
}
