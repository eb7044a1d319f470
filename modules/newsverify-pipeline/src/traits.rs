// Trait seams for the verification pipeline.
//
// ArticleFetcher: raw article markup from a URL.
// WebSearcher: one text query to a search provider.
// JudgmentProvider: every language-model decision, as raw text.
//
// Concrete providers live in fetch.rs, search.rs and judge.rs; testing.rs has
// the mocks. Parsing of model output stays outside these traits.

use anyhow::Result;
use async_trait::async_trait;

use crate::fetch::FetchError;
use crate::search::SearchResult;

#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// GET the URL and return the response body. Non-2xx and timeouts are errors.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait JudgmentProvider: Send + Sync {
    /// Bullet-point list of factual claims found in the article.
    async fn extract_claims(&self, article_text: &str) -> Result<String>;

    /// JSON object with person, location, country and event_type.
    async fn extract_entities(&self, claim: &str) -> Result<String>;

    /// Free-text verdict for one claim given its rendered sources.
    async fn classify(&self, claim: &str, sources_text: &str) -> Result<String>;

    async fn assess_bias(&self, article_text: &str) -> Result<String>;

    /// Final confidence score with explanation.
    async fn score(&self, claims_summary: &str, bias_text: &str) -> Result<String>;
}
