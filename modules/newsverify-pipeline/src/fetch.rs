use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{info, warn};

use crate::traits::ArticleFetcher;

/// Elements whose text never belongs to the article body.
const BOILERPLATE: &str = "script, style, nav, footer, header, aside";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid article URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Article fetch failed for {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Article fetch timed out after {secs}s for {url}")]
    Timeout { url: String, secs: u64 },

    #[error("Article fetch failed for {url}: {message}")]
    Network { url: String, message: String },
}

/// Plain-text article body plus the document title, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedArticle {
    pub text: String,
    pub title: Option<String>,
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector parses")
}

/// Drop boilerplate elements, then join the text of every `<p>` in document
/// order with a single space. A page with no paragraphs yields an empty string.
pub fn clean_article(html: &str) -> CleanedArticle {
    let mut document = Html::parse_document(html);

    let title = document
        .select(&selector("title"))
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let boilerplate: Vec<_> = document
        .select(&selector(BOILERPLATE))
        .map(|el| el.id())
        .collect();
    for id in boilerplate {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let text = document
        .select(&selector("p"))
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");

    CleanedArticle {
        text: text.trim().to_string(),
        title,
    }
}

pub fn clean_html(html: &str) -> String {
    clean_article(html).text
}

// --- Plain HTTP fetcher ---

pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newsverify/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build article HTTP client")?;
        Ok(Self { client, timeout })
    }

    fn classify_error(&self, url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ArticleFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("only http/https URLs are allowed, got {}", parsed.scheme()),
            });
        }

        info!(url, fetcher = "http", "Fetching article");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Article fetch returned error status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.classify_error(url, e))?;

        info!(url, fetcher = "http", bytes = body.len(), "Fetched successfully");
        Ok(body)
    }
}
