use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// OpenAI-compatible endpoint used for every model call.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

const DEFAULT_MODEL: &str = "qwen/qwen-2.5-72b-instruct";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Reserved for future source filtering. Classification does not read it.
pub const DEFAULT_TRUSTED_NEWS_DOMAINS: &[&str] = &[
    "bbc.com",
    "reuters.com",
    "apnews.com",
    "theguardian.com",
    "nytimes.com",
    "economist.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchProvider {
    DuckDuckGo,
    Serper,
}

impl FromStr for SearchProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "duckduckgo" | "ddg" => Ok(SearchProvider::DuckDuckGo),
            "serper" => Ok(SearchProvider::Serper),
            other => Err(format!(
                "unknown search provider '{other}' (expected duckduckgo or serper)"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // LLM
    pub openrouter_api_key: String,
    pub openrouter_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,

    // Fetching
    pub http_timeout: Duration,

    // Search
    pub search_provider: SearchProvider,
    pub serper_api_key: Option<String>,
    pub max_sources_per_claim: Option<usize>,
    pub dedup_sources_across_queries: bool,
    pub trusted_news_domains: Vec<String>,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from the process environment, honouring a local `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.log_redacted();
        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openrouter_api_key =
            get("OPENROUTER_API_KEY").ok_or(ConfigError::Missing("OPENROUTER_API_KEY"))?;

        let search_provider = match get("SEARCH_PROVIDER") {
            Some(raw) => raw.parse::<SearchProvider>().map_err(|reason| ConfigError::Invalid {
                var: "SEARCH_PROVIDER",
                value: raw.clone(),
                reason,
            })?,
            None => SearchProvider::DuckDuckGo,
        };

        let serper_api_key = get("SERPER_API_KEY");
        if search_provider == SearchProvider::Serper && serper_api_key.is_none() {
            return Err(ConfigError::Missing("SERPER_API_KEY"));
        }

        let http_timeout_secs: u64 = parse_var("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"))?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let max_sources_per_claim: Option<usize> =
            parse_var("MAX_SOURCES_PER_CLAIM", get("MAX_SOURCES_PER_CLAIM"))?;

        let dedup_sources_across_queries = parse_var(
            "DEDUP_SOURCES_ACROSS_QUERIES",
            get("DEDUP_SOURCES_ACROSS_QUERIES"),
        )?
        .unwrap_or(false);

        let trusted_news_domains = match get("TRUSTED_NEWS_DOMAINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_TRUSTED_NEWS_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        };

        Ok(Self {
            openrouter_api_key,
            openrouter_base_url: OPENROUTER_BASE_URL.to_string(),
            llm_model_name: get("LLM_MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_temperature: 0.0,
            http_timeout: Duration::from_secs(http_timeout_secs),
            search_provider,
            serper_api_key,
            max_sources_per_claim,
            dedup_sources_across_queries,
            trusted_news_domains,
            web_host: get("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port: parse_var("WEB_PORT", get("WEB_PORT"))?.unwrap_or(3000),
        })
    }

    /// Whether a URL belongs to one of the configured trusted news domains.
    pub fn is_trusted(&self, url: &str) -> bool {
        self.trusted_news_domains.iter().any(|d| url.contains(d.as_str()))
    }

    pub fn log_redacted(&self) {
        fn preview(val: &str) -> String {
            let n = val.char_indices().nth(5).map(|(i, _)| i).unwrap_or(val.len());
            format!("{}...({} chars)", &val[..n], val.len())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  OPENROUTER_API_KEY: {}", preview(&self.openrouter_api_key));
        tracing::info!("  OPENROUTER_BASE_URL: {}", self.openrouter_base_url);
        tracing::info!("  LLM_MODEL_NAME: {}", self.llm_model_name);
        tracing::info!("  HTTP_TIMEOUT_SECS: {}", self.http_timeout.as_secs());
        tracing::info!("  SEARCH_PROVIDER: {:?}", self.search_provider);
        tracing::info!(
            "  SERPER_API_KEY: {}",
            self.serper_api_key
                .as_deref()
                .map(preview)
                .unwrap_or_else(|| "<not set>".to_string())
        );
        tracing::info!("  MAX_SOURCES_PER_CLAIM: {:?}", self.max_sources_per_claim);
        tracing::info!(
            "  DEDUP_SOURCES_ACROSS_QUERIES: {}",
            self.dedup_sources_across_queries
        );
    }
}

fn parse_var<T>(var: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        })
    })
    .transpose()
}
