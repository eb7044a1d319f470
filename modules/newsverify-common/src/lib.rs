pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, SearchProvider, DEFAULT_TRUSTED_NEWS_DOMAINS, OPENROUTER_BASE_URL};
pub use error::ConfigError;
pub use types::*;
