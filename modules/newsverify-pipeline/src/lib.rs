pub mod claims;
pub mod entities;
pub mod fetch;
pub mod judge;
pub mod report;
pub mod search;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod verification;
pub mod workflow;

pub use fetch::{FetchError, HttpFetcher};
pub use judge::LlmJudge;
pub use search::{DuckDuckGoSearcher, EvidencePolicy, EvidenceSearcher, SerperSearcher};
pub use traits::{ArticleFetcher, JudgmentProvider, WebSearcher};
pub use workflow::{Stage, Verifier};
