use std::fmt;
use std::sync::Arc;

use ai_client::OpenRouter;
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, info_span, warn, Instrument};

use newsverify_common::{
    ArticleMetadata, Config, SearchProvider, VerificationOutcome, VerificationState,
};

use crate::claims::extract_claims;
use crate::fetch::{clean_article, HttpFetcher};
use crate::judge::LlmJudge;
use crate::report::{assess_bias, finalize};
use crate::search::{DuckDuckGoSearcher, EvidencePolicy, EvidenceSearcher, SerperSearcher};
use crate::traits::{ArticleFetcher, JudgmentProvider, WebSearcher};
use crate::verification::verify_claims;

/// Linear stage order of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    ClaimExtraction,
    Verification,
    BiasAnalysis,
    Finalizing,
    Done,
}

impl Stage {
    pub fn next(self) -> Stage {
        match self {
            Stage::Fetching => Stage::ClaimExtraction,
            Stage::ClaimExtraction => Stage::Verification,
            Stage::Verification => Stage::BiasAnalysis,
            Stage::BiasAnalysis => Stage::Finalizing,
            Stage::Finalizing | Stage::Done => Stage::Done,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetching => "fetching",
            Stage::ClaimExtraction => "claim_extraction",
            Stage::Verification => "verification",
            Stage::BiasAnalysis => "bias_analysis",
            Stage::Finalizing => "finalizing",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Verifier {
    fetcher: Arc<dyn ArticleFetcher>,
    evidence: EvidenceSearcher,
    judge: Arc<dyn JudgmentProvider>,
    policy: EvidencePolicy,
}

impl Verifier {
    pub fn new(
        fetcher: Arc<dyn ArticleFetcher>,
        searcher: Arc<dyn WebSearcher>,
        judge: Arc<dyn JudgmentProvider>,
    ) -> Self {
        Self {
            fetcher,
            evidence: EvidenceSearcher::new(searcher),
            judge,
            policy: EvidencePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: EvidencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Wire the production providers from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(config.http_timeout)?);

        let searcher: Arc<dyn WebSearcher> = match config.search_provider {
            SearchProvider::DuckDuckGo => Arc::new(DuckDuckGoSearcher::new(config.http_timeout)?),
            SearchProvider::Serper => {
                let key = config
                    .serper_api_key
                    .as_deref()
                    .context("SERPER_API_KEY is required for the serper search provider")?;
                Arc::new(SerperSearcher::new(key, config.http_timeout)?)
            }
        };

        let model = OpenRouter::new(&config.openrouter_api_key, &config.llm_model_name)
            .with_base_url(&config.openrouter_base_url)
            .with_temperature(config.llm_temperature)
            .with_app_name("newsverify");
        let judge = Arc::new(LlmJudge::new(model));

        info!(
            model = %config.llm_model_name,
            search = searcher.name(),
            "Verifier configured"
        );

        Ok(Self::new(fetcher, searcher, judge).with_policy(EvidencePolicy::from_config(config)))
    }

    /// Verify one article end to end. Never panics or returns a partial report.
    pub async fn verify_article(&self, url: &str) -> VerificationOutcome {
        let state = VerificationState::new(url);
        let span = info_span!("verification", run_id = %state.run_id, url);

        async move {
            info!("Verification started");
            let started_at = state.started_at;
            let finished = self.run(state).await;
            let elapsed_ms = (Utc::now() - started_at).num_milliseconds();

            match &finished.error {
                Some(error) => warn!(elapsed_ms, error = %error, "Verification failed"),
                None => info!(
                    elapsed_ms,
                    claims = finished.claims.as_ref().map_or(0, Vec::len),
                    "Verification complete"
                ),
            }
            finished.into_outcome()
        }
        .instrument(span)
        .await
    }

    /// Drive every stage in order. The first failing stage records its error
    /// on the last good state and the run stops there.
    pub async fn run(&self, state: VerificationState) -> VerificationState {
        let mut state = state;
        let mut stage = Stage::Fetching;

        while stage != Stage::Done {
            info!(stage = %stage, "Entering stage");
            state = match self.step(stage, &state).await {
                Ok(next) => next,
                Err(e) => {
                    warn!(stage = %stage, error = %format!("{e:#}"), "Stage failed");
                    return state.with_error(format!("{stage}: {e:#}"));
                }
            };
            stage = stage.next();
        }
        state
    }

    async fn step(&self, stage: Stage, state: &VerificationState) -> Result<VerificationState> {
        match stage {
            Stage::Fetching => {
                let html = self.fetcher.fetch(&state.article_url).await?;
                let article = clean_article(&html);
                info!(chars = article.text.len(), "Article text extracted");
                let metadata = ArticleMetadata {
                    url: state.article_url.clone(),
                    title: article.title,
                };
                Ok(state.with_article(article.text, metadata))
            }
            Stage::ClaimExtraction => {
                let text = article_text(state)?;
                let claims = extract_claims(self.judge.as_ref(), text).await?;
                Ok(state.with_claims(claims))
            }
            Stage::Verification => {
                let claims = state.claims.as_deref().context("no claims extracted")?;
                let results =
                    verify_claims(self.judge.as_ref(), &self.evidence, &self.policy, claims).await?;
                Ok(state.with_verification_results(results))
            }
            Stage::BiasAnalysis => {
                let bias = assess_bias(self.judge.as_ref(), article_text(state)?).await?;
                Ok(state.with_bias_analysis(bias))
            }
            Stage::Finalizing => {
                let results = state
                    .claim_verification_results
                    .clone()
                    .context("no claim verification results")?;
                let bias = state.bias_analysis.clone().context("no bias analysis")?;
                let report = finalize(self.judge.as_ref(), &state.article_url, results, bias).await?;
                Ok(state.with_final_report(report))
            }
            Stage::Done => Ok(state.clone()),
        }
    }
}

fn article_text(state: &VerificationState) -> Result<&str> {
    state.article_text.as_deref().context("no article text")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchResult;
    use crate::testing::{MockFetcher, MockJudge, MockSearcher};
    use newsverify_common::VerificationFailure;

    const URL: &str = "https://news.example.com/flood";
    const ARTICLE: &str = "<html><head><title>Flood</title></head><body>\
        <nav><p>Menu</p></nav><p>The river burst its banks.</p><p>Officials blamed rain.</p>\
        </body></html>";

    fn verifier(judge: MockJudge, searcher: MockSearcher) -> Verifier {
        Verifier::new(
            Arc::new(MockFetcher::new().on_page(URL, ARTICLE)),
            Arc::new(searcher),
            Arc::new(judge),
        )
    }

    fn full_judge() -> MockJudge {
        MockJudge::new()
            .on_claims("- The river burst its banks\n- Officials blamed rain")
            .on_entities("The river burst its banks", "{}")
            .on_entities("Officials blamed rain", "{}")
            .on_verdict("The river burst its banks", "supported")
            .on_verdict("Officials blamed rain", "inconclusive")
            .on_bias("Neutral.")
            .on_score("85")
    }

    fn full_searcher() -> MockSearcher {
        MockSearcher::new()
            .on_search(
                "The river burst its banks",
                vec![SearchResult {
                    url: "https://www.reuters.com/x".to_string(),
                    title: "Reuters".to_string(),
                    snippet: String::new(),
                }],
            )
            .on_search("Officials blamed rain", vec![])
    }

    #[test]
    fn stages_advance_linearly() {
        let mut stage = Stage::Fetching;
        let mut seen = vec![stage];
        while stage != Stage::Done {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                Stage::Fetching,
                Stage::ClaimExtraction,
                Stage::Verification,
                Stage::BiasAnalysis,
                Stage::Finalizing,
                Stage::Done
            ]
        );
    }

    #[tokio::test]
    async fn full_run_produces_report() {
        let outcome = verifier(full_judge(), full_searcher()).verify_article(URL).await;

        let report = match outcome {
            VerificationOutcome::Report(report) => report,
            VerificationOutcome::Failed(failure) => panic!("expected report, got {failure:?}"),
        };
        assert_eq!(report.article_url, URL);
        assert_eq!(report.claims.len(), 2);
        assert_eq!(report.claims[0].sources.len(), 1);
        assert!(report.claims[1].sources.is_empty());
        assert_eq!(report.bias_analysis.analysis, "Neutral.");
        assert_eq!(report.final_assessment, "85");
    }

    #[tokio::test]
    async fn run_threads_state_through_every_stage() {
        let v = verifier(full_judge(), full_searcher());
        let state = v.run(VerificationState::new(URL)).await;

        assert!(state.error.is_none());
        assert_eq!(
            state.article_text.as_deref(),
            Some("The river burst its banks. Officials blamed rain.")
        );
        assert_eq!(
            state.article_metadata.and_then(|m| m.title).as_deref(),
            Some("Flood")
        );
        assert_eq!(state.claims.map(|c| c.len()), Some(2));
        assert!(state.final_report.is_some());
    }

    #[tokio::test]
    async fn no_claims_still_finalizes() {
        let judge = MockJudge::new()
            .on_claims("")
            .on_bias("Neutral.")
            .on_score("50");
        let v = verifier(judge, MockSearcher::new());

        let outcome = v.verify_article(URL).await;

        let VerificationOutcome::Report(report) = outcome else {
            panic!("expected report");
        };
        assert!(report.claims.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_becomes_error_outcome() {
        let v = Verifier::new(
            Arc::new(MockFetcher::new().on_status(URL, 404)),
            Arc::new(MockSearcher::new()),
            Arc::new(full_judge()),
        );

        let outcome = v.verify_article(URL).await;

        let VerificationOutcome::Failed(VerificationFailure { error, details }) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(error, "Verification failed");
        let details = details.unwrap();
        assert!(details.starts_with("fetching: "));
        assert!(details.contains("404"));
    }

    #[tokio::test]
    async fn mid_run_failure_discards_partial_results() {
        // Bias analysis has no registered reply.
        let judge = MockJudge::new()
            .on_claims("- The river burst its banks")
            .on_entities("The river burst its banks", "{}")
            .on_verdict("The river burst its banks", "supported");
        let v = verifier(judge, full_searcher());

        let state = v.run(VerificationState::new(URL)).await;
        assert!(state.error.as_deref().unwrap().starts_with("bias_analysis: "));
        assert!(state.claim_verification_results.is_some());

        let outcome = v.verify_article(URL).await;
        assert!(!outcome.is_report());
    }

    #[tokio::test]
    async fn cross_query_policy_is_applied() {
        let claim = "Jane Doe flood";
        let judge = MockJudge::new()
            .on_claims("- Jane Doe flood")
            .on_entities(
                claim,
                r#"{"person": "Jane Doe", "country": "Chad", "event_type": "flood"}"#,
            )
            .on_verdict(claim, "supported")
            .on_bias("Neutral.")
            .on_score("90");
        let same = vec![SearchResult {
            url: "https://bbc.com/a".to_string(),
            title: "BBC".to_string(),
            snippet: String::new(),
        }];
        let searcher = MockSearcher::new()
            .on_search("Jane Doe flood Chad", same.clone())
            .on_search("Chad flood", same.clone())
            .on_search("Jane Doe", same);

        let v = verifier(judge, searcher).with_policy(EvidencePolicy {
            dedup_across_queries: true,
            max_sources: None,
        });
        let VerificationOutcome::Report(report) = v.verify_article(URL).await else {
            panic!("expected report");
        };
        assert_eq!(report.claims[0].sources.len(), 1);
    }
}
