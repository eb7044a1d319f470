use anyhow::{Context, Result};
use tracing::info;

use newsverify_common::{ClaimVerification, Verdict};

use crate::entities::{build_search_queries, extract_entities};
use crate::report::render_sources;
use crate::search::{EvidencePolicy, EvidenceSearcher};
use crate::traits::JudgmentProvider;

/// Entities, queries, evidence, then one classification call for a claim.
pub async fn verify_claim(
    judge: &dyn JudgmentProvider,
    evidence: &EvidenceSearcher,
    policy: &EvidencePolicy,
    claim: &str,
) -> Result<ClaimVerification> {
    let entities = extract_entities(judge, claim).await?;
    let queries = build_search_queries(&entities, claim);
    let sources = evidence.gather(&queries, policy).await?;

    let analysis = judge
        .classify(claim, &render_sources(&sources))
        .await
        .context("Claim classification failed")?;
    let verdict = Verdict::detect(&analysis);

    info!(
        claim,
        queries = queries.len(),
        sources = sources.len(),
        verdict = verdict.map(|v| v.as_str()).unwrap_or("unparsed"),
        "Claim classified"
    );

    Ok(ClaimVerification {
        claim: claim.to_string(),
        analysis,
        verdict,
        sources,
    })
}

/// Claims are verified one at a time, in order.
pub async fn verify_claims(
    judge: &dyn JudgmentProvider,
    evidence: &EvidenceSearcher,
    policy: &EvidencePolicy,
    claims: &[String],
) -> Result<Vec<ClaimVerification>> {
    let mut results = Vec::with_capacity(claims.len());
    for claim in claims {
        results.push(verify_claim(judge, evidence, policy, claim).await?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchResult;
    use crate::testing::{MockJudge, MockSearcher};
    use newsverify_common::SourceTier;
    use std::sync::Arc;

    fn hit(url: &str, title: &str) -> SearchResult {
        SearchResult {
            url: url.to_string(),
            title: title.to_string(),
            snippet: String::new(),
        }
    }

    #[tokio::test]
    async fn claim_flows_through_entities_search_and_classifier() {
        let claim = "Jane Doe said floods hit Chad";
        let judge = MockJudge::new()
            .on_entities(
                claim,
                r#"{"person": "Jane Doe", "location": null, "country": "Chad", "event_type": "flood"}"#,
            )
            .on_verdict(claim, "likely_supported: two outlets agree");
        let searcher = Arc::new(
            MockSearcher::new()
                .on_search("Jane Doe flood Chad", vec![hit("https://apnews.com/1", "AP")])
                .on_search("Chad flood", vec![hit("https://dawn.com/2", "Dawn")])
                .on_search("Jane Doe", vec![]),
        );
        let evidence = EvidenceSearcher::new(searcher.clone());

        let result = verify_claim(&judge, &evidence, &EvidencePolicy::default(), claim)
            .await
            .unwrap();

        assert_eq!(
            searcher.queries(),
            vec!["Jane Doe flood Chad", "Chad flood", "Jane Doe"]
        );
        assert_eq!(result.claim, claim);
        assert_eq!(result.analysis, "likely_supported: two outlets agree");
        assert_eq!(result.verdict, Some(Verdict::LikelySupported));
        let tiers: Vec<_> = result.sources.iter().map(|s| s.tier).collect();
        assert_eq!(tiers, vec![SourceTier::Tier1, SourceTier::Tier2]);
        assert_eq!(
            judge.classify_calls(),
            vec![(
                claim.to_string(),
                "- AP (https://apnews.com/1)\n- Dawn (https://dawn.com/2)".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn garbled_entities_fall_back_to_claim_query() {
        let claim = "X happened";
        let judge = MockJudge::new()
            .on_entities(claim, "not json")
            .on_verdict(claim, "I am not sure.");
        let searcher = Arc::new(MockSearcher::new().on_search(claim, vec![]));
        let evidence = EvidenceSearcher::new(searcher.clone());

        let result = verify_claim(&judge, &evidence, &EvidencePolicy::default(), claim)
            .await
            .unwrap();

        assert_eq!(searcher.queries(), vec!["X happened"]);
        assert!(result.sources.is_empty());
        assert_eq!(result.verdict, None);
        assert_eq!(judge.classify_calls()[0].1, "No external sources found.");
    }

    #[tokio::test]
    async fn classifier_failure_aborts() {
        let claim = "X happened";
        let judge = MockJudge::new().on_entities(claim, "{}");
        let evidence = EvidenceSearcher::new(Arc::new(MockSearcher::new().on_search(claim, vec![])));

        let err = verify_claim(&judge, &evidence, &EvidencePolicy::default(), claim)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Claim classification failed"));
    }
}
