use anyhow::{Context, Result};
use tracing::info;

use newsverify_common::{BiasAnalysis, ClaimVerification, FinalReport, SourceRef};

use crate::traits::JudgmentProvider;

pub const NO_SOURCES: &str = "No external sources found.";

/// Evidence as the classifier sees it: one `- {title} ({url})` line per source.
pub fn render_sources(sources: &[SourceRef]) -> String {
    if sources.is_empty() {
        return NO_SOURCES.to_string();
    }
    sources
        .iter()
        .map(|s| format!("- {} ({})", s.title, s.url))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_claims_summary(results: &[ClaimVerification]) -> String {
    results
        .iter()
        .map(|r| format!("- {}: {}", r.claim, r.analysis))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn assess_bias(judge: &dyn JudgmentProvider, article_text: &str) -> Result<BiasAnalysis> {
    let analysis = judge
        .assess_bias(article_text)
        .await
        .context("Bias analysis failed")?;
    Ok(BiasAnalysis { analysis })
}

/// Ask for the final confidence score and assemble the report. The score text
/// is stored as returned.
pub async fn finalize(
    judge: &dyn JudgmentProvider,
    article_url: &str,
    claims: Vec<ClaimVerification>,
    bias_analysis: BiasAnalysis,
) -> Result<FinalReport> {
    let summary = render_claims_summary(&claims);
    let final_assessment = judge
        .score(&summary, &bias_analysis.analysis)
        .await
        .context("Final scoring failed")?;

    info!(claims = claims.len(), "Final report assembled");
    Ok(FinalReport {
        article_url: article_url.to_string(),
        claims,
        bias_analysis,
        final_assessment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockJudge;
    use newsverify_common::SourceTier;

    fn result(claim: &str, analysis: &str) -> ClaimVerification {
        ClaimVerification {
            claim: claim.to_string(),
            analysis: analysis.to_string(),
            verdict: None,
            sources: vec![],
        }
    }

    #[test]
    fn renders_source_lines() {
        let sources = vec![
            SourceRef {
                title: "Floods hit Chad".to_string(),
                url: "https://bbc.com/a".to_string(),
                snippet: "ignored".to_string(),
                tier: SourceTier::Tier1,
            },
            SourceRef {
                title: "Relief arrives".to_string(),
                url: "https://example.org/b".to_string(),
                snippet: String::new(),
                tier: SourceTier::Tier3,
            },
        ];
        assert_eq!(
            render_sources(&sources),
            "- Floods hit Chad (https://bbc.com/a)\n- Relief arrives (https://example.org/b)"
        );
    }

    #[test]
    fn empty_sources_use_placeholder() {
        assert_eq!(render_sources(&[]), "No external sources found.");
    }

    #[test]
    fn claims_summary_lines() {
        let summary = render_claims_summary(&[result("A", "supported"), result("B", "contradicted")]);
        assert_eq!(summary, "- A: supported\n- B: contradicted");
        assert_eq!(render_claims_summary(&[]), "");
    }

    #[tokio::test]
    async fn finalize_keeps_every_claim_and_score_verbatim() {
        let judge = MockJudge::new().on_score("Score: 72. Mostly consistent.");
        let bias = BiasAnalysis {
            analysis: "Mild sensationalism.".to_string(),
        };

        let report = finalize(
            &judge,
            "https://example.com/a",
            vec![result("A", "supported"), result("B", "inconclusive")],
            bias,
        )
        .await
        .unwrap();

        assert_eq!(report.article_url, "https://example.com/a");
        assert_eq!(report.claims.len(), 2);
        assert_eq!(report.final_assessment, "Score: 72. Mostly consistent.");
        assert_eq!(
            judge.score_calls(),
            vec![(
                "- A: supported\n- B: inconclusive".to_string(),
                "Mild sensationalism.".to_string()
            )]
        );
    }
}
