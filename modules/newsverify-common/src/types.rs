use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Source Types ---

/// Coarse credibility bucket assigned from static domain lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTier {
    #[serde(rename = "tier_1")]
    Tier1,
    #[serde(rename = "tier_2")]
    Tier2,
    #[serde(rename = "tier_3")]
    Tier3,
}

impl SourceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTier::Tier1 => "tier_1",
            SourceTier::Tier2 => "tier_2",
            SourceTier::Tier3 => "tier_3",
        }
    }
}

impl std::fmt::Display for SourceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One web search result attached to a claim as evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub tier: SourceTier,
}

// --- Verdict ---

/// The four labels the classifier is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Supported,
    LikelySupported,
    Inconclusive,
    Contradicted,
}

static VERDICT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(likely[_ ]supported|supported|inconclusive|contradicted)\b")
        .expect("valid regex")
});

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Supported => "supported",
            Verdict::LikelySupported => "likely_supported",
            Verdict::Inconclusive => "inconclusive",
            Verdict::Contradicted => "contradicted",
        }
    }

    /// Best-effort read of the first label mentioned in free-text model output.
    /// Returns `None` when no label appears or the first one is negated
    /// ("not supported"); the text itself is never rejected.
    pub fn detect(text: &str) -> Option<Verdict> {
        let m = VERDICT_RE.find(text)?;
        if is_negated(&text[..m.start()]) {
            return None;
        }
        let label = m.as_str().to_lowercase();
        Some(match label.as_str() {
            "supported" => Verdict::Supported,
            "inconclusive" => Verdict::Inconclusive,
            "contradicted" => Verdict::Contradicted,
            _ => Verdict::LikelySupported,
        })
    }
}

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "isn't", "wasn't", "aren't", "cannot", "can't", "neither", "nor",
];
const LINKING: &[&str] = &["be", "been", "being", "is", "was", "are", "were", "fully", "really"];

/// Whether the words right before a label negate it. Looks through up to two
/// linking words ("not been supported", "cannot be fully supported").
fn is_negated(prefix: &str) -> bool {
    let words = prefix.split_whitespace().rev().take(3).map(|w| {
        w.replace('\u{2019}', "'")
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
            .to_lowercase()
    });

    for word in words {
        if NEGATIONS.contains(&word.as_str()) {
            return true;
        }
        if !LINKING.contains(&word.as_str()) {
            return false;
        }
    }
    false
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Report Types ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Verdict triple for one claim. `analysis` is the classifier's raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimVerification {
    pub claim: String,
    pub analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiasAnalysis {
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    pub article_url: String,
    pub claims: Vec<ClaimVerification>,
    pub bias_analysis: BiasAnalysis,
    pub final_assessment: String,
}

// --- Pipeline State ---

/// Record threaded through one verification run. Stages never mutate a state
/// they are handed; each returns a new record with its additions merged in.
#[derive(Debug, Clone)]
pub struct VerificationState {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub article_url: String,
    pub article_text: Option<String>,
    pub article_metadata: Option<ArticleMetadata>,
    pub claims: Option<Vec<String>>,
    pub claim_verification_results: Option<Vec<ClaimVerification>>,
    pub bias_analysis: Option<BiasAnalysis>,
    pub final_report: Option<FinalReport>,
    pub error: Option<String>,
}

impl VerificationState {
    pub fn new(article_url: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            article_url: article_url.into(),
            article_text: None,
            article_metadata: None,
            claims: None,
            claim_verification_results: None,
            bias_analysis: None,
            final_report: None,
            error: None,
        }
    }

    pub fn with_article(&self, text: String, metadata: ArticleMetadata) -> Self {
        Self {
            article_text: Some(text),
            article_metadata: Some(metadata),
            ..self.clone()
        }
    }

    pub fn with_claims(&self, claims: Vec<String>) -> Self {
        Self {
            claims: Some(claims),
            ..self.clone()
        }
    }

    pub fn with_verification_results(&self, results: Vec<ClaimVerification>) -> Self {
        Self {
            claim_verification_results: Some(results),
            ..self.clone()
        }
    }

    pub fn with_bias_analysis(&self, bias: BiasAnalysis) -> Self {
        Self {
            bias_analysis: Some(bias),
            ..self.clone()
        }
    }

    pub fn with_final_report(&self, report: FinalReport) -> Self {
        Self {
            final_report: Some(report),
            ..self.clone()
        }
    }

    pub fn with_error(&self, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..self.clone()
        }
    }

    /// Collapse a finished (or aborted) run into what the caller sees.
    pub fn into_outcome(self) -> VerificationOutcome {
        if let Some(details) = self.error {
            return VerificationOutcome::Failed(VerificationFailure {
                error: VERIFICATION_FAILED.to_string(),
                details: Some(details),
            });
        }
        match self.final_report {
            Some(report) => VerificationOutcome::Report(report),
            None => VerificationOutcome::Failed(VerificationFailure {
                error: "Workflow completed but no final report was generated".to_string(),
                details: None,
            }),
        }
    }
}

// --- Outcome ---

pub const VERIFICATION_FAILED: &str = "Verification failed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Either the full report or a single error descriptor. Never partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerificationOutcome {
    Report(FinalReport),
    Failed(VerificationFailure),
}

impl VerificationOutcome {
    pub fn is_report(&self) -> bool {
        matches!(self, VerificationOutcome::Report(_))
    }
}
