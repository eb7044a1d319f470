use ai_client::{ChatModel, Message};
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::traits::JudgmentProvider;

pub const CLAIMS_PROMPT: &str = "Extract clear factual claims as bullet points.";
pub const ENTITIES_PROMPT: &str = "Return STRICT JSON with keys: person, location, country, event_type. Each value MUST be a single string or null. No arrays.";
pub const CLASSIFY_PROMPT: &str =
    "Classify claim as supported, likely_supported, inconclusive, or contradicted.";
pub const BIAS_PROMPT: &str = "Analyze bias or sensational language.";
pub const SCORE_PROMPT: &str = "Provide final confidence score (0–100) with explanation.";

/// Every judgment is one system instruction plus one human message sent to a
/// chat model. The reply comes back untouched.
pub struct LlmJudge<M> {
    model: M,
}

impl<M: ChatModel> LlmJudge<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    async fn ask(&self, task: &'static str, system: &str, human: String) -> Result<String> {
        debug!(task, model = self.model.model_name(), chars = human.len(), "Model call");
        self.model
            .chat(vec![Message::system(system), Message::user(human)])
            .await
    }
}

#[async_trait]
impl<M: ChatModel> JudgmentProvider for LlmJudge<M> {
    async fn extract_claims(&self, article_text: &str) -> Result<String> {
        self.ask("claims", CLAIMS_PROMPT, article_text.to_string())
            .await
    }

    async fn extract_entities(&self, claim: &str) -> Result<String> {
        self.ask("entities", ENTITIES_PROMPT, claim.to_string()).await
    }

    async fn classify(&self, claim: &str, sources_text: &str) -> Result<String> {
        self.ask(
            "classify",
            CLASSIFY_PROMPT,
            format!("Claim: {claim}\nSources:\n{sources_text}"),
        )
        .await
    }

    async fn assess_bias(&self, article_text: &str) -> Result<String> {
        self.ask("bias", BIAS_PROMPT, article_text.to_string()).await
    }

    async fn score(&self, claims_summary: &str, bias_text: &str) -> Result<String> {
        self.ask(
            "score",
            SCORE_PROMPT,
            format!("Claims:\n{claims_summary}\n\nBias:\n{bias_text}"),
        )
        .await
    }
}
