use anyhow::{Context, Result};
use tracing::info;

use crate::traits::JudgmentProvider;

/// Split a bullet list into claims: one per non-blank line, with leading
/// dashes and whitespace stripped. Any bullet style other than `-` survives
/// as part of the claim text.
pub fn parse_claims(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.trim_matches(|c: char| c == '-' || c.is_whitespace()))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn extract_claims(judge: &dyn JudgmentProvider, article_text: &str) -> Result<Vec<String>> {
    let raw = judge
        .extract_claims(article_text)
        .await
        .context("Claim extraction failed")?;
    let claims = parse_claims(&raw);
    info!(count = claims.len(), "Claims extracted");
    Ok(claims)
}
