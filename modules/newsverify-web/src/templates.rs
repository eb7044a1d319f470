use newsverify_common::{
    ClaimVerification, Config, FinalReport, SourceRef, SourceTier, Verdict, VerificationFailure,
};

pub const INVALID_URL_MESSAGE: &str = "Please enter a valid article URL.";
const NO_CLAIMS_MESSAGE: &str = "No clear factual claims were extracted.";
const NO_SOURCES_MESSAGE: &str = "No external sources found.";
const NO_BIAS_MESSAGE: &str = "No bias analysis available.";

/// Landing page with the URL form. `warning` is shown above the form.
pub fn render_index(warning: Option<&str>, url: &str) -> String {
    let warning_html = match warning {
        Some(w) => format!(r#"<div class="warning">{}</div>"#, html_escape(w)),
        None => String::new(),
    };

    let content = format!(
        r#"<div class="container">
    <p class="intro">Paste a news article URL. Each factual claim is checked against web sources, the text is reviewed for bias, and a final confidence score is produced.</p>
    {warning_html}
    {form}
</div>"#,
        form = render_form(url),
    );

    build_page("Verify an article", &content)
}

fn render_form(url: &str) -> String {
    format!(
        r#"<form method="post" action="/verify" class="verify-form">
        <input type="url" name="article_url" placeholder="https://..." value="{}" required>
        <button type="submit">Verify Article</button>
    </form>"#,
        html_escape(url)
    )
}

/// Sources on a configured trusted news domain get a "trusted" marker.
pub fn render_report(report: &FinalReport, config: &Config) -> String {
    let claims_html = if report.claims.is_empty() {
        format!(r#"<p class="empty">{NO_CLAIMS_MESSAGE}</p>"#)
    } else {
        report
            .claims
            .iter()
            .map(|c| render_claim(c, config))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let bias = report.bias_analysis.analysis.trim();
    let bias_html = if bias.is_empty() {
        format!(r#"<p class="empty">{NO_BIAS_MESSAGE}</p>"#)
    } else {
        format!(r#"<div class="text-block">{}</div>"#, html_escape(bias))
    };

    let content = format!(
        r#"<div class="container">
    <p class="article-url">Article: <a href="{url}" target="_blank" rel="noopener">{url}</a></p>
    <h2>Claim Verification</h2>
    {claims_html}
    <h2>Bias Analysis</h2>
    {bias_html}
    <h2>Final Assessment</h2>
    <div class="text-block assessment">{assessment}</div>
    {form}
</div>"#,
        url = html_escape(&report.article_url),
        assessment = html_escape(&report.final_assessment),
        form = render_form(""),
    );

    build_page("Verification report", &content)
}

fn render_claim(claim: &ClaimVerification, config: &Config) -> String {
    let badge = match claim.verdict {
        Some(v) => format!(
            r#"<span class="badge badge-{cls}">{label}</span>"#,
            cls = verdict_class(v),
            label = v.as_str().replace('_', " "),
        ),
        None => String::new(),
    };

    let sources_html = if claim.sources.is_empty() {
        format!(r#"<p class="empty">{NO_SOURCES_MESSAGE}</p>"#)
    } else {
        let items: String = claim
            .sources
            .iter()
            .map(|s| render_source(s, config))
            .collect::<Vec<_>>()
            .join("");
        format!(r#"<ul class="sources">{items}</ul>"#)
    };

    format!(
        r#"<details class="claim">
        <summary>{badge}{claim}</summary>
        <h4>Analysis</h4>
        <div class="text-block">{analysis}</div>
        <h4>Sources</h4>
        {sources_html}
    </details>"#,
        claim = html_escape(&claim.claim),
        analysis = html_escape(&claim.analysis),
    )
}

fn render_source(source: &SourceRef, config: &Config) -> String {
    let title = if source.title.trim().is_empty() {
        &source.url
    } else {
        &source.title
    };
    let trusted_html = if config.is_trusted(&source.url) {
        r#"<span class="trusted">trusted</span>"#
    } else {
        ""
    };
    format!(
        r#"<li><span class="tier tier-{tier_cls}">{tier}</span><a href="{url}" target="_blank" rel="noopener">{title}</a>{trusted_html}</li>"#,
        tier_cls = tier_class(source.tier),
        tier = source.tier.as_str().replace('_', " "),
        url = html_escape(&source.url),
        title = html_escape(title),
    )
}

pub fn render_failure(failure: &VerificationFailure, url: &str) -> String {
    let details_html = match &failure.details {
        Some(d) => format!(r#"<pre class="details">{}</pre>"#, html_escape(d)),
        None => String::new(),
    };
    let content = format!(
        r#"<div class="container">
    <div class="error"><strong>{error}</strong>{details_html}</div>
    {form}
</div>"#,
        error = html_escape(&failure.error),
        form = render_form(url),
    );
    build_page("Verification failed", &content)
}

fn verdict_class(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Supported => "supported",
        Verdict::LikelySupported => "likely",
        Verdict::Inconclusive => "inconclusive",
        Verdict::Contradicted => "contradicted",
    }
}

fn tier_class(tier: SourceTier) -> &'static str {
    match tier {
        SourceTier::Tier1 => "1",
        SourceTier::Tier2 => "2",
        SourceTier::Tier3 => "3",
    }
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | News Verification</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.header{{background:#1a1a1a;color:#fff;padding:12px 24px;}}
.header h1{{font-size:18px;font-weight:600;}}
.container{{max-width:860px;margin:0 auto;padding:24px;}}
h2{{font-size:18px;margin:24px 0 12px;}}
h4{{font-size:13px;color:#666;margin:12px 0 6px;}}
.intro{{color:#555;font-size:14px;margin-bottom:16px;}}
.verify-form{{display:flex;gap:8px;margin-top:24px;}}
.verify-form input{{flex:1;padding:8px 12px;border:1px solid #ccc;border-radius:4px;font-size:14px;}}
.verify-form button{{padding:8px 16px;background:#0066cc;color:#fff;border:none;border-radius:4px;font-size:14px;cursor:pointer;}}
.verify-form button:hover{{background:#004499;}}
.warning{{background:#fff8e1;border:1px solid #ffecb3;padding:8px 12px;border-radius:4px;font-size:13px;color:#795548;}}
.error{{background:#fce4ec;border:1px solid #f8bbd0;padding:12px;border-radius:4px;color:#c62828;}}
.error .details{{margin-top:8px;font-size:12px;white-space:pre-wrap;color:#555;}}
.article-url{{font-size:13px;color:#888;}}
.article-url a{{color:#0066cc;}}
.claim{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:12px 16px;margin-bottom:12px;}}
.claim summary{{cursor:pointer;font-weight:500;}}
.text-block{{white-space:pre-wrap;font-size:14px;line-height:1.5;color:#333;}}
.empty{{font-size:13px;color:#888;}}
.badge{{display:inline-block;padding:2px 8px;border-radius:12px;font-size:11px;font-weight:600;text-transform:uppercase;margin-right:8px;}}
.badge-supported{{background:#e8f5e9;color:#2e7d32;}}
.badge-likely{{background:#e3f2fd;color:#1565c0;}}
.badge-inconclusive{{background:#f5f5f5;color:#616161;}}
.badge-contradicted{{background:#fce4ec;color:#c62828;}}
.sources{{list-style:none;}}
.sources li{{font-size:13px;margin-bottom:4px;}}
.sources a{{color:#0066cc;}}
.tier{{display:inline-block;width:56px;font-size:11px;color:#888;text-transform:uppercase;}}
.tier-1{{color:#2e7d32;font-weight:600;}}
.trusted{{margin-left:6px;font-size:11px;color:#2e7d32;}}
</style>
</head>
<body>
<div class="header"><h1>News Verification</h1></div>
{content}
</body>
</html>"#
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsverify_common::BiasAnalysis;

    fn config(trusted_domains: &str) -> Config {
        Config::from_lookup(|key| match key {
            "OPENROUTER_API_KEY" => Some("sk-or-test".to_string()),
            "TRUSTED_NEWS_DOMAINS" => Some(trusted_domains.to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn report(claims: Vec<ClaimVerification>, bias: &str) -> FinalReport {
        FinalReport {
            article_url: "https://example.com/a".to_string(),
            claims,
            bias_analysis: BiasAnalysis {
                analysis: bias.to_string(),
            },
            final_assessment: "Score: 70".to_string(),
        }
    }

    #[test]
    fn empty_report_uses_placeholders() {
        let html = render_report(&report(vec![], "  "), &config("bbc.com"));
        assert!(html.contains(NO_CLAIMS_MESSAGE));
        assert!(html.contains(NO_BIAS_MESSAGE));
        assert!(html.contains("Score: 70"));
    }

    #[test]
    fn claim_section_lists_tiered_sources() {
        let claim = ClaimVerification {
            claim: "Rain <fell>".to_string(),
            analysis: "supported".to_string(),
            verdict: Some(Verdict::Supported),
            sources: vec![SourceRef {
                title: "BBC story".to_string(),
                url: "https://www.bbc.com/news/1".to_string(),
                snippet: String::new(),
                tier: SourceTier::Tier1,
            }],
        };
        let html = render_report(&report(vec![claim], "Neutral."), &config("bbc.com"));

        assert_eq!(html.matches("<details").count(), 1);
        assert!(html.contains("Rain &lt;fell&gt;"));
        assert!(html.contains("badge-supported"));
        assert!(html.contains("tier 1"));
        assert!(html.contains(r#"class="trusted""#));
        assert!(!html.contains(NO_SOURCES_MESSAGE));
    }

    #[test]
    fn trusted_marker_follows_configured_domains() {
        let claim = ClaimVerification {
            claim: "Rain fell".to_string(),
            analysis: "supported".to_string(),
            verdict: Some(Verdict::Supported),
            sources: vec![SourceRef {
                title: "BBC story".to_string(),
                url: "https://www.bbc.com/news/1".to_string(),
                snippet: String::new(),
                tier: SourceTier::Tier1,
            }],
        };
        let report = report(vec![claim], "Neutral.");

        let html = render_report(&report, &config("dawn.com, reuters.com"));
        assert!(html.contains("tier 1"));
        assert!(!html.contains(r#"class="trusted""#));

        let html = render_report(&report, &config("dawn.com, bbc.com"));
        assert!(html.contains(r#"class="trusted""#));
    }

    #[test]
    fn claim_without_sources_says_so() {
        let claim = ClaimVerification {
            claim: "X happened".to_string(),
            analysis: "Hard to say.".to_string(),
            verdict: None,
            sources: vec![],
        };
        let html = render_report(&report(vec![claim], "Neutral."), &config("bbc.com"));
        assert!(html.contains(NO_SOURCES_MESSAGE));
        assert!(!html.contains("class=\"badge "));
    }

    #[test]
    fn failure_page_shows_details() {
        let html = render_failure(
            &VerificationFailure {
                error: "Verification failed".to_string(),
                details: Some("fetching: timed out".to_string()),
            },
            "https://example.com/a",
        );
        assert!(html.contains("Verification failed"));
        assert!(html.contains("fetching: timed out"));
    }
}
