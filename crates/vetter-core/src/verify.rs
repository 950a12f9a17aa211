//! Content Verifier: the anti-hallucination gate for unstructured
//! evidence.
//!
//! Two gates protect downstream scoring from fabricated claims:
//!
//! | Gate | Condition |
//! |------|-----------|
//! | **Substance** | source content must have enough real text before any generative summary of it is trusted |
//! | **Trust adjustment** | generative claims about the content are penalized when unsupported, hedged, or implausibly confident |
//!
//! Content failing the substance gate is marked unverified and excluded
//! entirely; it is never presented to the trust gate.

use lazy_static::lazy_static;
use regex::Regex;

use crate::text::{norm, tokenize};
use crate::types::{GenerativeInsight, WebContent};

const MIN_MAIN_TEXT_CHARS: usize = 200;
const MIN_TOTAL_CHARS: usize = 500;
const MIN_HEADINGS: usize = 2;
const MIN_LEXICAL_DIVERSITY: f64 = 0.3;
const MAX_BOILERPLATE_RATIO: f64 = 0.3;
const MAX_HEDGE_RATIO: f64 = 0.4;
const IMPLAUSIBLE_ALIGNMENT: f64 = 0.8;
const THIN_SOURCE_CHARS: usize = 1000;

lazy_static! {
    // Placeholder-page phrases. A page dominated by these is not a
    // real capability statement.
    static ref BOILERPLATE_PATTERNS: Vec<(&'static str, Regex)> = vec![
        ("placeholder page", Regex::new(r"(?i)\b(coming soon|under construction|check back (soon|later)|website (is )?being updated)\b").unwrap()),
        ("error page", Regex::new(r"(?i)\b(404|page not found|access denied|forbidden)\b").unwrap()),
        ("template filler", Regex::new(r"(?i)\b(lorem ipsum|sample text|your (text|content) here|insert .{0,20}here)\b").unwrap()),
        ("parked domain", Regex::new(r"(?i)\b(domain (is )?for sale|buy this domain|parked free)\b").unwrap()),
        ("chrome only", Regex::new(r"(?i)\b(enable javascript|javascript (is )?required|cookies? (are )?required)\b").unwrap()),
    ];

    // Hedged or vague phrasing in generative reasoning.
    static ref HEDGE_PATTERN: Regex = Regex::new(
        r"(?i)\b(likely|may|might|appears?|apparently|possibly|perhaps|seems?|could|presumably|probably|suggests?)\b"
    ).unwrap();
}

/// Outcome of the substance gate.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstanceCheck {
    pub verified: bool,
    /// Which checks failed, in check order.
    pub reasons: Vec<String>,
}

/// Outcome of the trust-adjustment gate.
#[derive(Debug, Clone, PartialEq)]
pub struct TrustAdjustment {
    /// Total penalty subtracted from the asserted alignment, capped at 1.0.
    pub penalty: f64,
    /// Alignment score after penalties, clamped to [0, 1].
    pub adjusted_alignment: f64,
    pub failed_checks: Vec<String>,
}

/// Gate 1: does the source content have enough substance to trust any
/// summarization of it?
pub fn check_substance(content: &WebContent) -> SubstanceCheck {
    let mut reasons = Vec::new();

    if content.main_text.len() < MIN_MAIN_TEXT_CHARS {
        reasons.push(format!(
            "main text under {} characters ({})",
            MIN_MAIN_TEXT_CHARS,
            content.main_text.len()
        ));
    }

    let total = content.total_len();
    if total < MIN_TOTAL_CHARS {
        reasons.push(format!(
            "total content under {} characters ({})",
            MIN_TOTAL_CHARS, total
        ));
    }

    if content.headings.len() < MIN_HEADINGS {
        reasons.push(format!(
            "fewer than {} headings ({})",
            MIN_HEADINGS,
            content.headings.len()
        ));
    }

    let words: Vec<String> = content
        .main_text
        .split_whitespace()
        .map(norm)
        .filter(|w| !w.is_empty())
        .collect();
    if !words.is_empty() {
        let unique: std::collections::BTreeSet<&String> = words.iter().collect();
        let diversity = unique.len() as f64 / words.len() as f64;
        if diversity < MIN_LEXICAL_DIVERSITY {
            reasons.push(format!("lexical diversity {:.2} below {}", diversity, MIN_LEXICAL_DIVERSITY));
        }
    }

    let boilerplate = boilerplate_ratio(content);
    if boilerplate > MAX_BOILERPLATE_RATIO {
        reasons.push(format!(
            "boilerplate ratio {:.2} above {}",
            boilerplate, MAX_BOILERPLATE_RATIO
        ));
    }

    SubstanceCheck {
        verified: reasons.is_empty(),
        reasons,
    }
}

/// Fraction of text segments dominated by placeholder phrases.
fn boilerplate_ratio(content: &WebContent) -> f64 {
    let segments: Vec<&str> = content
        .main_text
        .split(['.', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .chain(content.headings.iter().map(String::as_str))
        .collect();
    if segments.is_empty() {
        return 0.0;
    }
    let hits = segments
        .iter()
        .filter(|segment| {
            BOILERPLATE_PATTERNS
                .iter()
                .any(|(_, pattern)| pattern.is_match(segment))
        })
        .count();
    hits as f64 / segments.len() as f64
}

/// Gate 2: penalize a generative insight whose claims the verified
/// source content does not substantiate.
///
/// Callers must only pass content that passed [`check_substance`].
pub fn adjust_trust(insight: &GenerativeInsight, source: &WebContent) -> TrustAdjustment {
    let mut penalty = 0.0;
    let mut failed_checks = Vec::new();

    // Unsupported-claim fraction.
    if !insight.claims.is_empty() {
        let source_text = norm(&format!(
            "{} {} {} {} {}",
            source.title,
            source.meta_description,
            source.main_text,
            source.about,
            source.services.join(" ")
        ));
        let source_tokens = tokenize(&source_text);
        let failed = insight
            .claims
            .iter()
            .filter(|claim| !claim_supported(claim, &source_text, &source_tokens))
            .count();
        let fraction = failed as f64 / insight.claims.len() as f64;
        if fraction > 0.0 {
            penalty += 0.2 + 0.2 * fraction;
            failed_checks.push(format!(
                "{:.0}% of claimed capabilities unsupported by source text",
                fraction * 100.0
            ));
        }
    }

    // Hedged-language ratio in the reasoning.
    let hedge = hedge_ratio(&insight.reasoning);
    if hedge > MAX_HEDGE_RATIO {
        penalty += 0.3;
        failed_checks.push(format!("hedged language ratio {:.2} above {}", hedge, MAX_HEDGE_RATIO));
    }

    // Confident alignment claimed over a thin source.
    if insight.alignment > IMPLAUSIBLE_ALIGNMENT && source.total_len() < THIN_SOURCE_CHARS {
        penalty += 0.3;
        failed_checks.push(format!(
            "alignment {:.2} implausible for {} chars of source content",
            insight.alignment,
            source.total_len()
        ));
    }

    let penalty = penalty.min(1.0);
    TrustAdjustment {
        penalty,
        adjusted_alignment: (insight.alignment - penalty).clamp(0.0, 1.0),
        failed_checks,
    }
}

fn claim_supported(
    claim: &crate::types::InsightClaim,
    source_text: &str,
    source_tokens: &std::collections::BTreeSet<String>,
) -> bool {
    let capability_tokens = tokenize(&claim.capability);
    if !capability_tokens.is_empty()
        && capability_tokens.iter().all(|t| source_tokens.contains(t))
    {
        return true;
    }
    let evidence = norm(&claim.evidence);
    !evidence.is_empty() && source_text.contains(&evidence)
}

/// Fraction of sentences that contain hedged phrasing.
fn hedge_ratio(text: &str) -> f64 {
    let sentences: Vec<&str> = text
        .split(['.', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        return 0.0;
    }
    let hedged = sentences.iter().filter(|s| HEDGE_PATTERN.is_match(s)).count();
    hedged as f64 / sentences.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InsightClaim;

    fn substantive_content() -> WebContent {
        WebContent {
            url: "https://acme.example".to_string(),
            title: "Acme Federal Services".to_string(),
            meta_description: "Cloud migration and security engineering for federal agencies".to_string(),
            main_text: "Acme Federal delivers cloud migration, infrastructure modernization, \
                        and security engineering for civilian and defense agencies. Our teams \
                        hold agency-recognized certifications and support authority-to-operate \
                        packages, continuous monitoring, and zero trust architectures across \
                        hybrid environments. Past engagements include data center consolidation \
                        and mission system replatforming for cabinet-level departments."
                .to_string(),
            headings: vec![
                "Cloud Migration".to_string(),
                "Security Engineering".to_string(),
                "Past Performance".to_string(),
            ],
            services: vec!["cloud migration".to_string(), "security engineering".to_string()],
            about: "Founded in 2012, Acme supports federal modernization programs.".to_string(),
            keywords: vec!["cloud".to_string()],
        }
    }

    #[test]
    fn test_substantive_content_passes() {
        let check = check_substance(&substantive_content());
        assert!(check.verified, "unexpected failures: {:?}", check.reasons);
    }

    #[test]
    fn test_thin_content_fails_gate() {
        let content = WebContent {
            main_text: "Welcome to our site.".to_string(),
            ..WebContent::default()
        };
        let check = check_substance(&content);
        assert!(!check.verified);
        // A one-line body with no headings trips the length, total,
        // and heading checks.
        assert!(check.reasons.len() >= 3);
    }

    #[test]
    fn test_placeholder_page_fails_boilerplate_check() {
        let mut content = substantive_content();
        content.main_text = "Coming soon. Coming soon. Under construction. \
                             Our website is being updated. Check back soon."
            .to_string();
        let check = check_substance(&content);
        assert!(!check.verified);
        assert!(check
            .reasons
            .iter()
            .any(|r| r.contains("boilerplate")));
    }

    #[test]
    fn test_repetitive_text_fails_diversity_check() {
        let mut content = substantive_content();
        content.main_text = "services services services services services services \
                             services services services services services services"
            .repeat(4);
        let check = check_substance(&content);
        assert!(check.reasons.iter().any(|r| r.contains("lexical diversity")));
    }

    #[test]
    fn test_supported_claims_keep_alignment() {
        let insight = GenerativeInsight {
            claims: vec![InsightClaim {
                capability: "cloud migration".to_string(),
                evidence: String::new(),
            }],
            alignment: 0.7,
            reasoning: "The site describes cloud migration work for federal agencies.".to_string(),
            ..GenerativeInsight::default()
        };
        let adjustment = adjust_trust(&insight, &substantive_content());
        assert_eq!(adjustment.penalty, 0.0);
        assert!((adjustment.adjusted_alignment - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_unsupported_claims_penalized() {
        let insight = GenerativeInsight {
            claims: vec![
                InsightClaim {
                    capability: "quantum computing".to_string(),
                    evidence: String::new(),
                },
                InsightClaim {
                    capability: "cloud migration".to_string(),
                    evidence: String::new(),
                },
            ],
            alignment: 0.8,
            reasoning: "Strong alignment with the requirement.".to_string(),
            ..GenerativeInsight::default()
        };
        let adjustment = adjust_trust(&insight, &substantive_content());
        // Half the claims fail: penalty 0.2 + 0.2 * 0.5.
        assert!((adjustment.penalty - 0.3).abs() < 1e-9);
        assert!((adjustment.adjusted_alignment - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_hedged_reasoning_penalized() {
        let insight = GenerativeInsight {
            alignment: 0.6,
            reasoning: "The company likely does cloud work. It may have federal experience. \
                        It appears to offer security services. There seems to be some past performance."
                .to_string(),
            ..GenerativeInsight::default()
        };
        let adjustment = adjust_trust(&insight, &substantive_content());
        assert!((adjustment.penalty - 0.3).abs() < 1e-9);
        assert!(adjustment.failed_checks.iter().any(|c| c.contains("hedged")));
    }

    #[test]
    fn test_confident_alignment_on_thin_source_penalized() {
        let thin = WebContent {
            main_text: "Acme does cloud migration work for many agencies and partners across the country. \
                        We support modernization, engineering, and operations programs end to end with dedicated teams."
                .to_string(),
            headings: vec!["Services".to_string(), "About".to_string()],
            ..WebContent::default()
        };
        let insight = GenerativeInsight {
            alignment: 0.95,
            reasoning: "Exceptional match with confirmed federal experience.".to_string(),
            ..GenerativeInsight::default()
        };
        let adjustment = adjust_trust(&insight, &thin);
        assert!((adjustment.penalty - 0.3).abs() < 1e-9);
        assert!((adjustment.adjusted_alignment - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_penalty_capped_at_one() {
        let thin = WebContent {
            main_text: "short".to_string(),
            ..WebContent::default()
        };
        let insight = GenerativeInsight {
            claims: vec![InsightClaim {
                capability: "quantum teleportation".to_string(),
                evidence: String::new(),
            }],
            alignment: 0.95,
            reasoning: "Likely a match. May be suitable. Appears strong. Possibly ideal. Seems good."
                .to_string(),
            ..GenerativeInsight::default()
        };
        let adjustment = adjust_trust(&insight, &thin);
        assert!(adjustment.penalty <= 1.0);
        assert_eq!(adjustment.adjusted_alignment, 0.0);
    }
}
