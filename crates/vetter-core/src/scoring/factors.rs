//! Per-factor match scorers.
//!
//! Each scorer is a pure function of `(requirements, candidate)` into
//! `[0.0, 1.0]` and follows one of three patterns:
//!
//! | Pattern | Behavior |
//! |---------|----------|
//! | set-overlap | 1.0 on any normalized tag intersection, else 0.0 |
//! | coverage ratio | matched-required / total-required, clamped, with a documented neutral default when the requirement side is empty |
//! | fuzzy overlap | exact (1.0), partial (0.7), and free-text mention (0.5) credit per required item, summed and divided by requirement count |
//!
//! Scorers never fail: missing attributes degrade to the documented
//! default score.

use std::collections::BTreeSet;

use crate::text::{norm, norm_set, token_jaccard, tokenize};
use crate::types::{Candidate, MatchFactor, RequirementSet};

/// A pure scorer for one match factor.
pub trait FactorScorer {
    fn factor(&self) -> MatchFactor;

    /// Score the candidate against the requirement set for this factor.
    fn score(&self, requirements: &RequirementSet, candidate: &Candidate) -> f64;
}

/// All scorers in composite order.
pub fn all_scorers() -> Vec<Box<dyn FactorScorer>> {
    vec![
        Box::new(NaicsScorer),
        Box::new(CapabilityScorer),
        Box::new(PastPerformanceScorer),
        Box::new(SizeStatusScorer),
        Box::new(ClearanceScorer),
        Box::new(LocationScorer),
        Box::new(KeywordScorer),
    ]
}

/// Exact industry-code overlap.
pub struct NaicsScorer;

impl FactorScorer for NaicsScorer {
    fn factor(&self) -> MatchFactor {
        MatchFactor::Naics
    }

    fn score(&self, requirements: &RequirementSet, candidate: &Candidate) -> f64 {
        let required = norm_set(&requirements.naics_codes);
        let claimed = norm_set(&candidate.naics_codes);
        if !required.is_empty() && !required.is_disjoint(&claimed) {
            1.0
        } else {
            0.0
        }
    }
}

/// Fuzzy capability coverage: full credit for exact matches, partial
/// credit for substring or token overlap, mention credit when the
/// capability only appears in the candidate's free-text description.
pub struct CapabilityScorer;

impl CapabilityScorer {
    fn credit(required: &str, claimed: &BTreeSet<String>, description_tokens: &BTreeSet<String>) -> f64 {
        if claimed.contains(required) {
            return 1.0;
        }
        let partial = claimed.iter().any(|cap| {
            cap.contains(required) || required.contains(cap.as_str()) || token_jaccard(cap, required) >= 0.5
        });
        if partial {
            return 0.7;
        }
        if tokenize(required)
            .iter()
            .all(|token| description_tokens.contains(token))
        {
            return 0.5;
        }
        0.0
    }
}

impl FactorScorer for CapabilityScorer {
    fn factor(&self) -> MatchFactor {
        MatchFactor::Capabilities
    }

    fn score(&self, requirements: &RequirementSet, candidate: &Candidate) -> f64 {
        let mut required = norm_set(&requirements.required_capabilities);
        if required.is_empty() {
            // Fall back to requirement keywords when no explicit
            // capability list is given.
            required = norm_set(&requirements.keywords);
        }
        let claimed = norm_set(&candidate.capabilities);
        if required.is_empty() {
            return if claimed.is_empty() { 0.0 } else { 0.5 };
        }

        let description_tokens = candidate
            .description
            .as_deref()
            .map(tokenize)
            .unwrap_or_default();

        let credit: f64 = required
            .iter()
            .map(|req| Self::credit(req, &claimed, &description_tokens))
            .sum();
        (credit / required.len() as f64).clamp(0.0, 1.0)
    }
}

/// Keyword coverage against the candidate's own keywords and
/// description text. A crude proxy for relevant track record.
pub struct PastPerformanceScorer;

impl FactorScorer for PastPerformanceScorer {
    fn factor(&self) -> MatchFactor {
        MatchFactor::PastPerformance
    }

    fn score(&self, requirements: &RequirementSet, candidate: &Candidate) -> f64 {
        let required = norm_set(&requirements.keywords);
        let mut claimed = norm_set(&candidate.keywords);
        if let Some(description) = &candidate.description {
            claimed.extend(tokenize(description));
        }
        if required.is_empty() {
            return if claimed.is_empty() { 0.0 } else { 0.3 };
        }
        let overlap = required.intersection(&claimed).count();
        (overlap as f64 / required.len() as f64).clamp(0.0, 1.0)
    }
}

/// Size preference when a small-business set-aside is in play.
pub struct SizeStatusScorer;

impl FactorScorer for SizeStatusScorer {
    fn factor(&self) -> MatchFactor {
        MatchFactor::SizeStatus
    }

    fn score(&self, requirements: &RequirementSet, candidate: &Candidate) -> f64 {
        let required = norm_set(&requirements.set_asides);
        let size = candidate.size.as_deref().map(norm).unwrap_or_default();
        if required.is_empty() {
            return if size.is_empty() { 0.0 } else { 0.5 };
        }
        if required.contains("small business") || required.contains("sb") {
            return if size == "small" || size == "micro" {
                1.0
            } else {
                0.0
            };
        }
        0.5
    }
}

/// Clearance claim check. Neutral when no clearance is required.
pub struct ClearanceScorer;

impl FactorScorer for ClearanceScorer {
    fn factor(&self) -> MatchFactor {
        MatchFactor::Clearance
    }

    fn score(&self, requirements: &RequirementSet, candidate: &Candidate) -> f64 {
        let Some(required) = requirements.security_clearance.as_deref() else {
            return 0.5;
        };
        let required = norm(required);
        if required.is_empty() {
            return 0.5;
        }
        let claimed = norm_set(&candidate.security_clearances);
        if claimed.contains(&required) {
            1.0
        } else {
            0.0
        }
    }
}

/// Place-of-performance word overlap.
pub struct LocationScorer;

impl FactorScorer for LocationScorer {
    fn factor(&self) -> MatchFactor {
        MatchFactor::Location
    }

    fn score(&self, requirements: &RequirementSet, candidate: &Candidate) -> f64 {
        let place_tokens = requirements
            .place_of_performance
            .as_deref()
            .map(tokenize)
            .unwrap_or_default();
        let location_tokens: BTreeSet<String> = candidate
            .locations
            .iter()
            .flat_map(|loc| tokenize(loc))
            .collect();

        if !place_tokens.is_empty() && !place_tokens.is_disjoint(&location_tokens) {
            1.0
        } else if !candidate.locations.is_empty() {
            0.4
        } else {
            0.0
        }
    }
}

/// Requirement keyword coverage against capabilities and keywords.
pub struct KeywordScorer;

impl FactorScorer for KeywordScorer {
    fn factor(&self) -> MatchFactor {
        MatchFactor::Keywords
    }

    fn score(&self, requirements: &RequirementSet, candidate: &Candidate) -> f64 {
        let required = norm_set(&requirements.keywords);
        let mut claimed = norm_set(&candidate.capabilities);
        claimed.extend(norm_set(&candidate.keywords));
        if required.is_empty() {
            return if claimed.is_empty() { 0.0 } else { 0.3 };
        }
        let overlap = required.intersection(&claimed).count();
        (overlap as f64 / required.len() as f64).clamp(0.0, 1.0)
    }
}

/// Whether the candidate satisfies a mandatory set-aside, if one is
/// required.
pub fn meets_set_aside(requirements: &RequirementSet, candidate: &Candidate) -> bool {
    let required = norm_set(&requirements.set_asides);
    if required.is_empty() {
        return true;
    }
    let claimed = norm_set(&candidate.socioeconomic_status);
    !required.is_disjoint(&claimed)
}

/// Whether the candidate claims the mandatory clearance, if one is
/// required.
pub fn meets_clearance(requirements: &RequirementSet, candidate: &Candidate) -> bool {
    let Some(required) = requirements.security_clearance.as_deref() else {
        return true;
    };
    let required = norm(required);
    if required.is_empty() {
        return true;
    }
    norm_set(&candidate.security_clearances).contains(&required)
}
