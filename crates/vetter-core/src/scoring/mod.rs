//! Scoring Engine: weighted multi-factor match scoring.
//!
//! Computes a normalized per-factor score for each [`MatchFactor`],
//! combines them into a weighted composite normalized by total
//! configured weight, then applies fail-fast ceilings for unmet hard
//! constraints (set-aside, clearance). The ceiling is applied after
//! the weighted sum and can only lower the score.

pub mod factors;

pub use factors::{all_scorers, FactorScorer};

use tracing::debug;

use crate::types::{Candidate, FactorScore, MatchFactor, MatchLabel, MatchResult, RequirementSet};
use crate::weights::WeightConfig;

/// Score one candidate against the requirement set.
///
/// Never fails: missing attributes degrade to each scorer's documented
/// default.
pub fn score(
    requirements: &RequirementSet,
    candidate: &Candidate,
    weights: &WeightConfig,
) -> MatchResult {
    let mut factor_scores = Vec::with_capacity(MatchFactor::ALL.len());
    let mut weighted_sum = 0.0;

    for scorer in all_scorers() {
        let factor = scorer.factor();
        let value = scorer.score(requirements, candidate).clamp(0.0, 1.0);
        let weight = weights.match_weight(factor);
        weighted_sum += value * weight;
        factor_scores.push(FactorScore {
            factor,
            score: value,
            weight,
        });
    }

    let total_weight = weights.match_weight_total();
    let mut composite = if total_weight > 0.0 {
        (weighted_sum / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut caps_applied = Vec::new();
    if !factors::meets_set_aside(requirements, candidate) {
        composite = composite.min(weights.hard_cap);
        caps_applied.push("set_aside".to_string());
    }
    if !factors::meets_clearance(requirements, candidate) {
        composite = composite.min(weights.hard_cap);
        caps_applied.push("clearance".to_string());
    }

    if !caps_applied.is_empty() {
        debug!(
            candidate = %candidate.id,
            caps = ?caps_applied,
            composite,
            "hard constraint unmet, composite capped"
        );
    }

    let (strengths, gaps) = describe(requirements, &factor_scores);

    MatchResult {
        composite,
        label: MatchLabel::from_score(composite),
        factors: factor_scores,
        strengths,
        gaps,
        caps_applied,
    }
}

fn factor_value(scores: &[FactorScore], factor: MatchFactor) -> f64 {
    scores
        .iter()
        .find(|s| s.factor == factor)
        .map(|s| s.score)
        .unwrap_or(0.0)
}

/// Fixed cut points turning factor scores into strength and gap text.
fn describe(requirements: &RequirementSet, scores: &[FactorScore]) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut gaps = Vec::new();

    if factor_value(scores, MatchFactor::Naics) >= 1.0 {
        strengths.push("NAICS match".to_string());
    } else {
        gaps.push("NAICS mismatch".to_string());
    }

    if factor_value(scores, MatchFactor::Capabilities) >= 0.7 {
        strengths.push("Capabilities aligned".to_string());
    } else {
        gaps.push("Capabilities gap".to_string());
    }

    if factor_value(scores, MatchFactor::PastPerformance) >= 0.6 {
        strengths.push("Relevant past performance".to_string());
    } else {
        gaps.push("Limited past performance alignment".to_string());
    }

    if factor_value(scores, MatchFactor::SizeStatus) >= 0.8 {
        strengths.push("Meets size status".to_string());
    }

    if factor_value(scores, MatchFactor::Clearance) >= 1.0 {
        strengths.push("Required clearance available".to_string());
    } else if requirements.security_clearance.is_some() {
        gaps.push("Missing required clearance".to_string());
    }

    if factor_value(scores, MatchFactor::Location) >= 1.0 {
        strengths.push("Location alignment".to_string());
    }

    if factor_value(scores, MatchFactor::Keywords) >= 0.6 {
        strengths.push("Keyword alignment".to_string());
    }

    (strengths, gaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::DEFAULT_HARD_CAP;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn requirements() -> RequirementSet {
        RequirementSet {
            id: "sol-1".to_string(),
            title: "Cloud migration support".to_string(),
            description: String::new(),
            agency: None,
            naics_codes: vec!["541512".to_string()],
            required_capabilities: vec!["cloud".to_string()],
            keywords: vec![],
            set_asides: vec![],
            security_clearance: None,
            place_of_performance: None,
        }
    }

    fn candidate() -> Candidate {
        Candidate {
            id: "c-1".to_string(),
            name: "Acme Federal".to_string(),
            description: None,
            naics_codes: vec!["541512".to_string()],
            capabilities: vec!["cloud".to_string(), "security".to_string()],
            keywords: vec![],
            certifications: vec![],
            socioeconomic_status: vec![],
            size: None,
            security_clearances: vec![],
            locations: vec![],
            employees: None,
            annual_revenue: None,
            website: None,
        }
    }

    fn equal_weights(factors: &[MatchFactor]) -> WeightConfig {
        let mut table = BTreeMap::new();
        for factor in factors {
            table.insert(*factor, 1.0);
        }
        WeightConfig {
            match_weights: table,
            ..WeightConfig::default()
        }
    }

    #[test]
    fn test_full_overlap_composites_to_one() {
        // Equal weights on naics and capabilities only: both factors
        // hit 1.0, so the normalized composite is 1.0.
        let weights = equal_weights(&[MatchFactor::Naics, MatchFactor::Capabilities]);
        let result = score(&requirements(), &candidate(), &weights);
        assert!((result.composite - 1.0).abs() < 1e-9);
        assert_eq!(result.label, MatchLabel::Recommended);
        assert!(result.caps_applied.is_empty());
    }

    #[test]
    fn test_missing_clearance_caps_composite() {
        let mut req = requirements();
        req.security_clearance = Some("Secret".to_string());
        let weights = equal_weights(&[MatchFactor::Naics, MatchFactor::Capabilities]);

        // All weighted factors score 1.0, but the unmet clearance caps
        // the composite at the ceiling.
        let result = score(&req, &candidate(), &weights);
        assert!(result.composite <= DEFAULT_HARD_CAP);
        assert_eq!(result.caps_applied, vec!["clearance".to_string()]);
        assert!(result.gaps.contains(&"Missing required clearance".to_string()));
    }

    #[test]
    fn test_unmet_set_aside_caps_composite() {
        let mut req = requirements();
        req.set_asides = vec!["8(a)".to_string()];
        let result = score(&req, &candidate(), &WeightConfig::default());
        assert!(result.composite <= DEFAULT_HARD_CAP);
        assert!(result.caps_applied.contains(&"set_aside".to_string()));
    }

    #[test]
    fn test_cap_never_raises_score() {
        // A candidate scoring below the ceiling keeps its own score
        // when a cap applies.
        let mut req = requirements();
        req.set_asides = vec!["8(a)".to_string()];
        req.naics_codes = vec!["999999".to_string()];
        let mut cand = candidate();
        cand.capabilities.clear();

        let result = score(&req, &cand, &WeightConfig::default());
        assert!(result.composite < DEFAULT_HARD_CAP);
    }

    #[test]
    fn test_strengths_and_gaps_text() {
        let result = score(&requirements(), &candidate(), &WeightConfig::default());
        assert!(result.strengths.contains(&"NAICS match".to_string()));
        assert!(result.strengths.contains(&"Capabilities aligned".to_string()));
        assert!(result.gaps.contains(&"Limited past performance alignment".to_string()));
    }

    #[test]
    fn test_empty_candidate_never_panics() {
        let cand = Candidate {
            id: "c-0".to_string(),
            name: String::new(),
            description: None,
            naics_codes: vec![],
            capabilities: vec![],
            keywords: vec![],
            certifications: vec![],
            socioeconomic_status: vec![],
            size: None,
            security_clearances: vec![],
            locations: vec![],
            employees: None,
            annual_revenue: None,
            website: None,
        };
        let result = score(&requirements(), &cand, &WeightConfig::default());
        assert!(result.composite >= 0.0 && result.composite <= 1.0);
    }

    proptest! {
        #[test]
        fn prop_composite_in_unit_interval(
            naics in proptest::collection::vec("[0-9]{6}", 0..4),
            caps in proptest::collection::vec("[a-z]{3,12}", 0..6),
            keywords in proptest::collection::vec("[a-z]{3,12}", 0..6),
        ) {
            let mut req = requirements();
            req.keywords = keywords;
            let mut cand = candidate();
            cand.naics_codes = naics;
            cand.capabilities = caps;

            let result = score(&req, &cand, &WeightConfig::default());
            prop_assert!(result.composite >= 0.0 && result.composite <= 1.0);
            for factor in &result.factors {
                prop_assert!(factor.score >= 0.0 && factor.score <= 1.0);
            }
        }

        #[test]
        fn prop_unmet_clearance_always_capped(caps in proptest::collection::vec("[a-z]{3,12}", 0..6)) {
            let mut req = requirements();
            req.security_clearance = Some("Top Secret".to_string());
            let mut cand = candidate();
            cand.capabilities = caps;
            cand.security_clearances.clear();

            let result = score(&req, &cand, &WeightConfig::default());
            prop_assert!(result.composite <= DEFAULT_HARD_CAP);
        }
    }
}
