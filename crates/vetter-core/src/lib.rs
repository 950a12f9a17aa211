//! # vetter-core
//!
//! Deterministic candidate evaluation engine.
//!
//! This crate answers three questions about a candidate entity facing a
//! requirement set:
//! - How well does the candidate's profile match the requirements?
//! - Does external evidence confirm what the profile claims?
//! - Taking both together, should this candidate be pursued?
//!
//! The three stages run in order, each feeding the next:
//!
//! ```text
//! RequirementSet + Candidate
//!         |
//!    scoring::score        -> MatchResult      (weighted factor match)
//!         |
//!    confirm::confirm      -> ConfirmationVerdict (evidence aggregation)
//!         |
//!    validate::validate    -> ValidationVerdict   (composite judgment)
//! ```
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: same inputs always produce the same verdicts
//! 2. **No I/O**: evidence arrives as pre-fetched [`EvidenceBundle`]s;
//!    fetching belongs to the runtime crate
//! 3. **Bounded**: every score and confidence lands in `[0.0, 1.0]`
//! 4. **Traceable**: every verdict carries the per-factor breakdown and
//!    plain-text rationale behind it
//!
//! ## Example
//!
//! ```rust,ignore
//! use vetter_core::{evaluate_candidate, WeightConfig};
//!
//! let weights = WeightConfig::default();
//! let evaluation = evaluate_candidate(&requirements, &candidate, &bundles, &weights);
//! println!("{}: {}", candidate.name, evaluation.validation.recommendation);
//! ```

pub mod confirm;
pub mod scoring;
pub mod text;
pub mod types;
pub mod validate;
pub mod verify;
pub mod weights;

// Re-export main types at crate root
pub use types::{
    Candidate, ConfirmationFactorKind, ConfirmationVerdict, DataCompleteness, EnrichmentQuality,
    EvidenceBundle, EvidenceFactor, EvidencePayload, EvidenceStatus, FactorScore,
    GenerativeInsight, InsightClaim, MatchFactor, MatchLabel, MatchResult, RequirementSet,
    RiskLevel, ValidationComponent, ValidationComponentKind, ValidationLevel, ValidationVerdict,
    WebContent,
};
pub use weights::{WeightConfig, WeightError, DEFAULT_HARD_CAP};

use serde::{Deserialize, Serialize};

/// All three stage outputs for one candidate, in pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    pub match_result: MatchResult,
    pub confirmation: ConfirmationVerdict,
    pub validation: ValidationVerdict,
}

/// Run the full three-stage pipeline for one candidate.
///
/// Pure and synchronous: all evidence must already be fetched. The
/// runtime crate wraps this with providers, timeouts, and concurrency.
pub fn evaluate_candidate(
    requirements: &RequirementSet,
    candidate: &Candidate,
    bundles: &[EvidenceBundle],
    weights: &WeightConfig,
) -> CandidateEvaluation {
    let match_result = scoring::score(requirements, candidate, weights);
    let confirmation = confirm::confirm(candidate, requirements, bundles, weights);
    let validation = validate::validate(
        candidate,
        requirements,
        &match_result,
        &confirmation,
        bundles,
        weights,
    );
    CandidateEvaluation {
        match_result,
        confirmation,
        validation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirements() -> RequirementSet {
        RequirementSet {
            id: "sol-9".to_string(),
            title: "Data platform modernization".to_string(),
            description: "Modernize the agency data platform".to_string(),
            agency: Some("DOE".to_string()),
            naics_codes: vec!["541511".to_string()],
            required_capabilities: vec!["data engineering".to_string()],
            keywords: vec!["data".to_string(), "platform".to_string()],
            set_asides: vec![],
            security_clearance: None,
            place_of_performance: None,
        }
    }

    fn candidate() -> Candidate {
        Candidate {
            id: "c-9".to_string(),
            name: "Northbridge Data".to_string(),
            description: Some("Data engineering and platform modernization".to_string()),
            naics_codes: vec!["541511".to_string()],
            capabilities: vec!["data engineering".to_string()],
            keywords: vec!["data".to_string(), "platform".to_string()],
            certifications: vec![],
            socioeconomic_status: vec![],
            size: Some("small".to_string()),
            security_clearances: vec![],
            locations: vec![],
            employees: Some(30),
            annual_revenue: Some(4_000_000.0),
            website: Some("https://northbridge.example".to_string()),
        }
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let req = requirements();
        let cand = candidate();
        let weights = WeightConfig::default();
        let bundles = vec![EvidenceBundle::empty("awards_db")];

        let a = evaluate_candidate(&req, &cand, &bundles, &weights);
        let b = evaluate_candidate(&req, &cand, &bundles, &weights);
        assert_eq!(a.match_result, b.match_result);
        assert_eq!(a.confirmation.overall_status, b.confirmation.overall_status);
        assert_eq!(a.validation.composite, b.validation.composite);
        assert_eq!(a.validation.level, b.validation.level);
    }

    #[test]
    fn test_stages_reference_same_candidate() {
        let evaluation = evaluate_candidate(
            &requirements(),
            &candidate(),
            &[],
            &WeightConfig::default(),
        );
        assert_eq!(evaluation.confirmation.candidate_id, "c-9");
        assert_eq!(evaluation.validation.candidate_id, "c-9");
        assert!(evaluation.match_result.composite >= 0.0);
        assert!(evaluation.match_result.composite <= 1.0);
    }

    #[test]
    fn test_no_evidence_yields_insufficient_data() {
        let evaluation = evaluate_candidate(
            &requirements(),
            &candidate(),
            &[],
            &WeightConfig::default(),
        );
        // Nothing to confirm against, so the confirmation stage cannot
        // land above insufficient data and validation stays cautious.
        assert_eq!(
            evaluation.confirmation.overall_status,
            EvidenceStatus::InsufficientData
        );
        assert!(evaluation.validation.level <= ValidationLevel::Acceptable);
    }
}
