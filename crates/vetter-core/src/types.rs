//! Core data model for the evaluation pipeline.
//!
//! Every score and confidence in these types is a value in `[0.0, 1.0]`,
//! clamped by the producer before the record is returned. Records are
//! created fresh per evaluation and never mutated after return.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The target specification a candidate is scored against.
///
/// Immutable for the duration of an evaluation run; the pipeline only
/// reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSet {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub agency: Option<String>,
    #[serde(default)]
    pub naics_codes: Vec<String>,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Mandatory socioeconomic set-asides. Unmet set-asides cap the
    /// composite match score.
    #[serde(default)]
    pub set_asides: Vec<String>,
    /// Mandatory clearance level, if any. Unmet clearance caps the
    /// composite match score.
    #[serde(default)]
    pub security_clearance: Option<String>,
    #[serde(default)]
    pub place_of_performance: Option<String>,
}

/// An entity being evaluated. Owned by the caller; the pipeline only
/// reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub naics_codes: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub socioeconomic_status: Vec<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub security_clearances: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub employees: Option<u32>,
    #[serde(default)]
    pub annual_revenue: Option<f64>,
    #[serde(default)]
    pub website: Option<String>,
}

/// One named dimension of the initial match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFactor {
    Naics,
    Capabilities,
    PastPerformance,
    SizeStatus,
    Clearance,
    Location,
    Keywords,
}

impl MatchFactor {
    pub const ALL: [MatchFactor; 7] = [
        MatchFactor::Naics,
        MatchFactor::Capabilities,
        MatchFactor::PastPerformance,
        MatchFactor::SizeStatus,
        MatchFactor::Clearance,
        MatchFactor::Location,
        MatchFactor::Keywords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchFactor::Naics => "naics",
            MatchFactor::Capabilities => "capabilities",
            MatchFactor::PastPerformance => "past_performance",
            MatchFactor::SizeStatus => "size_status",
            MatchFactor::Clearance => "clearance",
            MatchFactor::Location => "location",
            MatchFactor::Keywords => "keywords",
        }
    }
}

impl fmt::Display for MatchFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-factor score with the weight it carried in the composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: MatchFactor,
    pub score: f64,
    pub weight: f64,
}

/// Qualitative band for the composite match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLabel {
    Recommended,
    Borderline,
    NotRecommended,
}

impl MatchLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.75 {
            MatchLabel::Recommended
        } else if score >= 0.5 {
            MatchLabel::Borderline
        } else {
            MatchLabel::NotRecommended
        }
    }
}

/// Output of the Scoring Engine for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub composite: f64,
    pub factors: Vec<FactorScore>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub label: MatchLabel,
    /// Hard constraints that were unmet and capped the composite.
    pub caps_applied: Vec<String>,
}

/// Classification of how well evidence supports a confirmable factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    Confirmed,
    PartiallyConfirmed,
    Unconfirmed,
    Contradicted,
    InsufficientData,
}

impl EvidenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceStatus::Confirmed => "confirmed",
            EvidenceStatus::PartiallyConfirmed => "partially_confirmed",
            EvidenceStatus::Unconfirmed => "unconfirmed",
            EvidenceStatus::Contradicted => "contradicted",
            EvidenceStatus::InsufficientData => "insufficient_data",
        }
    }
}

impl fmt::Display for EvidenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six confirmable factors of the Evidence Aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationFactorKind {
    PastPerformanceConfirmation,
    CapabilityVerification,
    CertificationValidation,
    SizeClearanceConfirmation,
    MarketPresence,
    TechnicalExpertise,
}

impl ConfirmationFactorKind {
    pub const ALL: [ConfirmationFactorKind; 6] = [
        ConfirmationFactorKind::PastPerformanceConfirmation,
        ConfirmationFactorKind::CapabilityVerification,
        ConfirmationFactorKind::CertificationValidation,
        ConfirmationFactorKind::SizeClearanceConfirmation,
        ConfirmationFactorKind::MarketPresence,
        ConfirmationFactorKind::TechnicalExpertise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationFactorKind::PastPerformanceConfirmation => "past_performance_confirmation",
            ConfirmationFactorKind::CapabilityVerification => "capability_verification",
            ConfirmationFactorKind::CertificationValidation => "certification_validation",
            ConfirmationFactorKind::SizeClearanceConfirmation => "size_clearance_confirmation",
            ConfirmationFactorKind::MarketPresence => "market_presence",
            ConfirmationFactorKind::TechnicalExpertise => "technical_expertise",
        }
    }
}

impl fmt::Display for ConfirmationFactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One confirmable factor's verdict: status, confidence, and the
/// human-readable evidence behind both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceFactor {
    pub kind: ConfirmationFactorKind,
    pub status: EvidenceStatus,
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub contradictions: Vec<String>,
    pub weight: f64,
}

/// Bundle-level quality metrics across all providers queried for one
/// candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentQuality {
    pub total_sources: usize,
    pub successful_sources: usize,
    pub success_rate: f64,
    pub average_confidence: f64,
}

/// How complete the candidate profile and source coverage were.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCompleteness {
    /// Fraction of key profile fields that are populated.
    pub profile: f64,
    /// Fraction of priority sources that returned usable data.
    pub source_coverage: f64,
    pub overall: f64,
}

/// Output of the Evidence Aggregator for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationVerdict {
    pub candidate_id: String,
    pub overall_status: EvidenceStatus,
    pub overall_confidence: f64,
    pub factors: Vec<EvidenceFactor>,
    pub sources_used: Vec<String>,
    pub summary: String,
    pub enrichment: EnrichmentQuality,
    pub completeness: DataCompleteness,
    pub confirmed_at: DateTime<Utc>,
}

impl ConfirmationVerdict {
    pub fn factor(&self, kind: ConfirmationFactorKind) -> Option<&EvidenceFactor> {
        self.factors.iter().find(|f| f.kind == kind)
    }
}

/// A federal contract record from a structured award database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    #[serde(default)]
    pub awarding_agency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

/// A research grant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantRecord {
    pub title: String,
    #[serde(default)]
    pub agency: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// An innovation award record (SBIR/STTR style, with a phase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardRecord {
    pub title: String,
    #[serde(default)]
    pub phase: Option<String>,
}

/// A granted patent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatentRecord {
    pub title: String,
}

/// Scraped unstructured page content. Input to the Content Verifier's
/// minimum-content gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebContent {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub main_text: String,
    #[serde(default)]
    pub headings: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl WebContent {
    /// Total character count across all text fields.
    pub fn total_len(&self) -> usize {
        self.title.len()
            + self.meta_description.len()
            + self.main_text.len()
            + self.about.len()
            + self.headings.iter().map(String::len).sum::<usize>()
            + self.services.iter().map(String::len).sum::<usize>()
    }
}

/// One capability claim made by a generative-insight provider, with the
/// evidence text it cited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightClaim {
    pub capability: String,
    #[serde(default)]
    pub evidence: String,
}

/// Structured output of a generative-insight provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerativeInsight {
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub key_differentiators: Vec<String>,
    #[serde(default)]
    pub claims: Vec<InsightClaim>,
    /// Alignment score the provider asserted, before trust adjustment.
    #[serde(default)]
    pub alignment: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub reasoning: String,
}

/// Typed payload of an evidence bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidencePayload {
    ContractHistory {
        records: Vec<ContractRecord>,
        agencies: Vec<String>,
    },
    ResearchGrants {
        grants: Vec<GrantRecord>,
    },
    InnovationAwards {
        awards: Vec<AwardRecord>,
    },
    Patents {
        patents: Vec<PatentRecord>,
    },
    WebContent(WebContent),
    WebPresence {
        snippets: Vec<String>,
        total_results: u64,
    },
    CrmProfile {
        industry: Option<String>,
        website: Option<String>,
    },
    Generative(GenerativeInsight),
}

/// What one provider returned for one candidate. Transient; never
/// persisted.
///
/// "No data found" is a valid response: `payload` is `None` and `error`
/// is `None`. A populated `error` marks a genuine transport or auth
/// failure and excludes the bundle from aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub source: String,
    pub payload: Option<EvidencePayload>,
    pub confidence: f64,
    #[serde(default)]
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl EvidenceBundle {
    pub fn new(source: impl Into<String>, payload: EvidencePayload, confidence: f64) -> Self {
        Self {
            source: source.into(),
            payload: Some(payload),
            confidence: confidence.clamp(0.0, 1.0),
            error: None,
            fetched_at: Utc::now(),
        }
    }

    /// An empty "no data found" response.
    pub fn empty(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            payload: None,
            confidence: 0.0,
            error: None,
            fetched_at: Utc::now(),
        }
    }

    /// A failed fetch. The bundle is kept for bookkeeping but excluded
    /// from aggregation.
    pub fn failed(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            payload: None,
            confidence: 0.0,
            error: Some(error.into()),
            fetched_at: Utc::now(),
        }
    }

    /// Whether this bundle may contribute evidence.
    pub fn is_usable(&self) -> bool {
        self.error.is_none() && self.payload.is_some()
    }
}

/// The five components of the final validation composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationComponentKind {
    MatchQuality,
    ConfirmationQuality,
    DataReliability,
    RiskAssessment,
    StrategicFit,
}

impl ValidationComponentKind {
    pub const ALL: [ValidationComponentKind; 5] = [
        ValidationComponentKind::MatchQuality,
        ValidationComponentKind::ConfirmationQuality,
        ValidationComponentKind::DataReliability,
        ValidationComponentKind::RiskAssessment,
        ValidationComponentKind::StrategicFit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationComponentKind::MatchQuality => "match_quality",
            ValidationComponentKind::ConfirmationQuality => "confirmation_quality",
            ValidationComponentKind::DataReliability => "data_reliability",
            ValidationComponentKind::RiskAssessment => "risk_assessment",
            ValidationComponentKind::StrategicFit => "strategic_fit",
        }
    }

    /// Human-readable name for rationale text.
    pub fn display_name(&self) -> &'static str {
        match self {
            ValidationComponentKind::MatchQuality => "match quality",
            ValidationComponentKind::ConfirmationQuality => "confirmation quality",
            ValidationComponentKind::DataReliability => "data reliability",
            ValidationComponentKind::RiskAssessment => "risk assessment",
            ValidationComponentKind::StrategicFit => "strategic fit",
        }
    }
}

impl fmt::Display for ValidationComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation component's score, weight, and rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationComponent {
    pub kind: ValidationComponentKind,
    pub score: f64,
    pub weight: f64,
    pub rationale: String,
    pub risk_factors: Vec<String>,
}

/// Six-band classification of the composite validation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    Rejected,
    Poor,
    Marginal,
    Acceptable,
    Good,
    Excellent,
}

impl ValidationLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            ValidationLevel::Excellent
        } else if score >= 0.70 {
            ValidationLevel::Good
        } else if score >= 0.55 {
            ValidationLevel::Acceptable
        } else if score >= 0.40 {
            ValidationLevel::Marginal
        } else if score >= 0.25 {
            ValidationLevel::Poor
        } else {
            ValidationLevel::Rejected
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Excellent => "excellent",
            ValidationLevel::Good => "good",
            ValidationLevel::Acceptable => "acceptable",
            ValidationLevel::Marginal => "marginal",
            ValidationLevel::Poor => "poor",
            ValidationLevel::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Output of the Validation Engine: the final composite judgment for
/// one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub candidate_id: String,
    pub composite: f64,
    pub level: ValidationLevel,
    pub risk: RiskLevel,
    pub components: Vec<ValidationComponent>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub risks: Vec<String>,
    pub recommendation: String,
    pub actions: Vec<String>,
    pub rationale: String,
    pub validated_at: DateTime<Utc>,
}

impl ValidationVerdict {
    /// Stand-in verdict for a candidate whose pipeline never finished.
    ///
    /// Mid-scale composite with medium risk: an unfinished candidate
    /// outranks a confirmed poor fit but never a completed strong one.
    /// The reason string names what happened and lands in both the
    /// rationale and the risk list.
    pub fn placeholder(candidate_id: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let composite = 0.5;
        ValidationVerdict {
            candidate_id: candidate_id.into(),
            composite,
            level: ValidationLevel::from_score(composite),
            risk: RiskLevel::Medium,
            components: Vec::new(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            opportunities: Vec::new(),
            risks: vec![reason.clone()],
            recommendation: "MANUAL REVIEW - evaluation did not complete".to_string(),
            actions: vec!["Re-run the evaluation for this candidate".to_string()],
            rationale: reason,
            validated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_label_bands() {
        assert_eq!(MatchLabel::from_score(0.80), MatchLabel::Recommended);
        assert_eq!(MatchLabel::from_score(0.75), MatchLabel::Recommended);
        assert_eq!(MatchLabel::from_score(0.60), MatchLabel::Borderline);
        assert_eq!(MatchLabel::from_score(0.49), MatchLabel::NotRecommended);
    }

    #[test]
    fn test_validation_level_ladder() {
        assert_eq!(ValidationLevel::from_score(0.90), ValidationLevel::Excellent);
        assert_eq!(ValidationLevel::from_score(0.85), ValidationLevel::Excellent);
        assert_eq!(ValidationLevel::from_score(0.70), ValidationLevel::Good);
        assert_eq!(ValidationLevel::from_score(0.55), ValidationLevel::Acceptable);
        assert_eq!(ValidationLevel::from_score(0.40), ValidationLevel::Marginal);
        assert_eq!(ValidationLevel::from_score(0.25), ValidationLevel::Poor);
        assert_eq!(ValidationLevel::from_score(0.10), ValidationLevel::Rejected);
    }

    #[test]
    fn test_placeholder_verdict_is_mid_scale() {
        let verdict = ValidationVerdict::placeholder("c-7", "evaluation timed out after 90s");
        assert_eq!(verdict.candidate_id, "c-7");
        assert_eq!(verdict.composite, 0.5);
        assert_eq!(verdict.level, ValidationLevel::Marginal);
        assert_eq!(verdict.risk, RiskLevel::Medium);
        assert!(verdict.rationale.contains("timed out"));
        assert_eq!(
            verdict.risks,
            vec!["evaluation timed out after 90s".to_string()]
        );
    }

    #[test]
    fn test_bundle_usability() {
        let ok = EvidenceBundle::new(
            "awards",
            EvidencePayload::Patents { patents: vec![] },
            0.9,
        );
        assert!(ok.is_usable());

        let empty = EvidenceBundle::empty("awards");
        assert!(!empty.is_usable());
        assert!(empty.error.is_none());

        let failed = EvidenceBundle::failed("awards", "connection refused");
        assert!(!failed.is_usable());
    }

    #[test]
    fn test_bundle_confidence_clamped() {
        let bundle = EvidenceBundle::new(
            "crm",
            EvidencePayload::CrmProfile {
                industry: None,
                website: None,
            },
            1.7,
        );
        assert_eq!(bundle.confidence, 1.0);
    }

    #[test]
    fn test_payload_serde_tag() {
        let payload = EvidencePayload::WebPresence {
            snippets: vec!["cloud migration services".to_string()],
            total_results: 1200,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"kind\":\"web_presence\""));
        let back: EvidencePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }
}
