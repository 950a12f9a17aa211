//! Evidence Aggregator: corroborates scored factors against
//! independent evidence bundles.
//!
//! For each confirmable factor the aggregator walks the usable
//! bundles, accumulates a bounded additive confidence (each
//! corroborating signal contributes a fixed or proportional increment,
//! clamped to `[0, 1]`), collects human-readable evidence strings, and
//! flags explicit contradictions. Per-factor status classification, in
//! priority order: contradiction present, confirmed (>= 0.7),
//! partially confirmed (>= 0.4), insufficient data (no evidence),
//! otherwise unconfirmed.
//!
//! Unstructured web content is admitted only after it passes the
//! substance gate in [`crate::verify`]; generative insight derived
//! from unverified content is excluded entirely and the verdict
//! summary says so.

use tracing::warn;

use crate::text::{norm, norm_set};
use crate::types::{
    AwardRecord, Candidate, ConfirmationFactorKind, ConfirmationVerdict, ContractRecord,
    DataCompleteness, EnrichmentQuality, EvidenceBundle, EvidenceFactor, EvidencePayload,
    EvidenceStatus, GenerativeInsight, GrantRecord, PatentRecord, RequirementSet, WebContent,
};
use crate::verify;
use crate::weights::WeightConfig;

/// Confirm one candidate's match against its evidence bundles.
///
/// Pure over its inputs: provider queries have already happened, and a
/// failed bundle is simply excluded from aggregation.
pub fn confirm(
    candidate: &Candidate,
    requirements: &RequirementSet,
    bundles: &[EvidenceBundle],
    weights: &WeightConfig,
) -> ConfirmationVerdict {
    let view = EvidenceView::collect(candidate, bundles);

    let factors = vec![
        confirm_past_performance(candidate, requirements, &view, weights),
        verify_capabilities(candidate, requirements, &view, weights),
        validate_certifications(candidate, requirements, &view, weights),
        confirm_size_and_clearance(candidate, requirements, &view, weights),
        assess_market_presence(candidate, &view, weights),
        verify_technical_expertise(requirements, &view, weights),
    ];

    let (overall_status, overall_confidence) = overall(&factors);
    let mut summary = summarize(&factors, overall_status, overall_confidence);
    if view.content_rejected {
        summary.push_str("\nWeb content not verified; generative insight excluded");
    }

    ConfirmationVerdict {
        candidate_id: candidate.id.clone(),
        overall_status,
        overall_confidence,
        factors,
        sources_used: bundles
            .iter()
            .filter(|b| b.is_usable())
            .map(|b| b.source.clone())
            .collect(),
        summary,
        enrichment: enrichment_quality(bundles),
        completeness: data_completeness(candidate, &view),
        confirmed_at: chrono::Utc::now(),
    }
}

/// Typed view over the usable bundles, with content verification
/// already applied.
struct EvidenceView {
    contracts: Vec<ContractRecord>,
    contract_agencies: Vec<String>,
    grants: Vec<GrantRecord>,
    awards: Vec<AwardRecord>,
    patents: Vec<PatentRecord>,
    presence_snippets: Vec<String>,
    presence_results: Option<u64>,
    crm_industry: Option<String>,
    has_crm: bool,
    /// Web content that passed the substance gate.
    verified_content: Option<WebContent>,
    /// A web content bundle was present but failed the substance gate.
    content_rejected: bool,
    /// Generative insight, trust-adjusted and admitted for use.
    generative: Option<GenerativeInsight>,
}

impl EvidenceView {
    fn collect(candidate: &Candidate, bundles: &[EvidenceBundle]) -> Self {
        let mut view = EvidenceView {
            contracts: Vec::new(),
            contract_agencies: Vec::new(),
            grants: Vec::new(),
            awards: Vec::new(),
            patents: Vec::new(),
            presence_snippets: Vec::new(),
            presence_results: None,
            crm_industry: None,
            has_crm: false,
            verified_content: None,
            content_rejected: false,
            generative: None,
        };
        let mut raw_insight: Option<GenerativeInsight> = None;
        let mut saw_content = false;

        for bundle in bundles {
            if let Some(error) = &bundle.error {
                warn!(source = %bundle.source, %error, candidate = %candidate.id, "provider failed, bundle excluded");
                continue;
            }
            let Some(payload) = &bundle.payload else {
                continue;
            };
            match payload.clone() {
                EvidencePayload::ContractHistory { records, agencies } => {
                    view.contracts.extend(records);
                    view.contract_agencies.extend(agencies);
                }
                EvidencePayload::ResearchGrants { grants } => view.grants.extend(grants),
                EvidencePayload::InnovationAwards { awards } => view.awards.extend(awards),
                EvidencePayload::Patents { patents } => view.patents.extend(patents),
                EvidencePayload::WebContent(content) => {
                    saw_content = true;
                    let check = verify::check_substance(&content);
                    if check.verified {
                        view.verified_content = Some(content);
                    } else {
                        warn!(
                            source = %bundle.source,
                            candidate = %candidate.id,
                            reasons = ?check.reasons,
                            "web content failed substance gate, excluded"
                        );
                        view.content_rejected = true;
                    }
                }
                EvidencePayload::WebPresence {
                    snippets,
                    total_results,
                } => {
                    view.presence_snippets.extend(snippets);
                    view.presence_results =
                        Some(view.presence_results.unwrap_or(0).max(total_results));
                }
                EvidencePayload::CrmProfile { industry, .. } => {
                    view.has_crm = true;
                    if view.crm_industry.is_none() {
                        view.crm_industry = industry;
                    }
                }
                EvidencePayload::Generative(insight) => raw_insight = Some(insight),
            }
        }

        // Generative insight summarizes the scraped content. If that
        // content was rejected the summary is untrustworthy; if it was
        // verified, penalize unsupported claims before use.
        view.generative = match (raw_insight, &view.verified_content) {
            (Some(insight), Some(content)) => {
                let adjustment = verify::adjust_trust(&insight, content);
                let mut adjusted = insight;
                adjusted.alignment = adjustment.adjusted_alignment;
                Some(adjusted)
            }
            (Some(insight), None) if !saw_content => Some(insight),
            (Some(_), None) => None,
            (None, _) => None,
        };

        view
    }
}

fn classify(confidence: f64, has_evidence: bool, has_contradiction: bool) -> EvidenceStatus {
    classify_with(confidence, has_evidence, has_contradiction, 0.7, 0.4)
}

fn classify_with(
    confidence: f64,
    has_evidence: bool,
    has_contradiction: bool,
    confirmed_at: f64,
    partial_at: f64,
) -> EvidenceStatus {
    if has_contradiction {
        EvidenceStatus::Contradicted
    } else if confidence >= confirmed_at {
        EvidenceStatus::Confirmed
    } else if confidence >= partial_at {
        EvidenceStatus::PartiallyConfirmed
    } else if !has_evidence {
        EvidenceStatus::InsufficientData
    } else {
        EvidenceStatus::Unconfirmed
    }
}

fn factor(
    kind: ConfirmationFactorKind,
    confidence: f64,
    evidence: Vec<String>,
    contradictions: Vec<String>,
    weights: &WeightConfig,
) -> EvidenceFactor {
    factor_with(kind, confidence, evidence, contradictions, weights, 0.7, 0.4)
}

fn factor_with(
    kind: ConfirmationFactorKind,
    confidence: f64,
    evidence: Vec<String>,
    contradictions: Vec<String>,
    weights: &WeightConfig,
    confirmed_at: f64,
    partial_at: f64,
) -> EvidenceFactor {
    let confidence = confidence.clamp(0.0, 1.0);
    EvidenceFactor {
        kind,
        status: classify_with(
            confidence,
            !evidence.is_empty(),
            !contradictions.is_empty(),
            confirmed_at,
            partial_at,
        ),
        confidence,
        evidence,
        contradictions,
        weight: weights.confirmation_weight(kind),
    }
}

fn has_advanced_phase(awards: &[AwardRecord]) -> bool {
    awards.iter().any(|a| {
        a.phase
            .as_deref()
            .map(|p| {
                let p = norm(p);
                p.contains("phase ii") || p.contains("phase iii") || p == "ii" || p == "iii"
            })
            .unwrap_or(false)
    })
}

fn confirm_past_performance(
    candidate: &Candidate,
    requirements: &RequirementSet,
    view: &EvidenceView,
    weights: &WeightConfig,
) -> EvidenceFactor {
    let mut evidence = Vec::new();
    let mut contradictions = Vec::new();
    let mut confidence: f64 = 0.0;

    if !view.contracts.is_empty() {
        evidence.push(format!(
            "Found {} federal contract records",
            view.contracts.len()
        ));
        let total_value: f64 = view.contracts.iter().filter_map(|c| c.value).sum();
        if total_value > 0.0 {
            evidence.push(format!("Total contract value: ${:.2}", total_value));
        }
        confidence += 0.4;

        if let Some(agency) = requirements.agency.as_deref() {
            let agency_norm = norm(agency);
            let agency_match = view
                .contracts
                .iter()
                .filter_map(|c| c.awarding_agency.as_deref())
                .chain(view.contract_agencies.iter().map(String::as_str))
                .any(|a| norm(a).contains(&agency_norm));
            if !agency_norm.is_empty() && agency_match {
                evidence.push(format!("Previous work with {}", agency));
                confidence += 0.2;
            }
        }
    }

    if !view.grants.is_empty() {
        evidence.push(format!("Found {} research grants", view.grants.len()));
        confidence += 0.3;
    }

    if !view.awards.is_empty() {
        evidence.push(format!("Found {} innovation awards", view.awards.len()));
        if has_advanced_phase(&view.awards) {
            evidence.push("Advanced to Phase II/III awards".to_string());
            confidence += 0.3;
        } else {
            confidence += 0.2;
        }
    }

    if evidence.is_empty() {
        if let Some(description) = &candidate.description {
            if norm(description).contains("extensive government experience") {
                contradictions.push(
                    "Claims government experience but no contracts found in public records"
                        .to_string(),
                );
                confidence = (confidence - 0.3).max(0.0);
            }
        }
    }

    factor(
        ConfirmationFactorKind::PastPerformanceConfirmation,
        confidence,
        evidence,
        contradictions,
        weights,
    )
}

fn verify_capabilities(
    candidate: &Candidate,
    requirements: &RequirementSet,
    view: &EvidenceView,
    weights: &WeightConfig,
) -> EvidenceFactor {
    let mut evidence = Vec::new();
    let mut contradictions = Vec::new();
    let mut confidence: f64 = 0.0;

    let claimed = norm_set(&candidate.capabilities);
    let required = norm_set(&requirements.required_capabilities);

    if let Some(insight) = &view.generative {
        let identified = norm_set(&insight.capabilities);
        let overlap: Vec<&String> = claimed.intersection(&identified).collect();
        if !overlap.is_empty() {
            let sample: Vec<&str> = overlap.iter().take(3).map(|s| s.as_str()).collect();
            evidence.push(format!("Generative analysis confirms: {}", sample.join(", ")));
            confidence += 0.3;
        }
        let req_overlap: Vec<&String> = required.intersection(&identified).collect();
        if !req_overlap.is_empty() {
            let sample: Vec<&str> = req_overlap.iter().take(3).map(|s| s.as_str()).collect();
            evidence.push(format!(
                "Analysis identifies required capabilities: {}",
                sample.join(", ")
            ));
            confidence += 0.2;
        }
    }

    if let Some(industry) = &view.crm_industry {
        evidence.push(format!("CRM industry: {}", industry));
        confidence += 0.2;
    }

    if !view.presence_snippets.is_empty() && !claimed.is_empty() {
        let mentions: usize = view
            .presence_snippets
            .iter()
            .map(|snippet| {
                let snippet = norm(snippet);
                claimed.iter().filter(|cap| snippet.contains(cap.as_str())).count()
            })
            .sum();
        if mentions > 0 {
            evidence.push(format!("Web search confirms {} capability mentions", mentions));
            confidence += (mentions as f64 * 0.1).min(0.3);
        }
    }

    // A contradiction requires that capability-relevant sources were
    // actually consulted and came back unsupportive. No sources at all
    // is insufficient data, not a contradiction.
    let consulted =
        view.generative.is_some() || view.has_crm || !view.presence_snippets.is_empty();
    if consulted && !claimed.is_empty() && confidence < 0.2 {
        contradictions
            .push("Claimed capabilities not strongly supported by external sources".to_string());
    }

    factor(
        ConfirmationFactorKind::CapabilityVerification,
        confidence,
        evidence,
        contradictions,
        weights,
    )
}

fn validate_certifications(
    candidate: &Candidate,
    requirements: &RequirementSet,
    view: &EvidenceView,
    weights: &WeightConfig,
) -> EvidenceFactor {
    let mut evidence = Vec::new();
    // Neutral baseline unless evidence moves it.
    let mut confidence: f64 = 0.5;

    let required = norm_set(&requirements.set_asides);
    let wants_small = required.contains("small business") || required.contains("sb");

    if !view.awards.is_empty() {
        evidence.push("Innovation awards consistent with small business status".to_string());
        if wants_small {
            confidence += 0.3;
        }
    }

    if !view.contracts.is_empty() {
        evidence.push("Previous federal contracts found (status verification pending)".to_string());
        confidence += 0.2;
    }

    if let Some(employees) = candidate.employees {
        if employees < 500 {
            evidence.push(format!(
                "Employee count ({}) consistent with small business",
                employees
            ));
            confidence += 0.2;
        }
    } else if let Some(revenue) = candidate.annual_revenue {
        if revenue < 10_000_000.0 {
            evidence.push("Revenue consistent with small business".to_string());
            confidence += 0.2;
        }
    }

    factor(
        ConfirmationFactorKind::CertificationValidation,
        confidence,
        evidence,
        Vec::new(),
        weights,
    )
}

fn confirm_size_and_clearance(
    candidate: &Candidate,
    requirements: &RequirementSet,
    view: &EvidenceView,
    weights: &WeightConfig,
) -> EvidenceFactor {
    let mut evidence = Vec::new();
    let mut confidence: f64 = 0.5;

    let claimed_size = candidate.size.as_deref().map(norm).unwrap_or_default();
    if let Some(employees) = candidate.employees {
        let consistent = (claimed_size == "small" && employees < 500)
            || (claimed_size == "large" && employees >= 500);
        if consistent {
            evidence.push(format!("Size claim consistent: {} employees", employees));
            confidence += 0.2;
        }
    }

    if !candidate.security_clearances.is_empty() {
        evidence.push(format!(
            "Company claims clearances: {}",
            candidate.security_clearances.join(", ")
        ));
        let required = requirements.security_clearance.as_deref().map(norm);
        let claimed = norm_set(&candidate.security_clearances);
        match required {
            Some(req) if claimed.contains(&req) => {
                evidence.push(format!(
                    "Required clearance ({}) is claimed",
                    requirements.security_clearance.as_deref().unwrap_or_default()
                ));
                confidence += 0.3;
            }
            _ => {
                evidence.push("Clearance claims require independent verification".to_string());
            }
        }
    }

    let classified = ["dod", "defense", "intelligence", "cia", "nsa", "dia"];
    let agency_hit = view
        .contracts
        .iter()
        .filter_map(|c| c.awarding_agency.as_deref())
        .chain(view.contract_agencies.iter().map(String::as_str))
        .find(|agency| {
            let agency = norm(agency);
            classified.iter().any(|c| agency.contains(c))
        });
    if let Some(agency) = agency_hit {
        evidence.push(format!("Past work with {} suggests clearance capability", agency));
        confidence += 0.2;
    }

    factor(
        ConfirmationFactorKind::SizeClearanceConfirmation,
        confidence,
        evidence,
        Vec::new(),
        weights,
    )
}

fn assess_market_presence(
    candidate: &Candidate,
    view: &EvidenceView,
    weights: &WeightConfig,
) -> EvidenceFactor {
    let mut evidence = Vec::new();
    let mut confidence: f64 = 0.0;

    if let Some(results) = view.presence_results {
        if results > 1000 {
            evidence.push(format!("Strong web presence: {} search results", results));
            confidence += 0.3;
        } else if results > 100 {
            evidence.push(format!("Moderate web presence: {} search results", results));
            confidence += 0.2;
        }
    }

    if let Some(website) = &candidate.website {
        evidence.push(format!("Company website: {}", website));
        confidence += 0.1;
    }

    if view.has_crm {
        evidence.push("Active CRM relationship".to_string());
        confidence += 0.3;
    }

    if !view.patents.is_empty() {
        evidence.push(format!("Patent portfolio: {} patents", view.patents.len()));
        confidence += 0.3;
    }

    // Market presence bands lower than the other factors.
    factor_with(
        ConfirmationFactorKind::MarketPresence,
        confidence,
        evidence,
        Vec::new(),
        weights,
        0.6,
        0.3,
    )
}

fn verify_technical_expertise(
    requirements: &RequirementSet,
    view: &EvidenceView,
    weights: &WeightConfig,
) -> EvidenceFactor {
    let mut evidence = Vec::new();
    let mut confidence: f64 = 0.0;

    let required = norm_set(&requirements.keywords);
    if !view.patents.is_empty() && !required.is_empty() {
        let titles: Vec<String> = view.patents.iter().map(|p| norm(&p.title)).collect();
        let matches = required
            .iter()
            .filter(|kw| titles.iter().any(|t| t.contains(kw.as_str())))
            .count();
        if matches > 0 {
            evidence.push(format!("Patents align with {} required keywords", matches));
            confidence += (matches as f64 * 0.15).min(0.4);
        }
    }

    if !view.grants.is_empty() {
        evidence.push(format!("Research expertise: {} grants", view.grants.len()));
        confidence += 0.3;
    }

    if has_advanced_phase(&view.awards) {
        evidence.push("Proven innovation: advanced-phase awards".to_string());
        confidence += 0.3;
    }

    if let Some(insight) = &view.generative {
        if !insight.key_differentiators.is_empty() {
            evidence.push("Generative analysis identifies technical differentiators".to_string());
            confidence += 0.2;
        }
    }

    factor(
        ConfirmationFactorKind::TechnicalExpertise,
        confidence,
        evidence,
        Vec::new(),
        weights,
    )
}

/// Overall status counting rules plus weighted-average confidence.
fn overall(factors: &[EvidenceFactor]) -> (EvidenceStatus, f64) {
    let total_weight: f64 = factors.iter().map(|f| f.weight).sum();
    let confidence = if total_weight > 0.0 {
        factors.iter().map(|f| f.confidence * f.weight).sum::<f64>() / total_weight
    } else {
        0.0
    };
    let confidence = confidence.clamp(0.0, 1.0);

    let count = |status: EvidenceStatus| factors.iter().filter(|f| f.status == status).count();
    let n = factors.len() as f64;

    let status = if count(EvidenceStatus::Contradicted) > 0 {
        EvidenceStatus::Contradicted
    } else if count(EvidenceStatus::Confirmed) as f64 >= n * 0.6 {
        EvidenceStatus::Confirmed
    } else if (count(EvidenceStatus::Confirmed) + count(EvidenceStatus::PartiallyConfirmed)) as f64
        >= n * 0.5
    {
        EvidenceStatus::PartiallyConfirmed
    } else if count(EvidenceStatus::InsufficientData) as f64 >= n * 0.5 {
        EvidenceStatus::InsufficientData
    } else {
        EvidenceStatus::Unconfirmed
    };

    (status, confidence)
}

fn summarize(factors: &[EvidenceFactor], status: EvidenceStatus, confidence: f64) -> String {
    let mut parts = Vec::new();
    let headline = match status {
        EvidenceStatus::Confirmed => "CONFIRMED MATCH",
        EvidenceStatus::PartiallyConfirmed => "PARTIALLY CONFIRMED",
        EvidenceStatus::Contradicted => "CONTRADICTIONS FOUND",
        EvidenceStatus::InsufficientData => "INSUFFICIENT DATA",
        EvidenceStatus::Unconfirmed => "UNCONFIRMED",
    };
    parts.push(format!("{} (confidence {:.0}%)", headline, confidence * 100.0));

    let named = |status: EvidenceStatus| {
        factors
            .iter()
            .filter(|f| f.status == status)
            .map(|f| f.kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let confirmed = named(EvidenceStatus::Confirmed);
    if !confirmed.is_empty() {
        parts.push(format!("Confirmed: {}", confirmed));
    }
    let partial = named(EvidenceStatus::PartiallyConfirmed);
    if !partial.is_empty() {
        parts.push(format!("Partially confirmed: {}", partial));
    }
    let contradicted = named(EvidenceStatus::Contradicted);
    if !contradicted.is_empty() {
        parts.push(format!("Contradictions: {}", contradicted));
    }

    parts.join("\n")
}

fn enrichment_quality(bundles: &[EvidenceBundle]) -> EnrichmentQuality {
    let total = bundles.len();
    let successful = bundles.iter().filter(|b| b.is_usable()).count();
    let average_confidence = if total > 0 {
        bundles.iter().map(|b| b.confidence).sum::<f64>() / total as f64
    } else {
        0.0
    };
    EnrichmentQuality {
        total_sources: total,
        successful_sources: successful,
        success_rate: if total > 0 {
            successful as f64 / total as f64
        } else {
            0.0
        },
        average_confidence,
    }
}

fn data_completeness(candidate: &Candidate, view: &EvidenceView) -> DataCompleteness {
    let key_fields = [
        !candidate.name.is_empty(),
        !candidate.naics_codes.is_empty(),
        !candidate.capabilities.is_empty(),
        candidate.size.is_some(),
        candidate.description.as_deref().map(|d| !d.is_empty()).unwrap_or(false),
    ];
    let profile = key_fields.iter().filter(|f| **f).count() as f64 / key_fields.len() as f64;

    // Priority evidence kinds a well-covered candidate should have.
    let priority = [
        !view.contracts.is_empty() || !view.contract_agencies.is_empty(),
        view.has_crm,
        view.generative.is_some(),
        view.verified_content.is_some(),
    ];
    let source_coverage = priority.iter().filter(|p| **p).count() as f64 / priority.len() as f64;

    DataCompleteness {
        profile,
        source_coverage,
        overall: (profile + source_coverage) / 2.0,
    }
}
