//! Validation Engine: the final composite judgment.
//!
//! Combines the match result, confirmation verdict, data reliability,
//! a deduction-based risk assessment, and strategic fit into one
//! weighted composite, classifies it into a validation level and risk
//! level, and synthesizes SWOT findings, a recommendation, and action
//! items from fixed rule tables.

use crate::scoring::factors::{meets_clearance, meets_set_aside};
use crate::text::norm;
use crate::types::{
    Candidate, ConfirmationFactorKind, ConfirmationVerdict, EvidenceBundle, EvidencePayload,
    EvidenceStatus, MatchResult, RequirementSet, RiskLevel, ValidationComponent,
    ValidationComponentKind, ValidationLevel, ValidationVerdict,
};
use crate::weights::WeightConfig;

const CRITICAL_RISK_KEYWORDS: [&str; 3] = ["clearance", "set-aside", "contradict"];

/// Validate one candidate's match and confirmation into a final
/// verdict.
pub fn validate(
    candidate: &Candidate,
    requirements: &RequirementSet,
    match_result: &MatchResult,
    confirmation: &ConfirmationVerdict,
    bundles: &[EvidenceBundle],
    weights: &WeightConfig,
) -> ValidationVerdict {
    let components = vec![
        evaluate_match_quality(match_result, weights),
        evaluate_confirmation_quality(confirmation, weights),
        assess_data_reliability(confirmation, bundles, weights),
        assess_risks(candidate, requirements, match_result, confirmation, weights),
        evaluate_strategic_fit(candidate, requirements, bundles, weights),
    ];

    let composite = composite_score(&components);
    let level = ValidationLevel::from_score(composite);
    let risk = determine_risk(&components);

    let (strengths, weaknesses, opportunities) = swot(match_result, confirmation, &components);
    let risks = all_risks(&components);
    let recommendation = recommendation_for(level, risk);
    let actions = action_items(level, &weaknesses, &risks, &components);
    let rationale = decision_rationale(composite, level, &components, confirmation);

    ValidationVerdict {
        candidate_id: candidate.id.clone(),
        composite,
        level,
        risk,
        components,
        strengths,
        weaknesses,
        opportunities,
        risks,
        recommendation,
        actions,
        rationale,
        validated_at: chrono::Utc::now(),
    }
}

fn evaluate_match_quality(match_result: &MatchResult, weights: &WeightConfig) -> ValidationComponent {
    let strength_count = match_result.strengths.len();
    let gap_count = match_result.gaps.len();

    let mut score = match_result.composite;
    if strength_count > 0 && gap_count > 0 {
        let ratio = strength_count as f64 / (strength_count + gap_count) as f64;
        score = match_result.composite * (0.7 + 0.3 * ratio);
    }

    let mut risk_factors = Vec::new();
    if gap_count > strength_count {
        risk_factors.push("More gaps than strengths in initial match".to_string());
    }
    if match_result.composite < 0.5 {
        risk_factors.push("Low initial match score".to_string());
    }

    ValidationComponent {
        kind: ValidationComponentKind::MatchQuality,
        score: score.clamp(0.0, 1.0),
        weight: weights.validation_weight(ValidationComponentKind::MatchQuality),
        rationale: format!(
            "Match score {:.2} with {} strengths and {} gaps",
            match_result.composite, strength_count, gap_count
        ),
        risk_factors,
    }
}

fn evaluate_confirmation_quality(
    confirmation: &ConfirmationVerdict,
    weights: &WeightConfig,
) -> ValidationComponent {
    let multiplier = match confirmation.overall_status {
        EvidenceStatus::Confirmed => 1.0,
        EvidenceStatus::PartiallyConfirmed => 0.75,
        EvidenceStatus::InsufficientData => 0.6,
        EvidenceStatus::Unconfirmed => 0.5,
        EvidenceStatus::Contradicted => 0.2,
    };
    let score = (confirmation.overall_confidence * multiplier).clamp(0.0, 1.0);

    let mut risk_factors = Vec::new();
    if confirmation.overall_status == EvidenceStatus::Contradicted {
        risk_factors.push("Contradictions found in confirmation analysis".to_string());
    }
    if confirmation.overall_status == EvidenceStatus::InsufficientData {
        risk_factors.push("Insufficient data for thorough confirmation".to_string());
    }
    if confirmation.overall_confidence < 0.5 {
        risk_factors.push("Low confirmation confidence".to_string());
    }

    let confirmed_count = confirmation
        .factors
        .iter()
        .filter(|f| f.status == EvidenceStatus::Confirmed)
        .count();

    ValidationComponent {
        kind: ValidationComponentKind::ConfirmationQuality,
        score,
        weight: weights.validation_weight(ValidationComponentKind::ConfirmationQuality),
        rationale: format!(
            "Confirmation {} with {:.2} confidence ({} factors confirmed)",
            confirmation.overall_status, confirmation.overall_confidence, confirmed_count
        ),
        risk_factors,
    }
}

fn assess_data_reliability(
    confirmation: &ConfirmationVerdict,
    bundles: &[EvidenceBundle],
    weights: &WeightConfig,
) -> ValidationComponent {
    let mut score = 0.0;
    let mut risk_factors = Vec::new();

    let profile = confirmation.completeness.profile;
    score += profile * 0.3;
    if profile < 0.6 {
        risk_factors.push("Incomplete candidate profile data".to_string());
    }

    if bundles.is_empty() {
        risk_factors.push("No external evidence gathered".to_string());
    } else {
        let success_rate = confirmation.enrichment.success_rate;
        score += success_rate * 0.4;
        if success_rate < 0.5 {
            risk_factors.push("Low evidence-provider success rate".to_string());
        }

        let high_confidence = bundles
            .iter()
            .filter(|b| b.is_usable() && b.confidence >= 0.8)
            .count();
        score += (high_confidence as f64 * 0.1).min(0.3);
    }

    // Blend with the completeness the confirmation stage reported.
    score = (score + confirmation.completeness.overall) / 2.0;

    ValidationComponent {
        kind: ValidationComponentKind::DataReliability,
        score: score.clamp(0.0, 1.0),
        weight: weights.validation_weight(ValidationComponentKind::DataReliability),
        rationale: format!(
            "Data reliability {:.2} (profile {:.0}%, provider success {:.0}%)",
            score,
            profile * 100.0,
            confirmation.enrichment.success_rate * 100.0
        ),
        risk_factors,
    }
}

/// Deduction-based risk scoring: start at 1.0 and subtract a fixed
/// amount per detected condition, floored at 0.
fn assess_risks(
    candidate: &Candidate,
    requirements: &RequirementSet,
    match_result: &MatchResult,
    confirmation: &ConfirmationVerdict,
    weights: &WeightConfig,
) -> ValidationComponent {
    let mut score: f64 = 1.0;
    let mut risk_factors = Vec::new();

    let past_perf = confirmation.factor(ConfirmationFactorKind::PastPerformanceConfirmation);
    if let Some(factor) = past_perf {
        if matches!(
            factor.status,
            EvidenceStatus::Unconfirmed | EvidenceStatus::Contradicted
        ) {
            risk_factors.push("Unverified or contradicted past performance claims".to_string());
            score -= 0.3;
        }
        if !factor.contradictions.is_empty() {
            risk_factors.extend(factor.contradictions.iter().cloned());
            score -= 0.2;
        }
    }

    if match_result.gaps.iter().any(|g| {
        let g = norm(g);
        g.contains("capabilities gap") || g.contains("naics mismatch")
    }) {
        risk_factors.push("Critical capability or NAICS gaps identified".to_string());
        score -= 0.25;
    }

    if let Some(clearance) = requirements.security_clearance.as_deref() {
        if !meets_clearance(requirements, candidate) {
            risk_factors.push(format!("Required clearance ({}) not confirmed", clearance));
            score -= 0.3;
        }
    }

    if !requirements.set_asides.is_empty() && !meets_set_aside(requirements, candidate) {
        risk_factors.push("Set-aside requirement may not be met".to_string());
        score -= 0.35;
    }

    if confirmation.overall_status == EvidenceStatus::InsufficientData {
        risk_factors.push("Insufficient data for thorough evaluation".to_string());
        score -= 0.2;
    }

    if candidate.employees.map(|e| e < 10).unwrap_or(false) {
        risk_factors.push("Very small team size may limit capacity".to_string());
        score -= 0.15;
    }

    if past_perf.map(|f| f.evidence.is_empty()).unwrap_or(true) {
        risk_factors.push("No documented contracting track record".to_string());
        score -= 0.2;
    }

    let score = score.max(0.0);

    ValidationComponent {
        kind: ValidationComponentKind::RiskAssessment,
        score,
        weight: weights.validation_weight(ValidationComponentKind::RiskAssessment),
        rationale: format!(
            "Risk assessment: {} risk factors identified, risk score {:.2}",
            risk_factors.len(),
            score
        ),
        risk_factors,
    }
}

fn evaluate_strategic_fit(
    candidate: &Candidate,
    requirements: &RequirementSet,
    bundles: &[EvidenceBundle],
    weights: &WeightConfig,
) -> ValidationComponent {
    let mut score: f64 = 0.5;
    let mut risk_factors = Vec::new();

    let mut contract_agencies: Vec<String> = Vec::new();
    let mut has_innovation = false;
    let mut strong_presence = false;
    let mut has_crm = false;
    for bundle in bundles.iter().filter(|b| b.is_usable()) {
        match bundle.payload.as_ref() {
            Some(EvidencePayload::ContractHistory { records, agencies }) => {
                contract_agencies.extend(agencies.iter().cloned());
                contract_agencies.extend(
                    records
                        .iter()
                        .filter_map(|r| r.awarding_agency.clone()),
                );
            }
            Some(EvidencePayload::Patents { patents }) if !patents.is_empty() => {
                has_innovation = true;
            }
            Some(EvidencePayload::InnovationAwards { awards }) if !awards.is_empty() => {
                has_innovation = true;
            }
            Some(EvidencePayload::ResearchGrants { grants }) if !grants.is_empty() => {
                has_innovation = true;
            }
            Some(EvidencePayload::WebPresence { total_results, .. }) if *total_results > 1000 => {
                strong_presence = true;
            }
            Some(EvidencePayload::CrmProfile { .. }) => has_crm = true,
            _ => {}
        }
    }

    if let Some(agency) = requirements.agency.as_deref() {
        let agency = norm(agency);
        if !agency.is_empty()
            && contract_agencies.iter().any(|a| norm(a).contains(&agency))
        {
            score += 0.2;
        }
    }
    if has_innovation {
        score += 0.2;
    }
    if strong_presence {
        score += 0.15;
    }
    if has_crm {
        score += 0.15;
    }

    match candidate.annual_revenue {
        Some(revenue) if revenue > 5_000_000.0 => score += 0.15,
        Some(revenue) if revenue < 500_000.0 => {
            risk_factors.push("Limited revenue may indicate capacity constraints".to_string());
        }
        _ => {}
    }

    let required = requirements.required_capabilities.len() as f64;
    if candidate.capabilities.len() as f64 >= required * 1.5 && !candidate.capabilities.is_empty() {
        score += 0.15;
    }

    let score = score.min(1.0);

    ValidationComponent {
        kind: ValidationComponentKind::StrategicFit,
        score,
        weight: weights.validation_weight(ValidationComponentKind::StrategicFit),
        rationale: format!("Strategic fit {:.2} across alignment and growth signals", score),
        risk_factors,
    }
}

fn composite_score(components: &[ValidationComponent]) -> f64 {
    let total_weight: f64 = components.iter().map(|c| c.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = components.iter().map(|c| c.score * c.weight).sum();
    (weighted / total_weight).clamp(0.0, 1.0)
}

fn determine_risk(components: &[ValidationComponent]) -> RiskLevel {
    let risk_component = components
        .iter()
        .find(|c| c.kind == ValidationComponentKind::RiskAssessment);
    let (score, count) = risk_component
        .map(|c| (c.score, c.risk_factors.len()))
        .unwrap_or((1.0, 0));

    let has_critical = risk_component
        .map(|c| {
            c.risk_factors.iter().any(|risk| {
                let risk = norm(risk);
                CRITICAL_RISK_KEYWORDS.iter().any(|kw| risk.contains(kw))
            })
        })
        .unwrap_or(false);

    if has_critical || score < 0.3 {
        RiskLevel::Critical
    } else if score < 0.5 || count >= 5 {
        RiskLevel::High
    } else if score < 0.7 || count >= 3 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn dedupe_cap(items: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .take(cap)
        .collect()
}

fn swot(
    match_result: &MatchResult,
    confirmation: &ConfirmationVerdict,
    components: &[ValidationComponent],
) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut strengths = match_result.strengths.clone();
    let mut weaknesses = match_result.gaps.clone();
    let mut opportunities = Vec::new();

    for factor in &confirmation.factors {
        if factor.status == EvidenceStatus::Confirmed {
            strengths.extend(factor.evidence.iter().take(2).cloned());
        }
    }

    for component in components {
        if component.score >= 0.8 {
            strengths.push(format!("Strong {}", component.kind.display_name()));
        } else if component.score < 0.5 {
            weaknesses.push(format!("Weak {}", component.kind.display_name()));
        }
    }

    if components
        .iter()
        .any(|c| c.kind == ValidationComponentKind::StrategicFit && c.score >= 0.7)
    {
        opportunities.push("Strong strategic alignment for long-term partnership".to_string());
    }
    if confirmation
        .factor(ConfirmationFactorKind::MarketPresence)
        .map(|f| f.status == EvidenceStatus::Confirmed)
        .unwrap_or(false)
    {
        opportunities.push("Established market presence supports credibility".to_string());
    }

    (
        dedupe_cap(strengths, 10),
        dedupe_cap(weaknesses, 10),
        dedupe_cap(opportunities, 5),
    )
}

fn all_risks(components: &[ValidationComponent]) -> Vec<String> {
    let risks: Vec<String> = components
        .iter()
        .flat_map(|c| c.risk_factors.iter().cloned())
        .collect();
    dedupe_cap(risks, 15)
}

fn recommendation_for(level: ValidationLevel, risk: RiskLevel) -> String {
    let text = match (level, risk) {
        (ValidationLevel::Excellent, RiskLevel::Low | RiskLevel::Medium) => {
            "STRONGLY RECOMMEND - Proceed with proposal"
        }
        (ValidationLevel::Good, r) if r != RiskLevel::Critical => {
            "RECOMMEND - Good fit, proceed with confidence"
        }
        (ValidationLevel::Acceptable, RiskLevel::Low | RiskLevel::Medium) => {
            "CONDITIONAL RECOMMEND - Proceed with risk mitigation"
        }
        (ValidationLevel::Marginal, _) => {
            "MARGINAL - Consider only if strategic value justifies risks"
        }
        (_, RiskLevel::Critical) => "DO NOT RECOMMEND - Critical risks identified",
        _ => "DO NOT RECOMMEND - Insufficient alignment",
    };
    text.to_string()
}

fn action_items(
    level: ValidationLevel,
    weaknesses: &[String],
    risks: &[String],
    components: &[ValidationComponent],
) -> Vec<String> {
    let mut actions: Vec<String> = Vec::new();

    match level {
        ValidationLevel::Excellent | ValidationLevel::Good => {
            actions.push("Prepare proposal highlighting confirmed strengths".to_string());
            actions.push("Gather supporting documentation for past performance".to_string());
        }
        ValidationLevel::Acceptable => {
            actions.push("Address identified gaps before proposal submission".to_string());
            actions.push("Develop risk mitigation strategies".to_string());
        }
        _ => {
            actions.push("Evaluate whether the opportunity aligns with strategy".to_string());
            actions.push("Consider partnerships to address capability gaps".to_string());
        }
    }

    let mentions = |items: &[String], keyword: &str| items.iter().any(|i| norm(i).contains(keyword));

    if mentions(weaknesses, "capabilit") || mentions(weaknesses, "gap") {
        actions.push("Document existing capabilities that address requirements".to_string());
        actions.push("Consider teaming arrangements for missing capabilities".to_string());
    }
    if mentions(weaknesses, "past performance") {
        actions.push("Compile detailed past performance narratives".to_string());
        actions.push("Obtain customer references and testimonials".to_string());
    }
    if mentions(risks, "clearance") {
        actions.push("Verify facility and personnel clearance status".to_string());
        actions.push("Plan for clearance processing timelines".to_string());
    }
    if mentions(risks, "set-aside") {
        actions.push("Verify small business certifications and registrations".to_string());
        actions.push("Ensure registration profiles are current".to_string());
    }

    let data_score = components
        .iter()
        .find(|c| c.kind == ValidationComponentKind::DataReliability)
        .map(|c| c.score)
        .unwrap_or(1.0);
    if data_score < 0.6 {
        actions.push("Update candidate profile with missing information".to_string());
        actions.push("Enhance capability statement documentation".to_string());
    }

    actions.truncate(10);
    actions
}

fn decision_rationale(
    composite: f64,
    level: ValidationLevel,
    components: &[ValidationComponent],
    confirmation: &ConfirmationVerdict,
) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Validation score: {:.1}% ({})", composite * 100.0, level));
    lines.push(String::new());
    lines.push("Score breakdown:".to_string());
    for component in components {
        lines.push(format!(
            "  - {}: {:.1}% (weighted {:.1}%)",
            component.kind.display_name(),
            component.score * 100.0,
            component.score * component.weight * 100.0
        ));
    }

    let mut top: Vec<&ValidationComponent> = components.iter().collect();
    top.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    let highlights: Vec<&&ValidationComponent> =
        top.iter().take(2).filter(|c| c.score >= 0.7).collect();
    if !highlights.is_empty() {
        lines.push(String::new());
        lines.push("Key findings:".to_string());
        for component in highlights {
            lines.push(format!("  + {}", component.rationale));
        }
    }

    let concerns: Vec<&ValidationComponent> =
        components.iter().filter(|c| c.score < 0.5).collect();
    if !concerns.is_empty() {
        lines.push(String::new());
        lines.push("Concerns:".to_string());
        for component in concerns {
            lines.push(format!("  - {}", component.rationale));
        }
    }

    lines.push(String::new());
    lines.push("Confirmation summary:".to_string());
    lines.push(format!("  {}", confirmation.summary.replace('\n', "\n  ")));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        DataCompleteness, EnrichmentQuality, EvidenceFactor, FactorScore, MatchFactor, MatchLabel,
    };

    fn requirements() -> RequirementSet {
        RequirementSet {
            id: "sol-1".to_string(),
            title: "Cloud migration support".to_string(),
            description: String::new(),
            agency: Some("GSA".to_string()),
            naics_codes: vec!["541512".to_string()],
            required_capabilities: vec!["cloud migration".to_string()],
            keywords: vec!["cloud".to_string()],
            set_asides: vec![],
            security_clearance: None,
            place_of_performance: None,
        }
    }

    fn candidate() -> Candidate {
        Candidate {
            id: "c-1".to_string(),
            name: "Acme Federal".to_string(),
            description: Some("Cloud migration specialists".to_string()),
            naics_codes: vec!["541512".to_string()],
            capabilities: vec!["cloud migration".to_string(), "security".to_string()],
            keywords: vec!["cloud".to_string()],
            certifications: vec![],
            socioeconomic_status: vec![],
            size: Some("small".to_string()),
            security_clearances: vec![],
            locations: vec![],
            employees: Some(45),
            annual_revenue: Some(8_000_000.0),
            website: None,
        }
    }

    fn match_result(composite: f64) -> MatchResult {
        MatchResult {
            composite,
            factors: vec![FactorScore {
                factor: MatchFactor::Naics,
                score: 1.0,
                weight: 0.2,
            }],
            strengths: vec!["NAICS match".to_string(), "Capabilities aligned".to_string()],
            gaps: vec!["Limited past performance alignment".to_string()],
            label: MatchLabel::from_score(composite),
            caps_applied: vec![],
        }
    }

    fn confirmation(status: EvidenceStatus, confidence: f64) -> ConfirmationVerdict {
        ConfirmationVerdict {
            candidate_id: "c-1".to_string(),
            overall_status: status,
            overall_confidence: confidence,
            factors: vec![EvidenceFactor {
                kind: ConfirmationFactorKind::PastPerformanceConfirmation,
                status,
                confidence,
                evidence: vec!["Found 3 federal contract records".to_string()],
                contradictions: vec![],
                weight: 0.25,
            }],
            sources_used: vec!["awards_db".to_string()],
            summary: "CONFIRMED MATCH (confidence 80%)".to_string(),
            enrichment: EnrichmentQuality {
                total_sources: 2,
                successful_sources: 2,
                success_rate: 1.0,
                average_confidence: 0.85,
            },
            completeness: DataCompleteness {
                profile: 1.0,
                source_coverage: 0.5,
                overall: 0.75,
            },
            confirmed_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_match_quality_adjusted_by_strength_ratio() {
        let component = evaluate_match_quality(&match_result(0.9), &WeightConfig::default());
        // Two strengths, one gap: 0.9 * (0.7 + 0.3 * 2/3).
        assert!((component.score - 0.81).abs() < 1e-9);
        assert!(component.risk_factors.is_empty());
    }

    #[test]
    fn test_confirmation_multiplier_by_status() {
        let weights = WeightConfig::default();
        let confirmed =
            evaluate_confirmation_quality(&confirmation(EvidenceStatus::Confirmed, 0.8), &weights);
        assert!((confirmed.score - 0.8).abs() < 1e-9);

        let contradicted = evaluate_confirmation_quality(
            &confirmation(EvidenceStatus::Contradicted, 0.8),
            &weights,
        );
        assert!((contradicted.score - 0.16).abs() < 1e-9);

        let insufficient = evaluate_confirmation_quality(
            &confirmation(EvidenceStatus::InsufficientData, 0.8),
            &weights,
        );
        assert!((insufficient.score - 0.48).abs() < 1e-9);
    }

    #[test]
    fn test_risk_deductions_floor_at_zero() {
        let mut req = requirements();
        req.security_clearance = Some("Top Secret".to_string());
        req.set_asides = vec!["8(a)".to_string()];
        let mut cand = candidate();
        cand.employees = Some(4);

        let mut conf = confirmation(EvidenceStatus::InsufficientData, 0.1);
        conf.factors[0].status = EvidenceStatus::Contradicted;
        conf.factors[0].evidence.clear();
        conf.factors[0].contradictions =
            vec!["Claims government experience but no contracts found".to_string()];

        let mut result = match_result(0.3);
        result.gaps.push("Capabilities gap".to_string());
        result.gaps.push("NAICS mismatch".to_string());

        let component = assess_risks(&cand, &req, &result, &conf, &WeightConfig::default());
        assert_eq!(component.score, 0.0);
        assert!(component.risk_factors.len() >= 6);
    }

    #[test]
    fn test_critical_risk_from_clearance_keyword() {
        let mut req = requirements();
        req.security_clearance = Some("Secret".to_string());
        let conf = confirmation(EvidenceStatus::Confirmed, 0.8);

        let verdict = validate(
            &candidate(),
            &req,
            &match_result(0.9),
            &conf,
            &[],
            &WeightConfig::default(),
        );
        // Candidate claims no clearances, so the clearance risk string
        // forces critical risk regardless of the other components.
        assert_eq!(verdict.risk, RiskLevel::Critical);
        assert!(verdict.recommendation.contains("DO NOT RECOMMEND"));
    }

    #[test]
    fn test_zero_evidence_candidate_capped_below_good() {
        // Insufficient-data confirmation with low confidence cannot
        // reach a level above acceptable.
        let conf = confirmation(EvidenceStatus::InsufficientData, 0.3);
        let verdict = validate(
            &candidate(),
            &requirements(),
            &match_result(0.9),
            &conf,
            &[],
            &WeightConfig::default(),
        );
        assert!(verdict.level <= ValidationLevel::Acceptable);
    }

    #[test]
    fn test_swot_includes_component_extremes() {
        let conf = confirmation(EvidenceStatus::Confirmed, 0.9);
        let verdict = validate(
            &candidate(),
            &requirements(),
            &match_result(0.9),
            &conf,
            &[],
            &WeightConfig::default(),
        );
        assert!(verdict
            .strengths
            .iter()
            .any(|s| s.starts_with("Strong ") || s.contains("match")));
        // Confirmed factor evidence flows into strengths.
        assert!(verdict
            .strengths
            .iter()
            .any(|s| s.contains("federal contract records")));
    }

    #[test]
    fn test_swot_deduplicates_and_caps() {
        let items = vec!["a".to_string(), "a".to_string(), "b".to_string()];
        let deduped = dedupe_cap(items, 10);
        assert_eq!(deduped, vec!["a".to_string(), "b".to_string()]);

        let many: Vec<String> = (0..20).map(|i| format!("risk {}", i)).collect();
        assert_eq!(dedupe_cap(many, 15).len(), 15);
    }

    #[test]
    fn test_recommendation_table() {
        assert!(recommendation_for(ValidationLevel::Excellent, RiskLevel::Low)
            .contains("STRONGLY RECOMMEND"));
        assert!(recommendation_for(ValidationLevel::Good, RiskLevel::High).contains("RECOMMEND"));
        assert!(recommendation_for(ValidationLevel::Acceptable, RiskLevel::Medium)
            .contains("CONDITIONAL"));
        assert!(recommendation_for(ValidationLevel::Marginal, RiskLevel::Low).contains("MARGINAL"));
        assert!(recommendation_for(ValidationLevel::Rejected, RiskLevel::Critical)
            .contains("Critical risks"));
        assert!(recommendation_for(ValidationLevel::Poor, RiskLevel::Low)
            .contains("Insufficient alignment"));
    }

    #[test]
    fn test_rationale_contains_breakdown_and_summary() {
        let conf = confirmation(EvidenceStatus::Confirmed, 0.8);
        let verdict = validate(
            &candidate(),
            &requirements(),
            &match_result(0.8),
            &conf,
            &[],
            &WeightConfig::default(),
        );
        assert!(verdict.rationale.contains("Score breakdown:"));
        assert!(verdict.rationale.contains("match quality"));
        assert!(verdict.rationale.contains("Confirmation summary:"));
    }

    #[test]
    fn test_composite_in_unit_interval() {
        let conf = confirmation(EvidenceStatus::Confirmed, 0.9);
        let verdict = validate(
            &candidate(),
            &requirements(),
            &match_result(1.0),
            &conf,
            &[],
            &WeightConfig::default(),
        );
        assert!(verdict.composite >= 0.0 && verdict.composite <= 1.0);
        for component in &verdict.components {
            assert!(component.score >= 0.0 && component.score <= 1.0);
        }
    }
}
