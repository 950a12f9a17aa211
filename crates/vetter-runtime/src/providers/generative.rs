//! Generative-insight provider.
//!
//! Wraps a text-completion backend, asks it for a structured capability
//! assessment, and repairs the JSON it returns. A backend failure or an
//! unrepairable response degrades to a low-confidence templated insight
//! instead of an error, so one flaky backend never sinks a candidate's
//! evaluation.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use vetter_core::{
    Candidate, EvidenceBundle, EvidencePayload, GenerativeInsight, RequirementSet,
};

use super::repair::repair_insight;
use super::{EvidenceProvider, ProviderError};

/// Confidence assigned to the templated fallback insight.
pub const TEMPLATED_FALLBACK_CONFIDENCE: f64 = 0.3;

/// A text-completion backend the generative provider can call.
///
/// Kept separate from [`EvidenceProvider`] so the same backend can be
/// swapped between live HTTP implementations and test doubles.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Evidence provider producing a [`GenerativeInsight`] bundle.
pub struct GenerativeProvider {
    name: String,
    backend: Arc<dyn CompletionBackend>,
}

impl GenerativeProvider {
    pub fn new(name: impl Into<String>, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            name: name.into(),
            backend,
        }
    }

    fn prompt(candidate: &Candidate, requirements: &RequirementSet) -> String {
        format!(
            concat!(
                "Assess how well this candidate fits the requirement.\n\n",
                "Requirement: {} - {}\n",
                "Required capabilities: {}\n\n",
                "Candidate: {}\n",
                "Stated capabilities: {}\n",
                "Description: {}\n\n",
                "Respond with a single JSON object with fields: capabilities ",
                "(list of strings), key_differentiators (list of strings), ",
                "claims (list of {{capability, evidence}}), alignment (0-1), ",
                "confidence (0-1), recommendation (string), reasoning (string)."
            ),
            requirements.title,
            requirements.description,
            requirements.required_capabilities.join(", "),
            candidate.name,
            candidate.capabilities.join(", "),
            candidate.description.as_deref().unwrap_or("(none)"),
        )
    }

    /// The insight used when the backend fails or returns junk.
    ///
    /// Carries an explicit failure marker in its reasoning so downstream
    /// summaries never present it as a real analysis.
    fn fallback(candidate: &Candidate, reason: &str) -> GenerativeInsight {
        GenerativeInsight {
            capabilities: Vec::new(),
            key_differentiators: Vec::new(),
            claims: Vec::new(),
            alignment: 0.0,
            confidence: TEMPLATED_FALLBACK_CONFIDENCE,
            recommendation: "reconsider".to_string(),
            reasoning: format!(
                "Analysis failed for {}: {}. Manual review recommended.",
                candidate.name, reason
            ),
        }
    }
}

#[async_trait]
impl EvidenceProvider for GenerativeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        candidate: &Candidate,
        requirements: &RequirementSet,
    ) -> Result<EvidenceBundle, ProviderError> {
        let prompt = Self::prompt(candidate, requirements);

        let insight = match self.backend.complete(&prompt).await {
            Ok(raw) => match repair_insight(&raw) {
                Ok(mut insight) => {
                    insight.alignment = insight.alignment.clamp(0.0, 1.0);
                    insight.confidence = insight.confidence.clamp(0.0, 1.0);
                    insight
                }
                Err(err) => {
                    warn!(provider = %self.name, candidate = %candidate.id, error = %err,
                        "unrepairable generative response, using templated fallback");
                    Self::fallback(candidate, "response could not be parsed")
                }
            },
            Err(err) => {
                warn!(provider = %self.name, candidate = %candidate.id, error = %err,
                    "generative backend failed, using templated fallback");
                Self::fallback(candidate, "backend unavailable")
            }
        };

        let confidence = insight.confidence;
        Ok(EvidenceBundle::new(
            self.name.clone(),
            EvidencePayload::Generative(insight),
            confidence,
        ))
    }
}
