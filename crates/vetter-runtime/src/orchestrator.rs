//! Batch evaluation orchestrator.
//!
//! Fans a batch of candidates out over a bounded worker pool, runs the
//! full evidence-then-evaluate pipeline for each, and fans the results
//! back in as a ranked report list. Guarantees:
//! - exactly one report per input candidate, no matter what fails
//! - a per-candidate wall-clock budget and a whole-batch deadline
//! - deterministic ranking: stable sort, descending composite score

use std::cmp::Ordering;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use vetter_core::{
    evaluate_candidate, Candidate, CandidateEvaluation, ConfirmationVerdict, EvidenceBundle,
    MatchResult, RequirementSet, ValidationVerdict, WeightConfig,
};

use crate::cache::{CacheKey, EvidenceCache};
use crate::config::RuntimeConfig;
use crate::providers::ProviderRegistry;
use crate::resilience::CircuitBreaker;

/// How one candidate's evaluation ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    Completed,
    TimedOut,
    Failed { reason: String },
}

/// One candidate's entry in the batch report.
///
/// Every report carries a validation verdict: the real one when the
/// pipeline completed, a mid-scale placeholder naming what happened
/// otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateReport {
    pub candidate_id: String,
    pub candidate_name: String,
    pub outcome: EvaluationOutcome,
    /// Present only when the pipeline completed.
    pub match_result: Option<MatchResult>,
    /// Present only when the pipeline completed.
    pub confirmation: Option<ConfirmationVerdict>,
    pub validation: ValidationVerdict,
}

impl CandidateReport {
    /// Score used for ranking.
    pub fn rank_score(&self) -> f64 {
        self.validation.composite
    }

    fn completed(candidate: &Candidate, evaluation: CandidateEvaluation) -> Self {
        Self {
            candidate_id: candidate.id.clone(),
            candidate_name: candidate.name.clone(),
            outcome: EvaluationOutcome::Completed,
            match_result: Some(evaluation.match_result),
            confirmation: Some(evaluation.confirmation),
            validation: evaluation.validation,
        }
    }

    fn unfinished(
        candidate: &Candidate,
        outcome: EvaluationOutcome,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            candidate_id: candidate.id.clone(),
            candidate_name: candidate.name.clone(),
            outcome,
            match_result: None,
            confirmation: None,
            validation: ValidationVerdict::placeholder(candidate.id.as_str(), reason),
        }
    }
}

struct Inner {
    registry: ProviderRegistry,
    config: RuntimeConfig,
    weights: WeightConfig,
    cache: Option<EvidenceCache>,
    breaker: CircuitBreaker,
}

/// The batch evaluation orchestrator.
pub struct Orchestrator {
    inner: Arc<Inner>,
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    registry: ProviderRegistry,
    config: RuntimeConfig,
    weights: WeightConfig,
}

impl OrchestratorBuilder {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            config: RuntimeConfig::default(),
            weights: WeightConfig::default(),
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn weights(mut self, weights: WeightConfig) -> Self {
        self.weights = weights;
        self
    }

    pub fn build(self) -> Orchestrator {
        let cache = (self.config.cache_max_entries > 0).then(|| {
            EvidenceCache::new(self.config.cache_max_entries, self.config.cache_ttl)
        });
        let breaker = CircuitBreaker::new(self.config.circuit_breaker.clone());
        Orchestrator {
            inner: Arc::new(Inner {
                registry: self.registry,
                config: self.config,
                weights: self.weights,
                cache,
                breaker,
            }),
        }
    }
}

impl Orchestrator {
    pub fn builder(registry: ProviderRegistry) -> OrchestratorBuilder {
        OrchestratorBuilder::new(registry)
    }

    /// Evaluate every candidate against the requirement set.
    ///
    /// Returns exactly one report per candidate, ranked by composite
    /// validation score, highest first. Candidates still running when
    /// the batch deadline expires come back as `TimedOut`.
    pub async fn evaluate_batch(
        &self,
        requirements: &RequirementSet,
        candidates: &[Candidate],
    ) -> Vec<CandidateReport> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let requirements = Arc::new(requirements.clone());
        let semaphore = Arc::new(Semaphore::new(self.inner.config.max_concurrency.max(1)));
        let deadline =
            tokio::time::Instant::now() + self.inner.config.batch_deadline(candidates.len());

        info!(
            requirement = %requirements.id,
            candidates = candidates.len(),
            concurrency = self.inner.config.max_concurrency,
            "starting batch evaluation"
        );

        let mut tasks: JoinSet<(usize, CandidateReport)> = JoinSet::new();
        for (index, candidate) in candidates.iter().enumerate() {
            let inner = Arc::clone(&self.inner);
            let requirements = Arc::clone(&requirements);
            let semaphore = Arc::clone(&semaphore);
            let candidate = candidate.clone();
            tasks.spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            index,
                            CandidateReport::unfinished(
                                &candidate,
                                EvaluationOutcome::Failed {
                                    reason: "worker pool closed".to_string(),
                                },
                                "evaluation failed: worker pool closed",
                            ),
                        );
                    }
                };
                let report = evaluate_one(&inner, &requirements, &candidate).await;
                (index, report)
            });
        }

        let mut reports: Vec<Option<CandidateReport>> = vec![None; candidates.len()];
        loop {
            let joined = tokio::time::timeout_at(deadline, tasks.join_next()).await;
            match joined {
                Ok(Some(Ok((index, report)))) => reports[index] = Some(report),
                Ok(Some(Err(join_err))) => {
                    // The task panicked; its slot is backfilled below.
                    warn!(error = %join_err, "evaluation task aborted");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!("batch deadline reached, aborting remaining evaluations");
                    tasks.abort_all();
                    while tasks.join_next().await.is_some() {}
                    break;
                }
            }
        }

        let mut finished: Vec<CandidateReport> = reports
            .into_iter()
            .zip(candidates.iter())
            .map(|(slot, candidate)| {
                slot.unwrap_or_else(|| {
                    CandidateReport::unfinished(
                        candidate,
                        EvaluationOutcome::TimedOut,
                        "evaluation timed out: batch deadline expired",
                    )
                })
            })
            .collect();

        finished.sort_by(|a, b| {
            b.rank_score()
                .partial_cmp(&a.rank_score())
                .unwrap_or(Ordering::Equal)
        });

        info!(
            requirement = %requirements.id,
            completed = finished
                .iter()
                .filter(|r| r.outcome == EvaluationOutcome::Completed)
                .count(),
            total = finished.len(),
            "batch evaluation finished"
        );
        finished
    }
}

/// Run one candidate's full pipeline under its wall-clock budget.
async fn evaluate_one(
    inner: &Inner,
    requirements: &RequirementSet,
    candidate: &Candidate,
) -> CandidateReport {
    let budget = inner.config.per_candidate_timeout;
    let pipeline = async {
        let bundles = gather_evidence(inner, requirements, candidate).await;
        evaluate_candidate(requirements, candidate, &bundles, &inner.weights)
    };

    match tokio::time::timeout(budget, pipeline).await {
        Ok(evaluation) => {
            debug!(
                candidate = %candidate.id,
                composite = evaluation.validation.composite,
                level = %evaluation.validation.level,
                "candidate evaluated"
            );
            CandidateReport::completed(candidate, evaluation)
        }
        Err(_) => {
            warn!(candidate = %candidate.id, budget = ?budget, "candidate evaluation timed out");
            CandidateReport::unfinished(
                candidate,
                EvaluationOutcome::TimedOut,
                format!(
                    "evaluation timed out after {}",
                    humantime::format_duration(budget)
                ),
            )
        }
    }
}

/// Query every registered provider, concurrently, one bundle each.
///
/// Provider failures become failed bundles rather than errors; the
/// evidence aggregator knows to skip them.
async fn gather_evidence(
    inner: &Inner,
    requirements: &RequirementSet,
    candidate: &Candidate,
) -> Vec<EvidenceBundle> {
    let fetches = inner.registry.providers().iter().map(|provider| {
        let provider = Arc::clone(provider);
        async move {
            let name = provider.name().to_string();
            if inner.breaker.is_open(&name) {
                debug!(provider = %name, candidate = %candidate.id, "circuit open, skipping fetch");
                return EvidenceBundle::failed(name, "circuit open");
            }

            let key = CacheKey::new(&name, &candidate.id, &requirements.id);
            if let Some(cache) = &inner.cache {
                if let Some(hit) = cache.get(&key).await {
                    debug!(provider = %name, candidate = %candidate.id, "evidence cache hit");
                    return hit;
                }
            }

            match provider.fetch(candidate, requirements).await {
                Ok(bundle) => {
                    inner.breaker.record_success(&name);
                    if let Some(cache) = &inner.cache {
                        cache.insert(key, bundle.clone()).await;
                    }
                    bundle
                }
                Err(err) => {
                    inner.breaker.record_failure(&name);
                    warn!(provider = %name, candidate = %candidate.id, error = %err, "evidence fetch failed");
                    EvidenceBundle::failed(name, err.to_string())
                }
            }
        }
    });

    join_all(fetches).await
}
