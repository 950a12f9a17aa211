//! # vetter-runtime
//!
//! Async evaluation runtime for vetter.
//!
//! `vetter-core` is deterministic and does no I/O; this crate supplies
//! everything around it:
//! - evidence providers (the pluggable sources the aggregator consumes)
//! - a bounded-concurrency orchestrator with per-candidate and
//!   whole-batch deadlines
//! - an evidence cache and per-provider circuit breakers
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vetter_runtime::{Orchestrator, ProviderRegistry, RuntimeConfig};
//!
//! let registry = ProviderRegistry::new()
//!     .with(Arc::new(awards_provider))
//!     .with(Arc::new(patents_provider));
//! let orchestrator = Orchestrator::builder(registry)
//!     .config(RuntimeConfig::default())
//!     .build();
//!
//! let reports = orchestrator.evaluate_batch(&requirements, &candidates).await;
//! for report in &reports {
//!     println!("{}: {:?}", report.candidate_name, report.outcome);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod orchestrator;
pub mod providers;
pub mod resilience;

pub use cache::{CacheKey, EvidenceCache};
pub use config::RuntimeConfig;
pub use orchestrator::{CandidateReport, EvaluationOutcome, Orchestrator, OrchestratorBuilder};
pub use providers::{
    CompletionBackend, EvidenceProvider, GenerativeProvider, ProviderError, ProviderRegistry,
};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig};

#[cfg(feature = "http")]
pub use providers::HttpEvidenceProvider;
