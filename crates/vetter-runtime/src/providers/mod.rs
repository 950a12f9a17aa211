//! Evidence provider abstractions for vetter-runtime.
//!
//! A provider fetches one kind of external evidence about a candidate
//! (contract history, grants, patents, web presence, generative
//! insight) and returns it as a typed [`EvidenceBundle`]. The
//! orchestrator fans out over a registry of providers; any provider
//! can fail without sinking the candidate's evaluation.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use vetter_core::{Candidate, EvidenceBundle, RequirementSet};

mod generative;
mod registry;
pub mod repair;

#[cfg(feature = "http")]
mod http;

pub use generative::{CompletionBackend, GenerativeProvider, TEMPLATED_FALLBACK_CONFIDENCE};
pub use registry::ProviderRegistry;
pub use repair::{repair_insight, RepairError};

#[cfg(feature = "http")]
pub use http::HttpEvidenceProvider;

/// Errors from evidence providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// One source of external evidence about a candidate.
///
/// Implementations must be `Send + Sync`; the orchestrator shares them
/// across worker tasks. A fetch that finds nothing should return an
/// empty bundle, not an error; errors are reserved for transport and
/// auth failures.
#[async_trait]
pub trait EvidenceProvider: Send + Sync {
    /// Stable name used in bundle `source` fields, cache keys, and
    /// circuit breaker state.
    fn name(&self) -> &str;

    /// Fetch evidence for one candidate against one requirement set.
    async fn fetch(
        &self,
        candidate: &Candidate,
        requirements: &RequirementSet,
    ) -> Result<EvidenceBundle, ProviderError>;
}
