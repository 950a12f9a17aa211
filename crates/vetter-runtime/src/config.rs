//! Runtime configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::resilience::CircuitBreakerConfig;

/// Serde helper for human-readable durations ("90s", "5m").
pub mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

/// Configuration for the evaluation orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Candidates evaluated concurrently.
    pub max_concurrency: usize,

    /// Wall-clock budget for one candidate's full pipeline.
    #[serde(with = "duration_str")]
    pub per_candidate_timeout: Duration,

    /// Per-candidate contribution to the whole-batch deadline.
    #[serde(with = "duration_str")]
    pub batch_budget_per_candidate: Duration,

    /// Evidence cache size; zero disables caching.
    pub cache_max_entries: u64,

    /// Evidence cache TTL.
    #[serde(with = "duration_str")]
    pub cache_ttl: Duration,

    /// Circuit breaker settings shared by all providers.
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            per_candidate_timeout: Duration::from_secs(90),
            batch_budget_per_candidate: Duration::from_secs(60),
            cache_max_entries: 1024,
            cache_ttl: Duration::from_secs(3600),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Deadline for a whole batch of `candidates` evaluations, clamped
    /// to [1 minute, 10 minutes].
    pub fn batch_deadline(&self, candidates: usize) -> Duration {
        let raw = self
            .batch_budget_per_candidate
            .saturating_mul(candidates.max(1) as u32);
        raw.clamp(Duration::from_secs(60), Duration::from_secs(600))
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_per_candidate_timeout(mut self, timeout: Duration) -> Self {
        self.per_candidate_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_deadline_clamped() {
        let config = RuntimeConfig::default();
        assert_eq!(config.batch_deadline(0), Duration::from_secs(60));
        assert_eq!(config.batch_deadline(1), Duration::from_secs(60));
        assert_eq!(config.batch_deadline(5), Duration::from_secs(300));
        assert_eq!(config.batch_deadline(50), Duration::from_secs(600));
    }

    #[test]
    fn test_durations_round_trip_as_strings() {
        let config = RuntimeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"1m 30s\""));
        let parsed: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.per_candidate_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: RuntimeConfig =
            serde_json::from_str(r#"{"max_concurrency": 4}"#).unwrap();
        assert_eq!(parsed.max_concurrency, 4);
        assert_eq!(parsed.per_candidate_timeout, Duration::from_secs(90));
    }
}
