//! Circuit breaker to keep one failing evidence source from dragging
//! down every candidate in a batch.
//!
//! When a provider fails repeatedly its circuit opens and subsequent
//! fetches are skipped immediately, recorded as failed bundles. After a
//! recovery window the circuit half-opens and lets probe calls through.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::duration_str;

/// Circuit breaker configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit.
    pub failure_threshold: u32,

    /// Time before attempting recovery.
    #[serde(with = "duration_str")]
    pub recovery_timeout: Duration,

    /// Successes in half-open needed to close the circuit again.
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

/// State of one provider's circuit.
#[derive(Debug, Clone)]
pub enum CircuitState {
    /// Normal operation.
    Closed { failures: u32 },

    /// Circuit is open, all calls skip this provider.
    Open { opened_at: Instant },

    /// Probing whether the provider recovered.
    HalfOpen { successes: u32 },
}

/// Per-provider circuit breaker.
///
/// Each provider has its own circuit so a broken patent API does not
/// block contract-history lookups.
pub struct CircuitBreaker {
    states: RwLock<HashMap<String, CircuitState>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Whether fetches for this provider should be skipped.
    pub fn is_open(&self, provider: &str) -> bool {
        let states = self.states.read();
        match states.get(provider) {
            Some(CircuitState::Open { opened_at }) => {
                if opened_at.elapsed() >= self.config.recovery_timeout {
                    drop(states);
                    self.states.write().insert(
                        provider.to_string(),
                        CircuitState::HalfOpen { successes: 0 },
                    );
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    /// Record a successful fetch.
    pub fn record_success(&self, provider: &str) {
        let mut states = self.states.write();
        let state = states
            .entry(provider.to_string())
            .or_insert(CircuitState::Closed { failures: 0 });
        match state {
            CircuitState::Closed { failures } => *failures = 0,
            CircuitState::HalfOpen { successes } => {
                *successes += 1;
                if *successes >= self.config.success_threshold {
                    *state = CircuitState::Closed { failures: 0 };
                    tracing::debug!(provider, "circuit closed after recovery");
                }
            }
            CircuitState::Open { .. } => {}
        }
    }

    /// Record a failed fetch.
    pub fn record_failure(&self, provider: &str) {
        let mut states = self.states.write();
        let state = states
            .entry(provider.to_string())
            .or_insert(CircuitState::Closed { failures: 0 });
        match state {
            CircuitState::Closed { failures } => {
                *failures += 1;
                if *failures >= self.config.failure_threshold {
                    *state = CircuitState::Open {
                        opened_at: Instant::now(),
                    };
                    tracing::warn!(provider, "circuit opened");
                }
            }
            CircuitState::HalfOpen { .. } => {
                // Probe failed, back to open.
                *state = CircuitState::Open {
                    opened_at: Instant::now(),
                };
            }
            CircuitState::Open { .. } => {}
        }
    }

    #[cfg(test)]
    fn state_of(&self, provider: &str) -> Option<CircuitState> {
        self.states.read().get(provider).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            recovery_timeout: Duration::from_millis(10),
            success_threshold: 1,
        })
    }

    #[test]
    fn test_opens_after_threshold_failures() {
        let cb = breaker();
        assert!(!cb.is_open("patents"));
        cb.record_failure("patents");
        assert!(!cb.is_open("patents"));
        cb.record_failure("patents");
        assert!(cb.is_open("patents"));
    }

    #[test]
    fn test_circuits_are_independent() {
        let cb = breaker();
        cb.record_failure("patents");
        cb.record_failure("patents");
        assert!(cb.is_open("patents"));
        assert!(!cb.is_open("awards_db"));
    }

    #[test]
    fn test_success_resets_failure_count() {
        let cb = breaker();
        cb.record_failure("patents");
        cb.record_success("patents");
        cb.record_failure("patents");
        assert!(!cb.is_open("patents"));
    }

    #[test]
    fn test_half_open_then_closes_on_success() {
        let cb = breaker();
        cb.record_failure("patents");
        cb.record_failure("patents");
        assert!(cb.is_open("patents"));

        std::thread::sleep(Duration::from_millis(15));
        // First check after the recovery window transitions to half-open.
        assert!(!cb.is_open("patents"));
        assert!(matches!(
            cb.state_of("patents"),
            Some(CircuitState::HalfOpen { .. })
        ));

        cb.record_success("patents");
        assert!(matches!(
            cb.state_of("patents"),
            Some(CircuitState::Closed { .. })
        ));
    }

    #[test]
    fn test_half_open_failure_reopens() {
        let cb = breaker();
        cb.record_failure("patents");
        cb.record_failure("patents");
        std::thread::sleep(Duration::from_millis(15));
        assert!(!cb.is_open("patents"));
        cb.record_failure("patents");
        assert!(cb.is_open("patents"));
    }
}
