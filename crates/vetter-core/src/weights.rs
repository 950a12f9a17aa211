//! Weight configuration for all three pipeline stages.
//!
//! Weights are non-negative and need not sum to 1; the engines
//! normalize by total weight. Configuration is rejected synchronously
//! at load time: unknown factor keys and negative or non-numeric values
//! are errors, surfaced before any evaluation starts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::types::{ConfirmationFactorKind, MatchFactor, ValidationComponentKind};

/// Composite ceiling applied when a hard requirement is unmet.
pub const DEFAULT_HARD_CAP: f64 = 0.49;

#[derive(Error, Debug)]
pub enum WeightError {
    #[error("failed to read weight config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid weight config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("weight for {factor} must be non-negative, got {value}")]
    Negative { factor: String, value: f64 },

    #[error("weight for {factor} must be a finite number")]
    NonFinite { factor: String },

    #[error("{table} weights must not all be zero")]
    ZeroTotal { table: &'static str },

    #[error("hard cap must be within [0, 1], got {0}")]
    InvalidHardCap(f64),
}

/// Weights for the match factors, confirmation factors, and validation
/// components, plus the hard-constraint ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightConfig {
    #[serde(default = "default_match_weights", rename = "match")]
    pub match_weights: BTreeMap<MatchFactor, f64>,
    #[serde(default = "default_confirmation_weights", rename = "confirmation")]
    pub confirmation_weights: BTreeMap<ConfirmationFactorKind, f64>,
    #[serde(default = "default_validation_weights", rename = "validation")]
    pub validation_weights: BTreeMap<ValidationComponentKind, f64>,
    #[serde(default = "default_hard_cap")]
    pub hard_cap: f64,
}

fn default_hard_cap() -> f64 {
    DEFAULT_HARD_CAP
}

fn default_match_weights() -> BTreeMap<MatchFactor, f64> {
    BTreeMap::from([
        (MatchFactor::Naics, 0.20),
        (MatchFactor::Capabilities, 0.25),
        (MatchFactor::PastPerformance, 0.20),
        (MatchFactor::SizeStatus, 0.10),
        (MatchFactor::Clearance, 0.10),
        (MatchFactor::Location, 0.05),
        (MatchFactor::Keywords, 0.10),
    ])
}

fn default_confirmation_weights() -> BTreeMap<ConfirmationFactorKind, f64> {
    BTreeMap::from([
        (ConfirmationFactorKind::PastPerformanceConfirmation, 0.25),
        (ConfirmationFactorKind::CapabilityVerification, 0.25),
        (ConfirmationFactorKind::CertificationValidation, 0.15),
        (ConfirmationFactorKind::SizeClearanceConfirmation, 0.15),
        (ConfirmationFactorKind::MarketPresence, 0.10),
        (ConfirmationFactorKind::TechnicalExpertise, 0.10),
    ])
}

fn default_validation_weights() -> BTreeMap<ValidationComponentKind, f64> {
    BTreeMap::from([
        (ValidationComponentKind::MatchQuality, 0.30),
        (ValidationComponentKind::ConfirmationQuality, 0.25),
        (ValidationComponentKind::DataReliability, 0.15),
        (ValidationComponentKind::RiskAssessment, 0.15),
        (ValidationComponentKind::StrategicFit, 0.15),
    ])
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            match_weights: default_match_weights(),
            confirmation_weights: default_confirmation_weights(),
            validation_weights: default_validation_weights(),
            hard_cap: DEFAULT_HARD_CAP,
        }
    }
}

impl WeightConfig {
    /// Parse and validate a YAML weight config. Missing tables fall
    /// back to the defaults; unknown keys are a parse error.
    pub fn from_yaml(yaml: &str) -> Result<Self, WeightError> {
        let config: WeightConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, WeightError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    fn validate(&self) -> Result<(), WeightError> {
        validate_table("match", self.match_weights.iter().map(|(k, v)| (k.as_str(), *v)))?;
        validate_table(
            "confirmation",
            self.confirmation_weights.iter().map(|(k, v)| (k.as_str(), *v)),
        )?;
        validate_table(
            "validation",
            self.validation_weights.iter().map(|(k, v)| (k.as_str(), *v)),
        )?;
        if !(0.0..=1.0).contains(&self.hard_cap) {
            return Err(WeightError::InvalidHardCap(self.hard_cap));
        }
        Ok(())
    }

    pub fn match_weight(&self, factor: MatchFactor) -> f64 {
        self.match_weights.get(&factor).copied().unwrap_or(0.0)
    }

    pub fn confirmation_weight(&self, kind: ConfirmationFactorKind) -> f64 {
        self.confirmation_weights.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn validation_weight(&self, kind: ValidationComponentKind) -> f64 {
        self.validation_weights.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn match_weight_total(&self) -> f64 {
        self.match_weights.values().sum()
    }
}

fn validate_table<'a>(
    table: &'static str,
    entries: impl Iterator<Item = (&'a str, f64)>,
) -> Result<(), WeightError> {
    let mut total = 0.0;
    for (factor, value) in entries {
        if !value.is_finite() {
            return Err(WeightError::NonFinite {
                factor: factor.to_string(),
            });
        }
        if value < 0.0 {
            return Err(WeightError::Negative {
                factor: factor.to_string(),
                value,
            });
        }
        total += value;
    }
    if total <= 0.0 {
        return Err(WeightError::ZeroTotal { table });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WeightConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.match_weight_total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_override_keeps_other_tables() {
        let config = WeightConfig::from_yaml(
            r#"
match:
  naics: 0.5
  capabilities: 0.5
"#,
        )
        .unwrap();

        assert_eq!(config.match_weight(MatchFactor::Naics), 0.5);
        assert_eq!(config.match_weight(MatchFactor::PastPerformance), 0.0);
        // Confirmation table untouched by a match-only override.
        assert_eq!(
            config.confirmation_weight(ConfirmationFactorKind::PastPerformanceConfirmation),
            0.25
        );
        assert_eq!(config.hard_cap, DEFAULT_HARD_CAP);
    }

    #[test]
    fn test_unknown_factor_rejected() {
        let err = WeightConfig::from_yaml(
            r#"
match:
  naics: 0.5
  moon_phase: 0.5
"#,
        )
        .unwrap_err();
        assert!(matches!(err, WeightError::Parse(_)));
    }

    #[test]
    fn test_unknown_table_rejected() {
        let err = WeightConfig::from_yaml("bonus: {naics: 1.0}\n").unwrap_err();
        assert!(matches!(err, WeightError::Parse(_)));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = WeightConfig::from_yaml(
            r#"
match:
  naics: -0.2
  capabilities: 0.8
"#,
        )
        .unwrap_err();
        assert!(matches!(err, WeightError::Negative { .. }));
    }

    #[test]
    fn test_non_numeric_weight_rejected() {
        let err = WeightConfig::from_yaml("match: {naics: lots}\n").unwrap_err();
        assert!(matches!(err, WeightError::Parse(_)));
    }

    #[test]
    fn test_all_zero_table_rejected() {
        let err = WeightConfig::from_yaml(
            r#"
match:
  naics: 0.0
  capabilities: 0.0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, WeightError::ZeroTotal { table: "match" }));
    }

    #[test]
    fn test_hard_cap_out_of_range_rejected() {
        let err = WeightConfig::from_yaml("hard_cap: 1.3\n").unwrap_err();
        assert!(matches!(err, WeightError::InvalidHardCap(_)));
    }
}
