//! Engine configuration and per-request options.
//!
//! Every field has a default, so partial JSON is accepted:
//! `{"cache_capacity": 50}` only overrides the cache size.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Orchestrator tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum cached results.
    pub cache_capacity: usize,
    /// Overall confidence below this flags the result for review.
    pub min_confidence_threshold: f64,
    /// Degrade to a keyword-only result instead of returning stage errors.
    pub fallback_to_rule_based: bool,
    /// Per-stage latency samples kept before trimming to `latency_history_retain`.
    pub latency_history_limit: usize,
    pub latency_history_retain: usize,
    pub correction_log_limit: usize,
    pub correction_log_retain: usize,
    /// Requests run concurrently per batch chunk.
    pub batch_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 200,
            min_confidence_threshold: 0.6,
            fallback_to_rule_based: true,
            latency_history_limit: 1000,
            latency_history_retain: 500,
            correction_log_limit: 1000,
            correction_log_retain: 500,
            batch_concurrency: 4,
        }
    }
}

impl PipelineConfig {
    /// Parse a (possibly partial) JSON object and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid("cache_capacity must be greater than 0".into()));
        }
        if self.batch_concurrency == 0 {
            return Err(ConfigError::Invalid("batch_concurrency must be greater than 0".into()));
        }
        if !(0.0..=1.0).contains(&self.min_confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "min_confidence_threshold must be within [0, 1], got {}",
                self.min_confidence_threshold
            )));
        }
        if self.latency_history_retain > self.latency_history_limit {
            return Err(ConfigError::Invalid(
                "latency_history_retain exceeds latency_history_limit".into(),
            ));
        }
        if self.correction_log_retain > self.correction_log_limit {
            return Err(ConfigError::Invalid(
                "correction_log_retain exceeds correction_log_limit".into(),
            ));
        }
        Ok(())
    }
}

/// Per-request switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    pub use_cache: bool,
    pub skip_validation: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            skip_validation: false,
        }
    }
}

impl ProcessOptions {
    pub fn uncached() -> Self {
        Self {
            use_cache: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_contract() {
        let config = PipelineConfig::default();
        assert_eq!(config.cache_capacity, 200);
        assert_eq!(config.min_confidence_threshold, 0.6);
        assert!(config.fallback_to_rule_based);
        assert_eq!(config.latency_history_limit, 1000);
        assert_eq!(config.latency_history_retain, 500);
        assert_eq!(config.batch_concurrency, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = PipelineConfig::from_json(r#"{"cache_capacity": 50}"#).unwrap();
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.min_confidence_threshold, 0.6);
        assert_eq!(config.correction_log_limit, 1000);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = PipelineConfig::from_json("{cache_capacity").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_capacity_rejected() {
        let err = PipelineConfig::from_json(r#"{"cache_capacity": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn threshold_outside_unit_interval_rejected() {
        let err = PipelineConfig::from_json(r#"{"min_confidence_threshold": 1.5}"#).unwrap_err();
        assert!(err.to_string().contains("1.5"), "Expected threshold in message, got {err}");
    }

    #[test]
    fn retain_above_limit_rejected() {
        let config = PipelineConfig {
            latency_history_limit: 10,
            latency_history_retain: 20,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn process_options_default_uses_cache() {
        let options = ProcessOptions::default();
        assert!(options.use_cache);
        assert!(!options.skip_validation);
        assert!(!ProcessOptions::uncached().use_cache);

        let parsed: ProcessOptions = serde_json::from_str(r#"{"skip_validation": true}"#).unwrap();
        assert!(parsed.use_cache);
        assert!(parsed.skip_validation);
    }
}
