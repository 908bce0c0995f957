//! Configuration for the intent resolution core
//!
//! All tunables live in [`FastPathConfig`]. Every value can be overridden
//! through `INTENT_*` environment variables for deployments that cannot
//! ship a config file.

use crate::error::{IntentError, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Tunables for parsing, resolution and fast-path execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastPathConfig {
    /// Minimum confidence required to execute an intent without the LLM
    pub confidence_threshold: f64,

    /// A device-name match must be this many characters longer than the
    /// runner-up to count as unambiguous
    pub disambiguation_margin: usize,

    /// Significant names shorter than this are ignored during device-name
    /// matching
    pub min_name_length: usize,

    /// Step applied by increase/decrease on temperature-like states
    pub temperature_step: f64,

    /// Step applied by increase/decrease on other numeric states
    pub level_step: f64,

    /// Clamp ceiling for temperature-like states without a declared maximum
    pub default_temperature_max: f64,

    /// Clamp ceiling for other numeric states without a declared maximum
    pub default_level_max: f64,

    /// Namespace prefix of user-defined states included in device-name search
    pub user_states_prefix: String,

    /// Upper bound on states read for a query confirmation
    pub max_query_states: usize,
}

impl Default for FastPathConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            disambiguation_margin: 2,
            min_name_length: 4,
            temperature_step: 1.0,
            level_step: 10.0,
            default_temperature_max: 30.0,
            default_level_max: 100.0,
            user_states_prefix: "0_userdata.0".to_string(),
            max_query_states: 5,
        }
    }
}

impl FastPathConfig {
    /// Build a configuration from defaults plus `INTENT_*` environment
    /// overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = parse_env_f64("INTENT_CONFIDENCE_THRESHOLD")? {
            config.confidence_threshold = v;
        }
        if let Some(v) = parse_env_usize("INTENT_DISAMBIGUATION_MARGIN")? {
            config.disambiguation_margin = v;
        }
        if let Some(v) = parse_env_usize("INTENT_MIN_NAME_LENGTH")? {
            config.min_name_length = v;
        }
        if let Some(v) = parse_env_f64("INTENT_TEMPERATURE_STEP")? {
            config.temperature_step = v;
        }
        if let Some(v) = parse_env_f64("INTENT_LEVEL_STEP")? {
            config.level_step = v;
        }
        if let Ok(prefix) = env::var("INTENT_USER_STATES_PREFIX") {
            config.user_states_prefix = prefix;
        }
        if let Some(v) = parse_env_usize("INTENT_MAX_QUERY_STATES")? {
            config.max_query_states = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(IntentError::config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.temperature_step <= 0.0 || self.level_step <= 0.0 {
            return Err(IntentError::config(
                "increase/decrease steps must be positive",
            ));
        }
        Ok(())
    }
}

fn parse_env_f64(name: &str) -> Result<Option<f64>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|e| IntentError::config(format!("{name}: {e}"))),
        Err(_) => Ok(None),
    }
}

fn parse_env_usize(name: &str) -> Result<Option<usize>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<usize>()
            .map(Some)
            .map_err(|e| IntentError::config(format!("{name}: {e}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = FastPathConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.confidence_threshold, 0.6);
        assert_eq!(config.disambiguation_margin, 2);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let config = FastPathConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
