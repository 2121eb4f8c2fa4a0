//! Predictor configuration and its validation.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Minutes in one day, the usual learning cycle.
pub const DEFAULT_PERIOD_MIN: u32 = 24 * 60;

/// Configuration for a single predictor.
///
/// Immutable once a [`BlockPredictor`](super::BlockPredictor) has been built
/// from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Display name, also used to address the predictor from the CLI.
    pub name: String,
    /// Stable identifier used as the persistence key. Falls back to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    /// Reference to the observed binary signal.
    pub entity: String,
    /// Total minutes spanned by one learning cycle.
    #[serde(default = "default_period")]
    pub period: u32,
    /// Minutes per block.
    pub block_length: u32,
    /// Retention weight of the prior estimate, in [0, 1].
    pub fading: f64,
    /// Classification cutoff, in [0, 1].
    pub threshold: f64,
}

fn default_period() -> u32 {
    DEFAULT_PERIOD_MIN
}

impl PredictorConfig {
    pub fn new(
        name: impl Into<String>,
        entity: impl Into<String>,
        block_length: u32,
        fading: f64,
        threshold: f64,
    ) -> Self {
        Self {
            name: name.into(),
            unique_id: None,
            entity: entity.into(),
            period: DEFAULT_PERIOD_MIN,
            block_length,
            fading,
            threshold,
        }
    }

    pub fn with_period(mut self, period: u32) -> Self {
        self.period = period;
        self
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Persistence key for this predictor.
    pub fn unique_id(&self) -> &str {
        self.unique_id.as_deref().unwrap_or(&self.name)
    }

    /// Number of blocks in one cycle. Only meaningful after [`validate`](Self::validate).
    pub fn block_count(&self) -> usize {
        if self.block_length == 0 {
            return 0;
        }
        (self.period / self.block_length) as usize
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingKey("name".into()));
        }
        if self.entity.trim().is_empty() {
            return Err(ConfigError::MissingKey("entity".into()));
        }
        if self.block_length == 0 {
            return Err(ConfigError::invalid("block_length", "must be > 0"));
        }
        if self.period == 0 {
            return Err(ConfigError::invalid("period", "must be > 0"));
        }
        if self.period % self.block_length != 0 {
            return Err(ConfigError::invalid(
                "period",
                format!(
                    "{} is not a multiple of block_length {}",
                    self.period, self.block_length
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.fading) {
            return Err(ConfigError::invalid("fading", "must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::invalid("threshold", "must be in [0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PredictorConfig {
        PredictorConfig::new("kitchen", "binary_sensor.kitchen_motion", 30, 0.5, 0.4)
    }

    #[test]
    fn valid_config_derives_block_count() {
        let cfg = base();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.block_count(), 48);
        assert_eq!(cfg.unique_id(), "kitchen");
        assert_eq!(cfg.with_unique_id("abc").unique_id(), "abc");
    }

    #[test]
    fn rejects_zero_block_length() {
        let mut cfg = base();
        cfg.block_length = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "block_length"
        ));
    }

    #[test]
    fn rejects_period_not_multiple_of_block_length() {
        let cfg = base().with_period(1000);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "period"
        ));
    }

    #[test]
    fn rejects_out_of_range_fading_and_threshold() {
        let mut cfg = base();
        cfg.fading = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = base();
        cfg.threshold = -0.1;
        assert!(cfg.validate().is_err());

        let mut cfg = base();
        cfg.fading = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn accepts_range_endpoints() {
        let mut cfg = base();
        cfg.fading = 0.0;
        cfg.threshold = 1.0;
        assert!(cfg.validate().is_ok());
        cfg.fading = 1.0;
        cfg.threshold = 0.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_missing_entity() {
        let mut cfg = base();
        cfg.entity = "  ".into();
        assert_eq!(cfg.validate(), Err(ConfigError::MissingKey("entity".into())));
    }

    #[test]
    fn period_defaults_to_one_day() {
        let cfg: PredictorConfig = toml::from_str(
            r#"
            name = "hall"
            entity = "binary_sensor.hall"
            block_length = 15
            fading = 0.9
            threshold = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.period, 1440);
        assert_eq!(cfg.block_count(), 96);
    }
}
