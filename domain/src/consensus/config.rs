use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Knobs for the consensus aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Tukey fence multiplier
    pub iqr_multiplier: f64,
    /// Below this many present values no outliers are flagged
    pub min_outlier_samples: usize,
    /// Numeric confidence ceiling below `min_outlier_samples`
    pub small_sample_ceiling: f64,
    /// Multiplier applied when the modal category is outside the allowed set
    pub unrecognized_category_penalty: f64,
    /// Per-field weight overrides; schema weights apply otherwise
    pub field_weights: BTreeMap<String, f64>,
    /// Fewer usable records than this is a terminal failure
    pub min_usable_samples: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            min_outlier_samples: 4,
            small_sample_ceiling: 0.5,
            unrecognized_category_penalty: 0.5,
            field_weights: BTreeMap::new(),
            min_usable_samples: 2,
        }
    }
}

impl AggregationConfig {
    pub fn with_field_weight(mut self, field: impl Into<String>, weight: f64) -> Self {
        self.field_weights.insert(field.into(), weight);
        self
    }

    pub fn with_min_usable_samples(mut self, min: usize) -> Self {
        self.min_usable_samples = min;
        self
    }

    pub fn with_iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = multiplier;
        self
    }

    pub fn with_min_outlier_samples(mut self, min: usize) -> Self {
        self.min_outlier_samples = min;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier <= 0.0 {
            return Err(DomainError::config("iqr_multiplier must be positive"));
        }
        // quartiles of fewer than four values are not meaningful
        if self.min_outlier_samples < 4 {
            return Err(DomainError::config(format!(
                "min_outlier_samples must be at least 4, got {}",
                self.min_outlier_samples
            )));
        }
        for (label, value) in [
            ("small_sample_ceiling", self.small_sample_ceiling),
            ("unrecognized_category_penalty", self.unrecognized_category_penalty),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::config(format!(
                    "{label} must be within [0, 1], got {value}"
                )));
            }
        }
        if let Some((field, weight)) = self
            .field_weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(DomainError::config(format!(
                "weight for field '{field}' must be non-negative, got {weight}"
            )));
        }
        if self.min_usable_samples == 0 {
            return Err(DomainError::config("min_usable_samples must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AggregationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_malformed_weights_rejected() {
        let config = AggregationConfig::default().with_field_weight("impact", -1.0);
        assert!(config.validate().unwrap_err().is_configuration());
        let config = AggregationConfig::default().with_field_weight("impact", f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_min_usable_rejected() {
        let config = AggregationConfig::default().with_min_usable_samples(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_outlier_samples_floor() {
        let config = AggregationConfig::default().with_min_outlier_samples(3);
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("min_outlier_samples"));
        assert!(AggregationConfig::default()
            .with_min_outlier_samples(4)
            .validate()
            .is_ok());
    }
}
