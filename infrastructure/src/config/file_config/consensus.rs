//! Consensus configuration from TOML (`[consensus]` section)

use concord_domain::AggregationConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw consensus aggregation configuration
///
/// # Example
///
/// ```toml
/// [consensus]
/// iqr_multiplier = 1.5
/// min_outlier_samples = 4
/// small_sample_ceiling = 0.5
/// min_usable_samples = 2
///
/// [consensus.field_weights]
/// severity = 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    pub iqr_multiplier: f64,
    pub min_outlier_samples: usize,
    pub small_sample_ceiling: f64,
    pub unrecognized_category_penalty: f64,
    pub min_usable_samples: usize,
    /// Overrides the schema's own field weights
    pub field_weights: BTreeMap<String, f64>,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        let config = AggregationConfig::default();
        Self {
            iqr_multiplier: config.iqr_multiplier,
            min_outlier_samples: config.min_outlier_samples,
            small_sample_ceiling: config.small_sample_ceiling,
            unrecognized_category_penalty: config.unrecognized_category_penalty,
            min_usable_samples: config.min_usable_samples,
            field_weights: config.field_weights,
        }
    }
}

impl FileConsensusConfig {
    pub fn to_aggregation_config(&self) -> AggregationConfig {
        AggregationConfig {
            iqr_multiplier: self.iqr_multiplier,
            min_outlier_samples: self.min_outlier_samples,
            small_sample_ceiling: self.small_sample_ceiling,
            unrecognized_category_penalty: self.unrecognized_category_penalty,
            field_weights: self.field_weights.clone(),
            min_usable_samples: self.min_usable_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigIssue, ConfigIssueCode};

    #[test]
    fn test_default_round_trips_to_domain() {
        assert_eq!(
            FileConsensusConfig::default().to_aggregation_config(),
            AggregationConfig::default()
        );
    }

    #[test]
    fn test_field_weights_table() {
        let toml_str = r#"
[consensus]
min_usable_samples = 3

[consensus.field_weights]
severity = 2.0
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let aggregation = config.consensus.to_aggregation_config();
        assert_eq!(aggregation.min_usable_samples, 3);
        assert_eq!(aggregation.field_weights.get("severity"), Some(&2.0));
        assert_eq!(aggregation.iqr_multiplier, 1.5);
    }

    #[test]
    fn test_min_outlier_samples_below_four_is_an_error() {
        let toml_str = r#"
[consensus]
min_outlier_samples = 3
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert!(ConfigIssue::has_errors(&issues));
        let issue = issues
            .iter()
            .find(|i| matches!(&i.code, ConfigIssueCode::InvalidValue { section } if section == "consensus"))
            .unwrap();
        assert!(issue.message.contains("min_outlier_samples"));
    }
}
