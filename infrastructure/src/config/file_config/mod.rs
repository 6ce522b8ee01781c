//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Enum-like fields stay strings here so an unknown value becomes a
//! warning with a fallback instead of a parse failure.

mod consensus;
mod mining;
mod sampling;

pub use consensus::FileConsensusConfig;
pub use mining::FileMiningConfig;
pub use sampling::FileSamplingConfig;

use super::issue::{ConfigIssue, ConfigIssueCode, Severity};
use concord_application::{EngineConfig, RECOMMENDED_CONCURRENCY};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Consensus-mode sampling and shared call timing
    pub sampling: FileSamplingConfig,
    /// Consensus aggregation settings
    pub consensus: FileConsensusConfig,
    /// Mining-mode sampling and miner settings
    pub mining: FileMiningConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// It checks:
    /// 1. Enum parse failures (schedules, diversification, clustering tier)
    /// 2. Concurrency outside the recommended window
    /// 3. Range checks of every converted section
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Enum parse validation
        issues.extend(self.sampling.parse_schedule().1);
        issues.extend(self.sampling.parse_diversification().1);
        issues.extend(self.mining.parse_schedule().1);
        issues.extend(self.mining.parse_diversification().1);
        issues.extend(self.mining.parse_max_tier().1);

        // 2. Concurrency window
        for (field, value) in [
            ("sampling.concurrency", self.sampling.concurrency),
            ("mining.concurrency", self.mining.concurrency),
        ] {
            if value > 0 && !RECOMMENDED_CONCURRENCY.contains(&value) {
                issues.push(ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::ConcurrencyOutsideRecommended { value },
                    message: format!(
                        "{field}: {value} is outside the recommended range {}-{}",
                        RECOMMENDED_CONCURRENCY.start(),
                        RECOMMENDED_CONCURRENCY.end()
                    ),
                });
            }
        }

        // 3. Range validation per section
        let engine = self.to_engine_config();
        if let Err(e) = engine.sampling.validate() {
            issues.push(ConfigIssue::invalid_value("sampling", e));
        }
        if let Err(e) = engine.aggregation.validate() {
            issues.push(ConfigIssue::invalid_value("consensus", e));
        }
        if let Err(e) = engine.mining_sampling.validate() {
            issues.push(ConfigIssue::invalid_value("mining", e));
        }
        if let Err(e) = engine.mining.validate() {
            issues.push(ConfigIssue::invalid_value("mining", e));
        }
        issues
    }

    /// Convert to the application configuration; unknown enum strings fall back.
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_sampling(self.sampling.to_sampling_params())
            .with_mining_sampling(self.mining.to_sampling_params(&self.sampling))
            .with_aggregation(self.consensus.to_aggregation_config())
            .with_mining(self.mining.to_mining_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_clean() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.to_engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_out_of_range_values_are_errors() {
        let toml_str = r#"
[sampling]
samples = 0

[consensus]
small_sample_ceiling = 1.5
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert!(ConfigIssue::has_errors(&issues));
        assert_eq!(
            issues
                .iter()
                .filter(|i| i.severity == Severity::Error)
                .count(),
            2
        );
    }

    #[test]
    fn test_warnings_are_not_fatal() {
        let toml_str = r#"
[sampling]
concurrency = 16
diversification = "chaos"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(!ConfigIssue::has_errors(&issues));
        assert!(
            issues
                .iter()
                .any(|i| matches!(i.code, ConfigIssueCode::ConcurrencyOutsideRecommended { value: 16 }))
        );
    }
}
