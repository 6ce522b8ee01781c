//! Mining configuration from TOML (`[mining]` section)
//!
//! Covers both the exploration sampling knobs and the miner itself.
//! Timeouts and retries are shared with `[sampling]`.
//!
//! ```toml
//! [mining]
//! samples = 32
//! temperature_schedule = "linear_increase"
//! temperature_start = 0.7
//! temperature_end = 1.0
//! diversification = "role_injection"
//! quality_threshold = 0.6
//! max_tier = "hierarchical"    # singleton, hierarchical, density
//!
//! [mining.weights]
//! novelty = 0.4
//! coherence = 0.3
//! coverage = 0.3
//! ```

use super::sampling::{FileSamplingConfig, parse_diversification, parse_schedule};
use crate::config::issue::ConfigIssue;
use concord_application::SamplingParams;
use concord_domain::{
    ClusteringTier, MiningConfig, PromptDiversification, ScoreWeights, TemperaturePolicy,
    TemperatureSchedule,
};
use serde::{Deserialize, Serialize};

const TIERS: [&str; 3] = ["singleton", "hierarchical", "density"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMiningConfig {
    pub samples: usize,
    pub concurrency: usize,
    pub max_cost_usd: Option<f64>,
    pub temperature_schedule: String,
    pub temperature_start: f64,
    pub temperature_end: f64,
    pub temperature_seed: Option<u64>,
    pub diversification: String,
    pub quality_threshold: f64,
    pub weights: ScoreWeights,
    pub min_cluster_size: usize,
    pub min_samples: usize,
    pub reduced_dimensions: usize,
    pub cluster_ratio: f64,
    pub max_tier: Option<String>,
    pub max_candidates: Option<usize>,
    pub high_novelty_threshold: f64,
    pub include_consensus_baseline: bool,
    pub min_usable_samples: usize,
}

impl Default for FileMiningConfig {
    fn default() -> Self {
        let params = SamplingParams::exploration();
        let config = MiningConfig::default();
        Self {
            samples: params.samples,
            concurrency: params.concurrency,
            max_cost_usd: None,
            temperature_schedule: params.temperature.schedule.to_string(),
            temperature_start: params.temperature.start,
            temperature_end: params.temperature.end,
            temperature_seed: None,
            diversification: params.diversification.to_string(),
            quality_threshold: config.quality_threshold,
            weights: config.weights,
            min_cluster_size: config.min_cluster_size,
            min_samples: config.min_samples,
            reduced_dimensions: config.reduced_dimensions,
            cluster_ratio: config.cluster_ratio,
            max_tier: None,
            max_candidates: config.max_candidates,
            high_novelty_threshold: config.high_novelty_threshold,
            include_consensus_baseline: config.include_consensus_baseline,
            min_usable_samples: config.min_usable_samples,
        }
    }
}

impl FileMiningConfig {
    pub fn parse_schedule(&self) -> (TemperatureSchedule, Vec<ConfigIssue>) {
        parse_schedule(
            "mining.temperature_schedule",
            &self.temperature_schedule,
            TemperatureSchedule::LinearIncrease,
        )
    }

    pub fn parse_diversification(&self) -> (PromptDiversification, Vec<ConfigIssue>) {
        parse_diversification(
            "mining.diversification",
            &self.diversification,
            PromptDiversification::RoleInjection,
        )
    }

    /// Parse the tier cap; an unknown value means no cap.
    pub fn parse_max_tier(&self) -> (Option<ClusteringTier>, Vec<ConfigIssue>) {
        let Some(ref tier) = self.max_tier else {
            return (None, vec![]);
        };
        match tier.parse::<ClusteringTier>() {
            Ok(tier) => (Some(tier), vec![]),
            Err(_) => (
                None,
                vec![ConfigIssue::invalid_enum(
                    "mining.max_tier",
                    tier,
                    &TIERS,
                    "best available",
                )],
            ),
        }
    }

    /// Exploration sampling; call timing comes from `[sampling]`.
    pub fn to_sampling_params(&self, shared: &FileSamplingConfig) -> SamplingParams {
        let mut temperature = TemperaturePolicy::new(
            self.parse_schedule().0,
            self.temperature_start,
            self.temperature_end,
        );
        if let Some(seed) = self.temperature_seed {
            temperature = temperature.with_seed(seed);
        }
        let timing = shared.to_sampling_params();
        SamplingParams::exploration()
            .with_samples(self.samples)
            .with_concurrency(self.concurrency)
            .with_call_timeout(timing.call_timeout)
            .with_max_retries(timing.max_retries)
            .with_retry_backoff(timing.retry_backoff)
            .with_max_cost_usd(self.max_cost_usd)
            .with_temperature(temperature)
            .with_diversification(self.parse_diversification().0)
    }

    pub fn to_mining_config(&self) -> MiningConfig {
        MiningConfig {
            quality_threshold: self.quality_threshold,
            weights: self.weights,
            min_cluster_size: self.min_cluster_size,
            min_samples: self.min_samples,
            reduced_dimensions: self.reduced_dimensions,
            cluster_ratio: self.cluster_ratio,
            max_tier: self.parse_max_tier().0,
            max_candidates: self.max_candidates,
            high_novelty_threshold: self.high_novelty_threshold,
            include_consensus_baseline: self.include_consensus_baseline,
            min_usable_samples: self.min_usable_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain() {
        let config = FileMiningConfig::default();
        assert_eq!(config.to_mining_config(), MiningConfig::default());
        assert_eq!(
            config.to_sampling_params(&FileSamplingConfig::default()),
            SamplingParams::exploration()
        );
    }

    #[test]
    fn test_deserialize_weights_and_tier() {
        let toml_str = r#"
[mining]
samples = 16
max_tier = "hierarchical"
max_candidates = 4

[mining.weights]
novelty = 0.6
coherence = 0.2
coverage = 0.2
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let mining = config.mining.to_mining_config();
        assert_eq!(mining.max_tier, Some(ClusteringTier::Hierarchical));
        assert_eq!(mining.max_candidates, Some(4));
        assert_eq!(mining.weights.novelty, 0.6);
        assert_eq!(
            config
                .mining
                .to_sampling_params(&config.sampling)
                .samples,
            16
        );
    }

    #[test]
    fn test_unknown_tier_warns() {
        let config = FileMiningConfig {
            max_tier: Some("spectral".to_string()),
            ..Default::default()
        };
        let (tier, issues) = config.parse_max_tier();
        assert!(tier.is_none());
        assert_eq!(issues.len(), 1);
    }
}
