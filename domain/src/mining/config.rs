use super::clustering::ClusteringTier;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Weights of the composite candidate score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub novelty: f64,
    pub coherence: f64,
    pub coverage: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            novelty: 0.4,
            coherence: 0.3,
            coverage: 0.3,
        }
    }
}

impl ScoreWeights {
    pub fn composite(&self, novelty: f64, coherence: f64, coverage: f64) -> f64 {
        self.novelty * novelty + self.coherence * coherence + self.coverage * coverage
    }
}

/// Configuration for exploration-mode mining
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Records with an overall quality below this are dropped
    pub quality_threshold: f64,
    pub weights: ScoreWeights,
    /// Density clustering: minimum points per cluster
    pub min_cluster_size: usize,
    /// Density clustering: core point neighbourhood size
    pub min_samples: usize,
    /// Target dimensionality after reduction
    pub reduced_dimensions: usize,
    /// Hierarchical clustering: clusters per surviving record
    pub cluster_ratio: f64,
    /// Cap on the clustering tier, below what the build supports
    pub max_tier: Option<ClusteringTier>,
    /// Truncate the ranked candidates; `None` keeps all
    pub max_candidates: Option<usize>,
    /// Candidates above this novelty are reported as high-novelty
    pub high_novelty_threshold: f64,
    pub include_consensus_baseline: bool,
    /// Fewer surviving records than this is a terminal failure
    pub min_usable_samples: usize,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            quality_threshold: 0.6,
            weights: ScoreWeights::default(),
            min_cluster_size: 2,
            min_samples: 1,
            reduced_dimensions: 10,
            cluster_ratio: 0.3,
            max_tier: None,
            max_candidates: None,
            high_novelty_threshold: 0.7,
            include_consensus_baseline: true,
            min_usable_samples: 2,
        }
    }
}

impl MiningConfig {
    pub fn with_quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = threshold;
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_max_tier(mut self, tier: ClusteringTier) -> Self {
        self.max_tier = Some(tier);
        self
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }

    pub fn with_cluster_ratio(mut self, ratio: f64) -> Self {
        self.cluster_ratio = ratio;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            return Err(DomainError::config(format!(
                "quality_threshold must be within [0, 1], got {}",
                self.quality_threshold
            )));
        }
        let w = self.weights;
        for (label, value) in [
            ("novelty", w.novelty),
            ("coherence", w.coherence),
            ("coverage", w.coverage),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::config(format!(
                    "{label} weight must be non-negative, got {value}"
                )));
            }
        }
        if w.novelty + w.coherence + w.coverage <= 0.0 {
            return Err(DomainError::config("score weights must not all be zero"));
        }
        if self.min_cluster_size < 2 {
            return Err(DomainError::config("min_cluster_size must be at least 2"));
        }
        if self.min_samples == 0 || self.reduced_dimensions == 0 {
            return Err(DomainError::config(
                "min_samples and reduced_dimensions must be positive",
            ));
        }
        if !(self.cluster_ratio > 0.0 && self.cluster_ratio <= 1.0) {
            return Err(DomainError::config(format!(
                "cluster_ratio must be within (0, 1], got {}",
                self.cluster_ratio
            )));
        }
        if self.max_candidates == Some(0) {
            return Err(DomainError::config("max_candidates must be positive"));
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
    fn test_defaults_valid() {
        let config = MiningConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.weights.composite(1.0, 1.0, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_values() {
        assert!(MiningConfig::default().with_quality_threshold(1.5).validate().is_err());
        assert!(MiningConfig::default().with_cluster_ratio(0.0).validate().is_err());
        assert!(MiningConfig::default().with_max_candidates(0).validate().is_err());
        let zero = ScoreWeights {
            novelty: 0.0,
            coherence: 0.0,
            coverage: 0.0,
        };
        assert!(MiningConfig::default().with_weights(zero).validate().is_err());
    }
}
