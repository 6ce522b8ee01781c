//! Engine configuration container.
//!
//! [`EngineConfig`] groups the configuration slices of both run modes so
//! outer layers can load, validate and hand them out in one piece.
//!
//! # Slice usage
//!
//! | Slice | Extract | Mine |
//! |-------|---------|------|
//! | `sampling` | Yes | No |
//! | `mining_sampling` | No | Yes |
//! | `aggregation` | Yes | Baseline only |
//! | `mining` | No | Yes |

use super::SamplingParams;
use concord_domain::{AggregationConfig, DomainError, MiningConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sampling for consensus runs.
    pub sampling: SamplingParams,
    /// Sampling for mining runs; early stop is always off there.
    pub mining_sampling: SamplingParams,
    pub aggregation: AggregationConfig,
    pub mining: MiningConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingParams::default(),
            mining_sampling: SamplingParams::exploration(),
            aggregation: AggregationConfig::default(),
            mining: MiningConfig::default(),
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_mining_sampling(mut self, sampling: SamplingParams) -> Self {
        self.mining_sampling = sampling;
        self
    }

    pub fn with_aggregation(mut self, aggregation: AggregationConfig) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_mining(mut self, mining: MiningConfig) -> Self {
        self.mining = mining;
        self
    }

    // ==================== Validation ====================

    /// Validate every slice; the first problem found is returned.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.sampling.validate()?;
        self.mining_sampling.validate()?;
        self.aggregation.validate()?;
        self.mining.validate()?;
        Ok(())
    }
}
