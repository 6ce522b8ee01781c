//! Consensus aggregation (self-consistency mode)

pub mod aggregator;
pub mod config;
pub mod result;
pub mod review;
pub mod stats;

pub use aggregator::ConsensusAggregator;
pub use config::AggregationConfig;
pub use result::{Consensus, ConsensusResult, FieldConsensus, OutlierReport};
pub use review::ReviewLevel;
pub use stats::NumericSummary;
