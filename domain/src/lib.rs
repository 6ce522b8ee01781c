//! Domain layer for concord
//!
//! Pure, synchronous logic for turning many independent generations into
//! either one trustworthy structured answer or a ranked set of distinct ones.
//! No I/O lives here; the application layer owns generation and embedding.
//!
//! # Core Concepts
//!
//! ## Consensus mode
//!
//! Self-consistency: N samples are parsed against a [`Schema`] and collapsed
//! by [`ConsensusAggregator`] into one answer with a calibrated confidence
//! and a [`ReviewLevel`].
//!
//! ## Mining mode
//!
//! Exploration: the same records are quality-filtered, clustered and ranked
//! by [`DiversityMiner`] so that minority answers survive as candidates.

pub mod consensus;
pub mod core;
pub mod cost;
pub mod extraction;
pub mod mining;
pub mod prompt;
pub mod sampling;
pub mod schema;
pub mod util;

pub use consensus::{
    AggregationConfig, Consensus, ConsensusAggregator, ConsensusResult, FieldConsensus,
    NumericSummary, OutlierReport, ReviewLevel,
};
pub use core::{error::DomainError, query::Query};
pub use cost::{Budget, ConfidenceStability, CostLedger, NeverStable, StabilityPredicate};
pub use extraction::{Extraction, FieldStatus, FieldValue, SchemaExtractor, StructuredRecord};
pub use mining::{
    Cluster, ClusteringTier, CoherenceScorer, DiversityMiner, Mining, MiningCandidate,
    MiningConfig, MiningResult, QualityGate, QualityScore, ScoreWeights,
};
pub use prompt::PromptTemplate;
pub use sampling::{
    PromptDiversification, RawSample, SampleOutcome, SamplingRequest, TemperaturePolicy,
    TemperatureSchedule, TokenUsage,
};
pub use schema::{FieldConstraint, FieldKind, Schema, SchemaField, SchemaRef, SchemaRegistry};
