//! Diversity mining (exploration mode): quality gate, clustering, ranking

pub mod clustering;
pub mod config;
pub mod miner;
pub mod result;
pub mod scoring;
pub mod vector;

pub use clustering::{Clustering, ClusteringStrategy, ClusteringTier, SingletonClustering};
pub use config::{MiningConfig, ScoreWeights};
pub use miner::{DiversityMiner, QualityGate, ScoredRecord};
pub use result::{Cluster, Mining, MiningCandidate, MiningResult};
pub use scoring::{CoherenceScorer, ConstraintCoherence, QualityScore};
