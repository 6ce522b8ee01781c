//! Mining outputs

use super::clustering::ClusteringTier;
use super::scoring::QualityScore;
use crate::consensus::Consensus;
use crate::extraction::StructuredRecord;
use crate::sampling::TokenUsage;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub id: usize,
    /// Sample indices of the member records
    pub members: Vec<usize>,
    pub singleton: bool,
}

/// The representative answer of one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiningCandidate {
    pub record: StructuredRecord,
    pub cluster_id: usize,
    pub cluster_size: usize,
    pub novelty: f64,
    pub coherence: f64,
    pub coverage: f64,
    pub composite: f64,
    pub quality: QualityScore,
    /// Sample indices of every record in the candidate's cluster
    pub contributors: Vec<usize>,
}

/// Ranked candidates over the records that passed the quality gate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mining {
    /// Sorted by composite score, highest first
    pub candidates: Vec<MiningCandidate>,
    pub clusters: Vec<Cluster>,
    pub num_clusters: usize,
    /// Clusters per surviving record
    pub diversity_score: f64,
    /// `diversity_score * quality_pass_rate`
    pub effective_diversity: f64,
    pub quality_pass_rate: f64,
    /// Reported only by the density tier
    pub separation: Option<f64>,
    pub tier: ClusteringTier,
    /// Cluster ids of candidates above the novelty threshold
    pub high_novelty: Vec<usize>,
    /// What consensus mode would return over the same survivors
    pub consensus_baseline: Option<Consensus>,
    pub samples_passed_quality: usize,
}

/// Mining plus the metrics of the sampling run that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiningResult {
    #[serde(flatten)]
    pub mining: Mining,
    pub samples_generated: usize,
    pub samples_failed: usize,
    pub records_discarded: usize,
    pub budget_exhausted: bool,
    pub tokens_used: TokenUsage,
    pub cost_usd: f64,
    pub latency_ms: u64,
}

impl MiningResult {
    pub fn candidates(&self) -> &[MiningCandidate] {
        &self.mining.candidates
    }

    pub fn num_clusters(&self) -> usize {
        self.mining.num_clusters
    }
}
