//! Diversity mining (exploration mode)
//!
//! Two synchronous phases around the single embedding call:
//! [`DiversityMiner::filter`] applies the quality gate, then
//! [`DiversityMiner::rank`] clusters the survivors and picks one candidate
//! per cluster.

use super::clustering::{ClusteringStrategy, ClusteringTier, Clustering, select_strategy};
use super::config::MiningConfig;
use super::result::{Cluster, Mining, MiningCandidate};
use super::scoring::{self, CoherenceScorer, ConstraintCoherence, QualityScore};
use super::vector::{cosine_distance, distance_matrix};
use crate::consensus::{AggregationConfig, ConsensusAggregator};
use crate::core::error::DomainError;
use crate::extraction::StructuredRecord;
use crate::schema::Schema;
use crate::util::{jaccard, token_set};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: StructuredRecord,
    pub quality: QualityScore,
}

/// Records that passed the quality filter
#[derive(Debug, Clone, PartialEq)]
pub struct QualityGate {
    pub survivors: Vec<ScoredRecord>,
    /// Sample indices of records below the threshold
    pub rejected: Vec<usize>,
    /// Completed samples considered, including ones with no usable field
    pub total: usize,
}

impl QualityGate {
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.survivors.len() as f64 / self.total as f64
        }
    }

    /// Text handed to the embedding capability, one per survivor
    pub fn texts(&self) -> Vec<String> {
        self.survivors.iter().map(|s| s.record.to_text()).collect()
    }
}

pub struct DiversityMiner {
    config: MiningConfig,
    aggregation: AggregationConfig,
    coherence: Box<dyn CoherenceScorer>,
    strategy: Box<dyn ClusteringStrategy>,
}

impl DiversityMiner {
    /// Validates `config` and fixes the clustering tier for this miner.
    pub fn new(config: MiningConfig) -> Result<Self, DomainError> {
        config.validate()?;
        let strategy = select_strategy(&config);
        Ok(Self {
            config,
            aggregation: AggregationConfig::default(),
            coherence: Box::new(ConstraintCoherence),
            strategy,
        })
    }

    /// Aggregation settings for the consensus baseline
    pub fn with_aggregation(mut self, aggregation: AggregationConfig) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_coherence_scorer(mut self, scorer: impl CoherenceScorer + 'static) -> Self {
        self.coherence = Box::new(scorer);
        self
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    pub fn tier(&self) -> ClusteringTier {
        self.strategy.tier()
    }

    /// Score every record and keep those at or above the quality threshold.
    ///
    /// `discarded` counts completed samples that yielded no usable field;
    /// they count against the pass rate.
    pub fn filter(
        &self,
        schema: &Schema,
        query: &str,
        records: Vec<StructuredRecord>,
        discarded: usize,
    ) -> Result<QualityGate, DomainError> {
        let total = records.len() + discarded;
        let mut survivors = Vec::new();
        let mut rejected = Vec::new();

        for record in records {
            let quality = QualityScore::new(
                self.coherence.score(schema, &record),
                scoring::coverage(schema, &record),
                scoring::relevance(query, &record),
                self.config.quality_threshold,
            );
            if quality.passed {
                survivors.push(ScoredRecord { record, quality });
            } else {
                debug!(
                    "Sample {} below quality threshold ({:.2})",
                    record.sample_index, quality.overall
                );
                rejected.push(record.sample_index);
            }
        }

        if survivors.len() < self.config.min_usable_samples {
            warn!(
                "Only {} of {} records passed the quality filter",
                survivors.len(),
                total
            );
            return Err(DomainError::InsufficientSamples {
                usable: survivors.len(),
                required: self.config.min_usable_samples,
            });
        }

        Ok(QualityGate {
            survivors,
            rejected,
            total,
        })
    }

    /// Cluster and rank the survivors.
    ///
    /// `embeddings` must hold one vector per survivor, in survivor order.
    /// Without usable embeddings the miner falls back to lexical distances
    /// and one cluster per record.
    pub fn rank(
        &self,
        schema: &Schema,
        gate: QualityGate,
        embeddings: Option<Vec<Vec<f32>>>,
    ) -> Mining {
        let n = gate.survivors.len();
        let pass_rate = gate.pass_rate();

        let (distances, clustering, tier) = match usable_vectors(embeddings, n) {
            Some(vectors) => {
                let distances = distance_matrix(&vectors, |a, b| cosine_distance(a, b));
                (distances, self.strategy.cluster(&vectors), self.strategy.tier())
            }
            None => {
                warn!("No usable embeddings; falling back to lexical distances");
                let sets: Vec<_> = gate
                    .survivors
                    .iter()
                    .map(|s| token_set(&s.record.to_text()))
                    .collect();
                let distances = distance_matrix(&sets, |a, b| 1.0 - jaccard(a, b));
                (distances, Clustering::singletons(n), ClusteringTier::Singleton)
            }
        };

        let novelty = scoring::novelty(&distances);
        let weights = self.config.weights;
        let composite: Vec<f64> = gate
            .survivors
            .iter()
            .zip(&novelty)
            .map(|(s, nov)| weights.composite(*nov, s.quality.coherence, s.quality.coverage))
            .collect();

        let num_clusters = clustering.cluster_count();
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); num_clusters];
        for (pos, &label) in clustering.labels.iter().enumerate() {
            members[label].push(pos);
        }

        let clusters: Vec<Cluster> = members
            .iter()
            .enumerate()
            .map(|(id, positions)| Cluster {
                id,
                members: positions
                    .iter()
                    .map(|&p| gate.survivors[p].record.sample_index)
                    .collect(),
                singleton: positions.len() == 1,
            })
            .collect();

        let mut candidates: Vec<MiningCandidate> = Vec::with_capacity(num_clusters);
        for (cluster, positions) in clusters.iter().zip(&members) {
            let Some(&best) = positions
                .iter()
                .reduce(|best, p| if composite[*p] > composite[*best] { p } else { best })
            else {
                continue;
            };
            let scored = &gate.survivors[best];
            candidates.push(MiningCandidate {
                record: scored.record.clone(),
                cluster_id: cluster.id,
                cluster_size: positions.len(),
                novelty: novelty[best],
                coherence: scored.quality.coherence,
                coverage: scored.quality.coverage,
                composite: composite[best],
                quality: scored.quality,
                contributors: cluster.members.clone(),
            });
        }
        candidates.sort_by(|a, b| {
            b.composite
                .total_cmp(&a.composite)
                .then(a.cluster_id.cmp(&b.cluster_id))
        });
        if let Some(max) = self.config.max_candidates {
            candidates.truncate(max);
        }

        let high_novelty = candidates
            .iter()
            .filter(|c| c.novelty > self.config.high_novelty_threshold)
            .map(|c| c.cluster_id)
            .collect();

        let diversity_score = if n == 0 {
            0.0
        } else {
            num_clusters as f64 / n as f64
        };

        let consensus_baseline = if self.config.include_consensus_baseline && n > 0 {
            let records: Vec<StructuredRecord> =
                gate.survivors.iter().map(|s| s.record.clone()).collect();
            ConsensusAggregator::new(self.aggregation.clone())
                .aggregate(schema, &records)
                .ok()
        } else {
            None
        };

        info!(
            "Mined {} clusters from {} survivors ({} tier)",
            num_clusters, n, tier
        );

        Mining {
            candidates,
            clusters,
            num_clusters,
            diversity_score,
            effective_diversity: diversity_score * pass_rate,
            quality_pass_rate: pass_rate,
            separation: if tier == ClusteringTier::Density {
                clustering.separation
            } else {
                None
            },
            tier,
            high_novelty,
            consensus_baseline,
            samples_passed_quality: n,
        }
    }
}

/// Embeddings converted to f64, if there is one non-empty vector per survivor
/// and all share a dimension
fn usable_vectors(embeddings: Option<Vec<Vec<f32>>>, n: usize) -> Option<Vec<Vec<f64>>> {
    let embeddings = embeddings?;
    let dims = embeddings.first()?.len();
    if embeddings.len() != n || dims == 0 || embeddings.iter().any(|e| e.len() != dims) {
        return None;
    }
    Some(
        embeddings
            .into_iter()
            .map(|e| e.into_iter().map(f64::from).collect())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::FieldValue;
    use crate::schema::SchemaField;

    fn schema() -> Schema {
        Schema::new("approach")
            .with_field(SchemaField::text("summary"))
            .with_field(SchemaField::numeric("effort"))
    }

    fn good(index: usize, summary: &str) -> StructuredRecord {
        StructuredRecord::new(index)
            .with_value("summary", FieldValue::Text(summary.to_string()))
            .with_value("effort", FieldValue::Number(3.0))
    }

    fn junk(index: usize) -> StructuredRecord {
        StructuredRecord::new(index)
            .with_value("summary", FieldValue::Text("n/a".to_string()))
            .with_invalid("effort", "not a number: lots")
    }

    fn one_hot(group: usize, jitter: usize) -> Vec<f32> {
        let mut v = vec![0.0; 8];
        v[group] = 1.0;
        v[7] = jitter as f32 * 0.01;
        v
    }

    #[test]
    fn test_filter_pass_rate_counts_discarded() {
        let miner = DiversityMiner::new(MiningConfig::default()).unwrap();
        let records = vec![good(0, "a"), good(1, "b"), junk(2)];
        let gate = miner.filter(&schema(), "approach", records, 1).unwrap();
        assert_eq!(gate.survivors.len(), 2);
        assert_eq!(gate.rejected, vec![2]);
        assert_eq!(gate.total, 4);
        assert!((gate.pass_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_filter_insufficient() {
        let miner = DiversityMiner::new(MiningConfig::default()).unwrap();
        let err = miner
            .filter(&schema(), "approach", vec![good(0, "a"), junk(1)], 0)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientSamples {
                usable: 1,
                required: 2
            }
        );
    }

    #[cfg(feature = "hierarchical-clustering")]
    #[test]
    fn test_rank_six_clusters_one_singleton() {
        let config = MiningConfig::default().with_max_tier(ClusteringTier::Hierarchical);
        let miner = DiversityMiner::new(config).unwrap();

        let sizes = [5, 4, 4, 3, 3, 1];
        let mut records = Vec::new();
        let mut embeddings = Vec::new();
        let mut index = 0;
        for (group, &size) in sizes.iter().enumerate() {
            for k in 0..size {
                records.push(good(index, &format!("approach {group} variant {k}")));
                embeddings.push(one_hot(group, k));
                index += 1;
            }
        }
        for _ in 0..12 {
            records.push(junk(index));
            index += 1;
        }
        assert_eq!(records.len(), 32);

        let gate = miner.filter(&schema(), "approach", records, 0).unwrap();
        assert_eq!(gate.survivors.len(), 20);

        let mining = miner.rank(&schema(), gate, Some(embeddings));
        assert_eq!(mining.tier, ClusteringTier::Hierarchical);
        assert_eq!(mining.num_clusters, 6);
        assert_eq!(mining.candidates.len(), 6);
        assert_eq!(
            mining.candidates.iter().filter(|c| c.cluster_size == 1).count(),
            1
        );
        assert!(mining.separation.is_none());
        assert!((mining.quality_pass_rate - 20.0 / 32.0).abs() < 1e-12);
        assert!((mining.diversity_score - 0.3).abs() < 1e-12);
        assert!(mining
            .candidates
            .windows(2)
            .all(|w| w[0].composite >= w[1].composite));

        // clusters partition the survivors
        let mut covered: Vec<usize> = mining.clusters.iter().flat_map(|c| c.members.clone()).collect();
        covered.sort();
        assert_eq!(covered, (0..20).collect::<Vec<_>>());
    }

    #[cfg(feature = "density-clustering")]
    #[test]
    fn test_density_rank_six_clusters_one_singleton() {
        let miner = DiversityMiner::new(MiningConfig::default()).unwrap();

        let sizes = [5, 4, 4, 3, 3, 1];
        let mut records = Vec::new();
        let mut embeddings = Vec::new();
        let mut index = 0;
        for (group, &size) in sizes.iter().enumerate() {
            for k in 0..size {
                records.push(good(index, &format!("approach {group} variant {k}")));
                embeddings.push(one_hot(group, 0));
                index += 1;
            }
        }
        for _ in 0..12 {
            records.push(junk(index));
            index += 1;
        }

        let gate = miner.filter(&schema(), "approach", records, 0).unwrap();
        assert_eq!(gate.survivors.len(), 20);

        let mining = miner.rank(&schema(), gate, Some(embeddings));
        assert_eq!(mining.tier, ClusteringTier::Density);
        assert_eq!(mining.num_clusters, 6);
        assert_eq!(mining.candidates.len(), 6);
        assert_eq!(
            mining.candidates.iter().filter(|c| c.cluster_size == 1).count(),
            1
        );
        assert!(mining.separation.is_some());

        let mut sizes_found: Vec<usize> = mining.clusters.iter().map(|c| c.members.len()).collect();
        sizes_found.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(sizes_found, vec![5, 4, 4, 3, 3, 1]);
        let mut covered: Vec<usize> = mining.clusters.iter().flat_map(|c| c.members.clone()).collect();
        covered.sort();
        assert_eq!(covered, (0..20).collect::<Vec<_>>());
    }

    #[cfg(feature = "density-clustering")]
    #[test]
    fn test_density_rank_identical_answers() {
        let miner = DiversityMiner::new(MiningConfig::default()).unwrap();
        let records: Vec<StructuredRecord> =
            (0..6).map(|i| good(i, &format!("approach {i}"))).collect();

        // five identical embeddings and one distinct
        let mut embeddings = vec![one_hot(0, 0); 5];
        embeddings.push(one_hot(3, 0));
        let gate = miner.filter(&schema(), "approach", records.clone(), 0).unwrap();
        let mining = miner.rank(&schema(), gate, Some(embeddings));
        assert_eq!(mining.tier, ClusteringTier::Density);
        assert_eq!(mining.num_clusters, 2);
        assert_eq!(
            mining.candidates.iter().filter(|c| c.cluster_size == 1).count(),
            1
        );
        assert_eq!(
            mining.candidates.iter().filter(|c| c.cluster_size == 5).count(),
            1
        );

        // all identical
        let gate = miner.filter(&schema(), "approach", records, 0).unwrap();
        let mining = miner.rank(&schema(), gate, Some(vec![one_hot(2, 0); 6]));
        assert_eq!(mining.num_clusters, 1);
        assert_eq!(mining.candidates.len(), 1);
        assert_eq!(mining.candidates[0].cluster_size, 6);
    }

    #[test]
    fn test_rank_without_embeddings_degrades() {
        let miner = DiversityMiner::new(MiningConfig::default()).unwrap();
        let records = vec![good(0, "ship early"), good(1, "ship early"), good(2, "hire more")];
        let gate = miner.filter(&schema(), "approach", records, 0).unwrap();
        let mining = miner.rank(&schema(), gate, None);

        assert_eq!(mining.tier, ClusteringTier::Singleton);
        assert_eq!(mining.num_clusters, 3);
        assert_eq!(mining.diversity_score, 1.0);
        // the lexical odd one out is the most novel
        assert_eq!(mining.candidates[0].record.sample_index, 2);
        assert_eq!(mining.high_novelty, vec![2]);
        assert!(mining.consensus_baseline.is_some());
    }

    #[test]
    fn test_mismatched_embeddings_ignored() {
        assert!(usable_vectors(Some(vec![vec![1.0], vec![1.0, 2.0]]), 2).is_none());
        assert!(usable_vectors(Some(vec![vec![1.0]]), 2).is_none());
        assert!(usable_vectors(None, 0).is_none());
        assert_eq!(usable_vectors(Some(vec![vec![0.5]]), 1), Some(vec![vec![0.5]]));
    }

    #[test]
    fn test_max_candidates_truncates() {
        let config = MiningConfig::default().with_max_candidates(1);
        let miner = DiversityMiner::new(config).unwrap();
        let records = vec![good(0, "a b"), good(1, "c d"), good(2, "e f")];
        let gate = miner.filter(&schema(), "approach", records, 0).unwrap();
        assert_eq!(miner.rank(&schema(), gate, None).candidates.len(), 1);
    }

    struct Flat;

    impl CoherenceScorer for Flat {
        fn score(&self, _schema: &Schema, _record: &StructuredRecord) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_custom_coherence_scorer() {
        let miner = DiversityMiner::new(MiningConfig::default())
            .unwrap()
            .with_coherence_scorer(Flat);
        // coverage 1.0 and relevance 1.0 give 0.6 overall: still passes
        let gate = miner
            .filter(&schema(), "why", vec![good(0, "a"), good(1, "b")], 0)
            .unwrap();
        assert!(gate.survivors.iter().all(|s| s.quality.coherence == 0.0));
    }

    #[test]
    fn test_baseline_uses_configured_aggregation() {
        let records = vec![good(0, "a b"), good(1, "c d"), good(2, "e f")];

        let miner = DiversityMiner::new(MiningConfig::default()).unwrap();
        let gate = miner.filter(&schema(), "approach", records.clone(), 0).unwrap();
        let baseline = miner.rank(&schema(), gate, None).consensus_baseline.unwrap();
        assert_eq!(baseline.field_confidence("effort"), Some(0.5));

        let aggregation = AggregationConfig {
            small_sample_ceiling: 0.2,
            ..AggregationConfig::default()
        };
        let miner = DiversityMiner::new(MiningConfig::default())
            .unwrap()
            .with_aggregation(aggregation);
        let gate = miner.filter(&schema(), "approach", records.clone(), 0).unwrap();
        let baseline = miner.rank(&schema(), gate, None).consensus_baseline.unwrap();
        assert_eq!(baseline.field_confidence("effort"), Some(0.2));

        // too few survivors for the configured aggregator: no baseline
        let miner = DiversityMiner::new(MiningConfig::default())
            .unwrap()
            .with_aggregation(AggregationConfig::default().with_min_usable_samples(4));
        let gate = miner.filter(&schema(), "approach", records, 0).unwrap();
        assert!(miner.rank(&schema(), gate, None).consensus_baseline.is_none());
    }
}
