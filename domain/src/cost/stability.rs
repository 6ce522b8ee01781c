//! Early-stop predicates

use crate::consensus::{AggregationConfig, ConsensusAggregator};
use crate::extraction::SchemaExtractor;
use crate::sampling::RawSample;
use crate::schema::Schema;
use tracing::debug;

/// Decides, after each batch, whether enough agreement has been reached
pub trait StabilityPredicate: Send + Sync {
    fn is_stable(&self, samples: &[RawSample]) -> bool;
}

/// Never stops early. Used for exploration runs.
pub struct NeverStable;

impl StabilityPredicate for NeverStable {
    fn is_stable(&self, _samples: &[RawSample]) -> bool {
        false
    }
}

/// Stable once the provisional consensus confidence meets a threshold
pub struct ConfidenceStability {
    schema: Schema,
    aggregator: ConsensusAggregator,
    threshold: f64,
    min_records: usize,
}

impl ConfidenceStability {
    pub fn new(schema: Schema, config: AggregationConfig, threshold: f64, min_records: usize) -> Self {
        Self {
            schema,
            aggregator: ConsensusAggregator::new(config),
            threshold,
            min_records,
        }
    }

    /// Provisional confidence over the samples collected so far, if enough records parsed
    pub fn confidence(&self, samples: &[RawSample]) -> Option<f64> {
        let extraction = SchemaExtractor::new(&self.schema).extract_all(samples);
        if extraction.records.len() < self.min_records.max(1) {
            return None;
        }
        Some(
            self.aggregator
                .provisional_confidence(&self.schema, &extraction.records),
        )
    }
}

impl StabilityPredicate for ConfidenceStability {
    fn is_stable(&self, samples: &[RawSample]) -> bool {
        match self.confidence(samples) {
            Some(confidence) => {
                debug!(
                    "Provisional confidence {:.3} after {} samples (threshold {:.2})",
                    confidence,
                    samples.len(),
                    self.threshold
                );
                confidence >= self.threshold
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaField;

    fn schema() -> Schema {
        Schema::new("s")
            .with_field(SchemaField::categorical("severity", ["High", "Low"]))
            .with_field(SchemaField::numeric("score"))
    }

    fn agreeing(n: usize) -> Vec<RawSample> {
        (0..n)
            .map(|i| RawSample::completed(i, r#"{"severity": "High", "score": 3}"#, 0.7))
            .collect()
    }

    #[test]
    fn test_agreeing_batch_is_stable() {
        let predicate = ConfidenceStability::new(schema(), AggregationConfig::default(), 0.6, 2);
        // categorical 1.0, numeric capped at 0.5
        assert_eq!(predicate.confidence(&agreeing(2)), Some(0.75));
        assert!(predicate.is_stable(&agreeing(2)));
    }

    #[test]
    fn test_min_records_guard() {
        let predicate = ConfidenceStability::new(schema(), AggregationConfig::default(), 0.6, 2);
        assert!(!predicate.is_stable(&agreeing(1)));
        let failed = vec![RawSample::failed(0, "boom", 0.7), RawSample::failed(1, "boom", 0.7)];
        assert!(!predicate.is_stable(&failed));
    }

    #[test]
    fn test_never_stable() {
        assert!(!NeverStable.is_stable(&agreeing(5)));
    }
}
