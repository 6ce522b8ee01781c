//! Per-record quality and candidate scores

use crate::extraction::{FieldValue, StructuredRecord};
use crate::schema::{FieldConstraint, Schema};
use crate::util::token_set;
use serde::Serialize;

/// Query words shorter than this are ignored for relevance
const MIN_CONTENT_WORD: usize = 4;

/// Internal consistency of a single record
///
/// Swappable: the miner takes any implementation.
pub trait CoherenceScorer: Send + Sync {
    /// Score in [0, 1]
    fn score(&self, schema: &Schema, record: &StructuredRecord) -> f64;
}

/// Share of attempted fields that parsed cleanly times the share of
/// applicable ordering constraints the record satisfies
pub struct ConstraintCoherence;

impl CoherenceScorer for ConstraintCoherence {
    fn score(&self, schema: &Schema, record: &StructuredRecord) -> f64 {
        let attempted = record.attempted_count();
        if attempted == 0 {
            return 0.0;
        }
        let parse_ratio = record.clean_count() as f64 / attempted as f64;

        let mut applicable = 0;
        let mut satisfied = 0;
        for constraint in &schema.constraints {
            match constraint {
                FieldConstraint::Ordered { lower, upper } => {
                    let lo = record.value(lower).and_then(FieldValue::as_number);
                    let hi = record.value(upper).and_then(FieldValue::as_number);
                    if let (Some(lo), Some(hi)) = (lo, hi) {
                        applicable += 1;
                        if lo <= hi {
                            satisfied += 1;
                        }
                    }
                }
            }
        }
        let constraint_ratio = if applicable == 0 {
            1.0
        } else {
            satisfied as f64 / applicable as f64
        };

        parse_ratio * constraint_ratio
    }
}

/// Fraction of required fields with a value; 1.0 when nothing is required
pub fn coverage(schema: &Schema, record: &StructuredRecord) -> f64 {
    let required: Vec<_> = schema.required_fields().collect();
    if required.is_empty() {
        return 1.0;
    }
    let present = required
        .iter()
        .filter(|f| record.value(&f.name).is_some())
        .count();
    present as f64 / required.len() as f64
}

/// Share of the query's content words that appear in the record
pub fn relevance(query: &str, record: &StructuredRecord) -> f64 {
    let words: Vec<String> = token_set(query)
        .into_iter()
        .filter(|w| w.chars().count() >= MIN_CONTENT_WORD)
        .collect();
    if words.is_empty() {
        return 1.0;
    }
    let text = token_set(&record.to_text());
    let hits = words.iter().filter(|w| text.contains(*w)).count();
    hits as f64 / words.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityScore {
    pub coherence: f64,
    pub coverage: f64,
    pub relevance: f64,
    pub overall: f64,
    pub passed: bool,
}

impl QualityScore {
    pub fn new(coherence: f64, coverage: f64, relevance: f64, threshold: f64) -> Self {
        let overall = 0.4 * coherence + 0.4 * coverage + 0.2 * relevance;
        Self {
            coherence,
            coverage,
            relevance,
            overall,
            passed: overall >= threshold,
        }
    }
}

/// Mean distance of each row to all others, scaled so the largest is 1.0.
///
/// A single item is maximally novel.
pub fn novelty(distances: &[Vec<f64>]) -> Vec<f64> {
    let n = distances.len();
    if n == 1 {
        return vec![1.0];
    }
    let means: Vec<f64> = distances
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, d)| d)
                .sum::<f64>()
                / (n - 1) as f64
        })
        .collect();
    let max = means.iter().copied().fold(0.0, f64::max);
    if max <= 0.0 {
        return vec![0.0; n];
    }
    means.into_iter().map(|m| m / max).collect()
}
