//! Consensus outputs

use super::review::ReviewLevel;
use super::stats::NumericSummary;
use crate::extraction::FieldValue;
use crate::sampling::TokenUsage;
use crate::schema::FieldKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// A numeric value outside the Tukey fences
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub sample_index: usize,
    pub field: String,
    pub consensus_value: f64,
    pub outlier_value: f64,
    /// |value - median| / (max - min), clamped to [0, 1]
    pub divergence: f64,
    pub reason: String,
}

/// Consensus for one schema field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldConsensus {
    pub field: String,
    pub kind: FieldKind,
    /// `None` when no sample produced the field
    pub value: Option<FieldValue>,
    pub confidence: f64,
    pub present_count: usize,
    /// First sample whose value equals the consensus value
    pub source_sample: Option<usize>,
    /// False when a categorical consensus is outside the allowed set
    pub recognized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<NumericSummary>,
}

/// Aggregate answer over a set of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consensus {
    /// Consensus value per field that had at least one present value
    pub values: BTreeMap<String, FieldValue>,
    pub fields: BTreeMap<String, FieldConsensus>,
    pub confidence: f64,
    pub review_level: ReviewLevel,
    pub review_reason: Option<String>,
    pub outliers: Vec<OutlierReport>,
    pub records_used: usize,
}

impl Consensus {
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn field_confidence(&self, field: &str) -> Option<f64> {
        self.fields.get(field).map(|f| f.confidence)
    }
}

/// Consensus plus the metrics of the sampling run that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusResult {
    #[serde(flatten)]
    pub consensus: Consensus,
    pub samples_requested: usize,
    /// Calls that completed or failed; never exceeds `samples_requested`
    pub samples_used: usize,
    pub samples_failed: usize,
    pub records_discarded: usize,
    pub early_stopped: bool,
    pub budget_exhausted: bool,
    pub cost_usd: f64,
    pub cost_saved_usd: f64,
    pub tokens_used: TokenUsage,
    pub latency_ms: u64,
}

impl ConsensusResult {
    pub fn confidence(&self) -> f64 {
        self.consensus.confidence
    }

    pub fn review_level(&self) -> ReviewLevel {
        self.consensus.review_level
    }

    pub fn outliers(&self) -> &[OutlierReport] {
        &self.consensus.outliers
    }
}
