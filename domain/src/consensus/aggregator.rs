//! Self-consistency aggregation
//!
//! Collapses N records into one answer. Numeric fields take the median with
//! IQR outlier detection, categorical fields the mode, text and list fields
//! the medoid. Every consensus value is copied from a contributing record.

use super::config::AggregationConfig;
use super::result::{Consensus, FieldConsensus, OutlierReport};
use super::review::ReviewLevel;
use super::stats::NumericSummary;
use crate::core::error::DomainError;
use crate::extraction::{FieldStatus, FieldValue, StructuredRecord};
use crate::schema::{FieldKind, Schema, SchemaField};
use crate::util::{jaccard, token_set};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Confidence given to a text or list consensus backed by a single sample
const SINGLE_VALUE_CONFIDENCE: f64 = 0.5;

pub struct ConsensusAggregator {
    config: AggregationConfig,
}

impl Default for ConsensusAggregator {
    fn default() -> Self {
        Self::new(AggregationConfig::default())
    }
}

impl ConsensusAggregator {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Aggregate `records` against `schema`.
    ///
    /// Fails with [`DomainError::InsufficientSamples`] when fewer than
    /// `min_usable_samples` records are supplied.
    pub fn aggregate(
        &self,
        schema: &Schema,
        records: &[StructuredRecord],
    ) -> Result<Consensus, DomainError> {
        if records.len() < self.config.min_usable_samples {
            return Err(DomainError::InsufficientSamples {
                usable: records.len(),
                required: self.config.min_usable_samples,
            });
        }
        Ok(self.build(schema, records))
    }

    /// Overall confidence over whatever has been collected so far.
    ///
    /// Used by the early-stop predicate; never fails and yields 0 for no records.
    pub fn provisional_confidence(&self, schema: &Schema, records: &[StructuredRecord]) -> f64 {
        if records.is_empty() {
            return 0.0;
        }
        self.build(schema, records).confidence
    }

    fn build(&self, schema: &Schema, records: &[StructuredRecord]) -> Consensus {
        let mut ordered: Vec<&StructuredRecord> = records.iter().collect();
        ordered.sort_by_key(|r| r.sample_index);

        let mut values = BTreeMap::new();
        let mut fields = BTreeMap::new();
        let mut outliers = Vec::new();
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for field in &schema.fields {
            let (consensus, field_outliers) = match field.kind {
                FieldKind::Numeric => self.numeric(field, &ordered),
                FieldKind::Categorical => (self.categorical(field, &ordered), Vec::new()),
                FieldKind::Text | FieldKind::List => (medoid(field, &ordered), Vec::new()),
            };

            let weight = self
                .config
                .field_weights
                .get(&field.name)
                .copied()
                .unwrap_or(field.weight);
            if consensus.present_count > 0 {
                weighted += weight * consensus.confidence;
                total_weight += weight;
            } else if field.required {
                total_weight += weight;
            }

            if let Some(value) = &consensus.value {
                values.insert(field.name.clone(), value.clone());
            }
            outliers.extend(field_outliers);
            fields.insert(field.name.clone(), consensus);
        }

        let confidence = if total_weight > 0.0 {
            (weighted / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let review_level = ReviewLevel::assess(confidence, outliers.len());
        let review_reason = review_reason(review_level, confidence, &outliers, &fields);

        debug!(
            "Consensus over {} records: confidence {:.3}, {} outliers",
            ordered.len(),
            confidence,
            outliers.len()
        );

        Consensus {
            values,
            fields,
            confidence,
            review_level,
            review_reason,
            outliers,
            records_used: ordered.len(),
        }
    }

    fn numeric(
        &self,
        field: &SchemaField,
        records: &[&StructuredRecord],
    ) -> (FieldConsensus, Vec<OutlierReport>) {
        let present: Vec<(usize, f64)> = records
            .iter()
            .filter_map(|r| {
                r.value(&field.name)
                    .and_then(FieldValue::as_number)
                    .map(|v| (r.sample_index, v))
            })
            .collect();
        let raw: Vec<f64> = present.iter().map(|(_, v)| *v).collect();

        let Some(summary) = NumericSummary::from_values(&raw) else {
            return (absent(field), Vec::new());
        };

        let mut outliers = Vec::new();
        let confidence = if present.len() < self.config.min_outlier_samples {
            self.config.small_sample_ceiling
        } else {
            let (lower, upper) = summary.fences(self.config.iqr_multiplier);
            let range = if summary.range() > 0.0 {
                summary.range()
            } else {
                1.0
            };
            for &(sample_index, value) in &present {
                if value >= lower && value <= upper {
                    continue;
                }
                let reason = if value < lower {
                    format!(
                        "{} value {} is below lower bound {:.2} (Q1 - {}*IQR)",
                        field.name, value, lower, self.config.iqr_multiplier
                    )
                } else {
                    format!(
                        "{} value {} is above upper bound {:.2} (Q3 + {}*IQR)",
                        field.name, value, upper, self.config.iqr_multiplier
                    )
                };
                outliers.push(OutlierReport {
                    sample_index,
                    field: field.name.clone(),
                    consensus_value: summary.median,
                    outlier_value: value,
                    divergence: ((value - summary.median).abs() / range).min(1.0),
                    reason,
                });
            }
            1.0 - outliers.len() as f64 / present.len() as f64
        };

        let source_sample = present
            .iter()
            .find(|(_, v)| *v == summary.median)
            .map(|(i, _)| *i);

        let consensus = FieldConsensus {
            field: field.name.clone(),
            kind: field.kind,
            value: Some(FieldValue::Number(summary.median)),
            confidence,
            present_count: present.len(),
            source_sample,
            recognized: true,
            summary: Some(summary),
        };
        (consensus, outliers)
    }

    fn categorical(&self, field: &SchemaField, records: &[&StructuredRecord]) -> FieldConsensus {
        // (value, count, first sample, recognized)
        let mut tally: Vec<(&str, usize, usize, bool)> = Vec::new();
        let mut present = 0;

        for record in records {
            let Some(value) = record.value(&field.name).and_then(FieldValue::as_str) else {
                continue;
            };
            present += 1;
            let recognized = matches!(record.status(&field.name), FieldStatus::Parsed);
            match tally.iter_mut().find(|(v, ..)| *v == value) {
                Some(entry) => {
                    entry.1 += 1;
                    entry.3 |= recognized;
                }
                None => tally.push((value, 1, record.sample_index, recognized)),
            }
        }

        // first-seen wins ties: tally is in sample order and max_by keeps the last max
        let Some(&(value, count, first, recognized)) = tally
            .iter()
            .rev()
            .max_by_key(|(_, count, ..)| *count)
        else {
            return absent(field);
        };

        let mut confidence = count as f64 / present as f64;
        if !recognized {
            confidence *= self.config.unrecognized_category_penalty;
        }

        FieldConsensus {
            field: field.name.clone(),
            kind: field.kind,
            value: Some(FieldValue::Category(value.to_string())),
            confidence,
            present_count: present,
            source_sample: Some(first),
            recognized,
            summary: None,
        }
    }
}

fn absent(field: &SchemaField) -> FieldConsensus {
    FieldConsensus {
        field: field.name.clone(),
        kind: field.kind,
        value: None,
        confidence: 0.0,
        present_count: 0,
        source_sample: None,
        recognized: true,
        summary: None,
    }
}

fn tokens(value: &FieldValue) -> BTreeSet<String> {
    match value {
        FieldValue::List(items) => items.iter().flat_map(|item| token_set(item)).collect(),
        other => token_set(&other.to_string()),
    }
}

/// The present value with the highest mean token overlap with the others
fn medoid(field: &SchemaField, records: &[&StructuredRecord]) -> FieldConsensus {
    let present: Vec<(usize, &FieldValue)> = records
        .iter()
        .filter_map(|r| r.value(&field.name).map(|v| (r.sample_index, v)))
        .collect();

    let (best, confidence) = match present.len() {
        0 => return absent(field),
        1 => (0, SINGLE_VALUE_CONFIDENCE),
        n => {
            let sets: Vec<BTreeSet<String>> = present.iter().map(|(_, v)| tokens(v)).collect();
            let mut best = (0, f64::MIN);
            for i in 0..n {
                let total: f64 = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| jaccard(&sets[i], &sets[j]))
                    .sum();
                let mean = total / (n - 1) as f64;
                if mean > best.1 {
                    best = (i, mean);
                }
            }
            best
        }
    };

    let (source, value) = present[best];
    FieldConsensus {
        field: field.name.clone(),
        kind: field.kind,
        value: Some(value.clone()),
        confidence: confidence.clamp(0.0, 1.0),
        present_count: present.len(),
        source_sample: Some(source),
        recognized: true,
        summary: None,
    }
}

fn review_reason(
    level: ReviewLevel,
    confidence: f64,
    outliers: &[OutlierReport],
    fields: &BTreeMap<String, FieldConsensus>,
) -> Option<String> {
    match level {
        ReviewLevel::None => None,
        ReviewLevel::SpotCheck => Some(format!(
            "good confidence ({confidence:.2}), spot check recommended"
        )),
        ReviewLevel::DetailedReview => {
            let low: Vec<&str> = fields
                .values()
                .filter(|f| f.present_count > 0 && f.confidence < 0.5)
                .map(|f| f.field.as_str())
                .collect();
            let mut reason = format!("moderate confidence ({confidence:.2})");
            if !low.is_empty() {
                reason.push_str(&format!("; low confidence on: {}", low.join(", ")));
            }
            Some(reason)
        }
        ReviewLevel::ExpertRequired => {
            let mut reasons = Vec::new();
            if !outliers.is_empty() {
                reasons.push(format!("{} outlier(s) detected", outliers.len()));
            }
            if confidence < ReviewLevel::DETAILED_THRESHOLD {
                reasons.push(format!("low overall confidence ({confidence:.2})"));
            }
            Some(reasons.join("; "))
        }
    }
}
