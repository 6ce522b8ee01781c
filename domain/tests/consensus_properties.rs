//! Property-based tests for the consensus aggregator and extractor.
//!
//! # Running
//!
//! ```bash
//! cargo test -p concord-domain --test consensus_properties
//! PROPTEST_CASES=10000 cargo test -p concord-domain --test consensus_properties
//! ```

use proptest::prelude::*;

use concord_domain::{
    AggregationConfig, ConsensusAggregator, FieldValue, Schema, SchemaExtractor, SchemaField,
    StructuredRecord,
};

// =============================================================================
// Helpers
// =============================================================================

fn numeric_schema() -> Schema {
    Schema::new("numeric").with_field(SchemaField::numeric("value"))
}

fn mixed_schema() -> Schema {
    Schema::new("mixed")
        .with_field(SchemaField::numeric("value"))
        .with_field(SchemaField::categorical("level", ["High", "Medium", "Low"]))
        .with_field(SchemaField::text("note").optional())
}

fn numeric_records(values: &[f64]) -> Vec<StructuredRecord> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| StructuredRecord::new(i).with_value("value", FieldValue::Number(*v)))
        .collect()
}

fn value_confidence(values: &[f64]) -> f64 {
    ConsensusAggregator::default()
        .aggregate(&numeric_schema(), &numeric_records(values))
        .map(|c| c.field_confidence("value").unwrap_or(0.0))
        .unwrap_or(0.0)
}

// =============================================================================
// Strategies
// =============================================================================

fn mixed_record(index: usize) -> impl Strategy<Value = StructuredRecord> {
    (
        proptest::option::of(-50i32..50),
        proptest::option::of(prop_oneof![
            Just("High"),
            Just("Medium"),
            Just("Low"),
            Just("Unknown")
        ]),
        proptest::option::of("[a-z]{1,8}( [a-z]{1,8}){0,4}"),
    )
        .prop_map(move |(value, level, note)| {
            let mut record = StructuredRecord::new(index);
            if let Some(v) = value {
                record = record.with_value("value", FieldValue::Number(v as f64));
            }
            if let Some(level) = level {
                record = if level == "Unknown" {
                    record.with_unrecognized("level", level)
                } else {
                    record.with_value("level", FieldValue::Category(level.to_string()))
                };
            }
            if let Some(note) = note {
                record = record.with_value("note", FieldValue::Text(note));
            }
            record
        })
}

fn mixed_records() -> impl Strategy<Value = Vec<StructuredRecord>> {
    (2usize..12).prop_flat_map(|n| (0..n).map(mixed_record).collect::<Vec<_>>())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn median_lies_within_observed_range(values in proptest::collection::vec(-1.0e6f64..1.0e6, 2..30)) {
        let consensus = ConsensusAggregator::default()
            .aggregate(&numeric_schema(), &numeric_records(&values))
            .unwrap();
        let median = consensus.value("value").and_then(FieldValue::as_number).unwrap();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(median >= min && median <= max);
        prop_assert!(values.contains(&median));
    }

    #[test]
    fn confidence_non_increasing_with_outliers(n in 8usize..24, base in 1u32..100) {
        let base = base as f64;
        // keep outliers a minority so Q3 stays on the base value
        let max_outliers = n - 2 - (0.75 * (n - 1) as f64).floor() as usize;
        let mut previous = f64::INFINITY;
        for k in 0..=max_outliers {
            let mut values = vec![base; n];
            for slot in values.iter_mut().take(k) {
                *slot = base * 10.0;
            }
            let confidence = value_confidence(&values);
            prop_assert!(confidence <= previous, "k={} conf={} prev={}", k, confidence, previous);
            previous = confidence;
        }
    }

    #[test]
    fn aggregation_is_idempotent(records in mixed_records()) {
        let aggregator = ConsensusAggregator::new(AggregationConfig::default().with_min_usable_samples(1));
        let first = aggregator.aggregate(&mixed_schema(), &records).unwrap();
        let second = aggregator.aggregate(&mixed_schema(), &records).unwrap();
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn consensus_values_are_never_fabricated(records in mixed_records()) {
        let aggregator = ConsensusAggregator::new(AggregationConfig::default().with_min_usable_samples(1));
        let consensus = aggregator.aggregate(&mixed_schema(), &records).unwrap();
        for (field, value) in &consensus.values {
            prop_assert!(
                records.iter().any(|r| r.value(field) == Some(value)),
                "{} = {:?} not found in any record", field, value
            );
        }
        prop_assert!(consensus.confidence >= 0.0 && consensus.confidence <= 1.0);
    }

    #[test]
    fn three_values_never_flag_outliers(a in -100i32..100, b in -100i32..100, c in -1000i32..1000) {
        let consensus = ConsensusAggregator::default()
            .aggregate(&numeric_schema(), &numeric_records(&[a as f64, b as f64, c as f64]))
            .unwrap();
        prop_assert!(consensus.outliers.is_empty());
    }

    #[test]
    fn one_tenfold_value_in_five_is_one_outlier(base in 1u32..1000, position in 0usize..5) {
        let base = base as f64;
        let mut values = vec![base; 5];
        values[position] = base * 10.0;
        let consensus = ConsensusAggregator::default()
            .aggregate(&numeric_schema(), &numeric_records(&values))
            .unwrap();
        prop_assert_eq!(consensus.outliers.len(), 1);
        prop_assert_eq!(consensus.outliers[0].sample_index, position);
    }

    #[test]
    fn extractor_never_panics(text in "\\PC{0,200}") {
        let schema = mixed_schema();
        let record = SchemaExtractor::new(&schema).extract_text(0, &text);
        prop_assert!(record.present_count() <= schema.fields.len());
    }
}
