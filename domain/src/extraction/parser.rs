//! Raw text → [`StructuredRecord`] per schema
//!
//! Accepts JSON (optionally fenced, optionally wrapped in prose or an array)
//! and falls back to `field: value` lines when no JSON object is found.

use super::record::{FieldStatus, FieldValue, StructuredRecord};
use crate::sampling::RawSample;
use crate::schema::{FieldKind, Schema, SchemaField};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::debug;

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").expect("numeric grammar is valid"));

/// Records extracted from a sample set
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Usable records, ordered by sample index
    pub records: Vec<StructuredRecord>,
    /// Completed samples whose record had no usable field
    pub discarded: Vec<usize>,
    /// Samples whose generation call failed
    pub failed: Vec<usize>,
}

impl Extraction {
    /// Completed samples, usable or not
    pub fn completed(&self) -> usize {
        self.records.len() + self.discarded.len()
    }
}

/// Schema-guided parser
pub struct SchemaExtractor<'a> {
    schema: &'a Schema,
}

impl<'a> SchemaExtractor<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Extract every sample, dropping failed calls and empty records.
    pub fn extract_all(&self, samples: &[RawSample]) -> Extraction {
        let mut extraction = Extraction::default();
        let mut ordered: Vec<&RawSample> = samples.iter().collect();
        ordered.sort_by_key(|s| s.index);

        for sample in ordered {
            let Some(text) = sample.text() else {
                extraction.failed.push(sample.index);
                continue;
            };
            let record = self.extract_text(sample.index, text);
            if record.is_empty() {
                debug!("Sample {} produced no usable fields; discarding", sample.index);
                extraction.discarded.push(sample.index);
            } else {
                extraction.records.push(record);
            }
        }
        extraction
    }

    /// Parse one response. Fields that cannot be read are marked, never dropped.
    pub fn extract_text(&self, sample_index: usize, text: &str) -> StructuredRecord {
        let object = find_json_object(text).unwrap_or_else(|| self.parse_lines(text));

        let mut record = StructuredRecord::new(sample_index);
        for field in &self.schema.fields {
            let raw = lookup(&object, &field.name);
            let (status, value) = parse_field(field, raw);
            record.set(field.name.clone(), status, value);
        }
        record
    }

    /// `field: value` lines; list fields also take following `- item` bullets
    fn parse_lines(&self, text: &str) -> Map<String, Value> {
        let mut object = Map::new();
        let mut open_list: Option<String> = None;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(list_field) = &open_list
                && let Some(item) = bullet_item(trimmed)
            {
                if let Some(Value::Array(items)) = object.get_mut(list_field) {
                    items.push(Value::String(item.to_string()));
                }
                continue;
            }
            open_list = None;

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = normalize_key(key);
            let Some(field) = self
                .schema
                .fields
                .iter()
                .find(|f| f.name.eq_ignore_ascii_case(&key))
            else {
                continue;
            };
            let value = value.trim();

            if field.kind == FieldKind::List && value.is_empty() {
                object.insert(field.name.clone(), Value::Array(Vec::new()));
                open_list = Some(field.name.clone());
            } else {
                object.insert(field.name.clone(), Value::String(value.to_string()));
            }
        }
        object
    }
}

fn normalize_key(key: &str) -> String {
    key.trim()
        .trim_start_matches(['-', '*', ' '])
        .trim_matches('*')
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

fn bullet_item(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn lookup<'v>(object: &'v Map<String, Value>, name: &str) -> Option<&'v Value> {
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

/// First JSON object in `text`, looking inside code fences first.
fn find_json_object(text: &str) -> Option<Map<String, Value>> {
    let fenced = strip_code_fence(text);
    first_object(fenced).or_else(|| first_object(text))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(start) = text.find("```") else {
        return text;
    };
    let after = &text[start + 3..];
    // skip the language tag line
    let body = after.find('\n').map_or(after, |nl| &after[nl + 1..]);
    match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

fn first_object(text: &str) -> Option<Map<String, Value>> {
    for (pos, ch) in text.char_indices() {
        if ch != '{' && ch != '[' {
            continue;
        }
        let mut stream = serde_json::Deserializer::from_str(&text[pos..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => return Some(map),
            Some(Ok(Value::Array(items))) => {
                if let Some(map) = items.into_iter().find_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                }) {
                    return Some(map);
                }
            }
            _ => {}
        }
    }
    None
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_field(field: &SchemaField, raw: Option<&Value>) -> (FieldStatus, Option<FieldValue>) {
    let raw = match raw {
        None | Some(Value::Null) => return (FieldStatus::Missing, None),
        Some(Value::String(s)) if s.trim().is_empty() => return (FieldStatus::Missing, None),
        Some(raw) => raw,
    };

    match field.kind {
        FieldKind::Numeric => parse_numeric(raw),
        FieldKind::Categorical => match scalar_text(raw) {
            Some(text) => match field.match_category(&text) {
                Some(canonical) => (
                    FieldStatus::Parsed,
                    Some(FieldValue::Category(canonical.to_string())),
                ),
                None => (FieldStatus::LowConfidence, Some(FieldValue::Category(text))),
            },
            None => invalid("expected a category name"),
        },
        FieldKind::Text => match scalar_text(raw) {
            Some(text) => (FieldStatus::Parsed, Some(FieldValue::Text(text))),
            None => invalid("expected text"),
        },
        FieldKind::List => parse_list(raw),
    }
}

fn parse_numeric(raw: &Value) -> (FieldStatus, Option<FieldValue>) {
    match raw {
        Value::Number(n) => match n.as_f64().filter(|v| v.is_finite()) {
            Some(v) => (FieldStatus::Parsed, Some(FieldValue::Number(v))),
            None => invalid("number out of range"),
        },
        Value::String(s) => {
            let s = s.trim();
            if NUMERIC.is_match(s)
                && let Ok(v) = s.parse::<f64>()
            {
                (FieldStatus::Parsed, Some(FieldValue::Number(v)))
            } else {
                invalid(format!("not a number: {s}"))
            }
        }
        _ => invalid("expected a number"),
    }
}

fn parse_list(raw: &Value) -> (FieldStatus, Option<FieldValue>) {
    match raw {
        Value::Array(items) => {
            let parsed: Vec<String> = items
                .iter()
                .filter_map(scalar_text)
                .filter(|s| !s.is_empty())
                .collect();
            if parsed.is_empty() && !items.is_empty() {
                return invalid("list items must be text");
            }
            (FieldStatus::Parsed, Some(FieldValue::List(parsed)))
        }
        Value::String(s) => {
            let items: Vec<String> = s
                .split([';', '\n'])
                .map(|item| bullet_item(item.trim()).unwrap_or(item.trim()).to_string())
                .filter(|item| !item.is_empty())
                .collect();
            (FieldStatus::Parsed, Some(FieldValue::List(items)))
        }
        _ => invalid("expected a list"),
    }
}

fn invalid(reason: impl Into<String>) -> (FieldStatus, Option<FieldValue>) {
    (FieldStatus::Invalid(reason.into()), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin;

    fn risk_record(text: &str) -> StructuredRecord {
        let schema = builtin::risk();
        SchemaExtractor::new(&schema).extract_text(0, text)
    }

    #[test]
    fn test_plain_json() {
        let record = risk_record(
            r#"{"description": "Vendor slip", "category": "schedule", "probability": 4,
                "impact": "3", "mitigation": "Weekly check-ins"}"#,
        );
        assert_eq!(record.value("probability"), Some(&FieldValue::Number(4.0)));
        assert_eq!(record.value("impact"), Some(&FieldValue::Number(3.0)));
        assert_eq!(
            record.value("category"),
            Some(&FieldValue::Category("Schedule".into()))
        );
        assert_eq!(record.status("owner"), &FieldStatus::Missing);
    }

    #[test]
    fn test_fenced_json_with_prose() {
        let text = "Here is my answer:\n```json\n{\"description\": \"Skills gap\", \"probability\": 2}\n```\nThanks";
        let record = risk_record(text);
        assert_eq!(record.value("probability"), Some(&FieldValue::Number(2.0)));
        assert_eq!(
            record.value("description"),
            Some(&FieldValue::Text("Skills gap".into()))
        );
    }

    #[test]
    fn test_array_uses_first_object() {
        let record = risk_record(r#"[{"probability": 5}, {"probability": 1}]"#);
        assert_eq!(record.value("probability"), Some(&FieldValue::Number(5.0)));
    }

    #[test]
    fn test_numeric_grammar_fails_only_that_field() {
        let record = risk_record(r#"{"probability": "about 4", "impact": "-2.5", "description": "x"}"#);
        assert!(matches!(record.status("probability"), FieldStatus::Invalid(_)));
        assert_eq!(record.value("impact"), Some(&FieldValue::Number(-2.5)));
        assert!(record.value("description").is_some());

        let record = risk_record(r#"{"probability": "4.", "impact": "1e3"}"#);
        assert!(matches!(record.status("probability"), FieldStatus::Invalid(_)));
        assert!(matches!(record.status("impact"), FieldStatus::Invalid(_)));
    }

    #[test]
    fn test_unrecognized_category_kept_low_confidence() {
        let record = risk_record(r#"{"category": "Political"}"#);
        assert_eq!(record.status("category"), &FieldStatus::LowConfidence);
        assert_eq!(
            record.value("category"),
            Some(&FieldValue::Category("Political".into()))
        );
    }

    #[test]
    fn test_empty_list_distinct_from_missing() {
        let schema = builtin::estimate();
        let extractor = SchemaExtractor::new(&schema);
        let record = extractor.extract_text(0, r#"{"value": 10, "assumptions": []}"#);
        assert_eq!(record.value("assumptions"), Some(&FieldValue::List(vec![])));

        let record = extractor.extract_text(0, r#"{"value": 10}"#);
        assert_eq!(record.status("assumptions"), &FieldStatus::Missing);
    }

    #[test]
    fn test_line_fallback() {
        let schema = builtin::estimate();
        let text = "Value: 12\nUnit: days\n**Range Low**: 8\nAssumptions:\n- team of four\n- no holidays\nNotes: ignored";
        let record = SchemaExtractor::new(&schema).extract_text(1, text);
        assert_eq!(record.value("value"), Some(&FieldValue::Number(12.0)));
        assert_eq!(record.value("range_low"), Some(&FieldValue::Number(8.0)));
        assert_eq!(record.value("unit"), Some(&FieldValue::Text("days".into())));
        assert_eq!(
            record.value("assumptions"),
            Some(&FieldValue::List(vec!["team of four".into(), "no holidays".into()]))
        );
    }

    #[test]
    fn test_list_from_semicolon_string() {
        let schema = builtin::milestone();
        let record = SchemaExtractor::new(&schema)
            .extract_text(0, r#"{"deliverables": "design doc; prototype ;"}"#);
        assert_eq!(
            record.value("deliverables"),
            Some(&FieldValue::List(vec!["design doc".into(), "prototype".into()]))
        );
    }

    #[test]
    fn test_extract_all_discards_and_fails() {
        let schema = builtin::risk();
        let samples = vec![
            RawSample::completed(2, r#"{"probability": 3}"#, 0.7),
            RawSample::failed(1, "timeout", 0.7),
            RawSample::completed(0, "I cannot answer that.", 0.7),
        ];
        let extraction = SchemaExtractor::new(&schema).extract_all(&samples);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].sample_index, 2);
        assert_eq!(extraction.discarded, vec![0]);
        assert_eq!(extraction.failed, vec![1]);
        assert_eq!(extraction.completed(), 2);
    }
}
