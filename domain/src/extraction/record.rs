//! Typed per-sample records

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A parsed field value, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Category(String),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Category(s) | FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Category(s) | FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::List(items) => write!(f, "{}", items.join("; ")),
        }
    }
}

/// Parse outcome of one field in one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum FieldStatus {
    Parsed,
    /// Categorical text outside the allowed set, kept as free text
    LowConfidence,
    Missing,
    Invalid(String),
}

impl FieldStatus {
    /// True when the field carries a usable value
    pub fn is_present(&self) -> bool {
        matches!(self, FieldStatus::Parsed | FieldStatus::LowConfidence)
    }
}

/// One sample's typed answer
///
/// Every schema field has a status; only present fields have a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredRecord {
    pub sample_index: usize,
    values: BTreeMap<String, FieldValue>,
    status: BTreeMap<String, FieldStatus>,
}

impl StructuredRecord {
    pub fn new(sample_index: usize) -> Self {
        Self {
            sample_index,
            values: BTreeMap::new(),
            status: BTreeMap::new(),
        }
    }

    /// Record a cleanly parsed value
    pub fn with_value(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.set(field, FieldStatus::Parsed, Some(value));
        self
    }

    /// Record categorical text outside the allowed set
    pub fn with_unrecognized(mut self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.set(
            field,
            FieldStatus::LowConfidence,
            Some(FieldValue::Category(text.into())),
        );
        self
    }

    pub fn with_invalid(mut self, field: impl Into<String>, reason: impl Into<String>) -> Self {
        self.set(field, FieldStatus::Invalid(reason.into()), None);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, status: FieldStatus, value: Option<FieldValue>) {
        let field = field.into();
        match value {
            Some(value) if status.is_present() => {
                self.values.insert(field.clone(), value);
            }
            _ => {
                self.values.remove(&field);
            }
        }
        self.status.insert(field, status);
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Status of a field; fields never touched report `Missing`
    pub fn status(&self, field: &str) -> &FieldStatus {
        self.status.get(field).unwrap_or(&FieldStatus::Missing)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields with a usable value
    pub fn present_count(&self) -> usize {
        self.values.len()
    }

    /// Fields the sample attempted: present or invalid, not missing
    pub fn attempted_count(&self) -> usize {
        self.status
            .values()
            .filter(|s| !matches!(s, FieldStatus::Missing))
            .count()
    }

    pub fn clean_count(&self) -> usize {
        self.status
            .values()
            .filter(|s| matches!(s, FieldStatus::Parsed))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flattened `field: value` text, used for embeddings and relevance
    pub fn to_text(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
