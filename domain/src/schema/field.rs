//! Schema field declarations

use serde::{Deserialize, Serialize};

/// Aggregation kind of a schema field
///
/// A closed set: every field is exactly one of these and the tag decides
/// both how raw text is parsed and how samples are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Signed integer or decimal; aggregated by median with IQR outliers
    Numeric,
    /// One of a declared allowed set; aggregated by mode
    Categorical,
    /// Free text; aggregated by medoid
    Text,
    /// Ordered sequence of text items; aggregated by medoid
    List,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Numeric => "numeric",
            FieldKind::Categorical => "categorical",
            FieldKind::Text => "text",
            FieldKind::List => "list",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "numeric" | "number" => Ok(FieldKind::Numeric),
            "categorical" | "category" => Ok(FieldKind::Categorical),
            "text" => Ok(FieldKind::Text),
            "list" => Ok(FieldKind::List),
            other => Err(format!("unknown field kind: {other}")),
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// A single field of an extraction schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Allowed values, categorical fields only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    /// Weight of this field in the overall consensus confidence
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Instruction shown to the generator for this field
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl SchemaField {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            allowed: Vec::new(),
            weight: default_weight(),
            description: String::new(),
        }
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Numeric)
    }

    pub fn categorical<I, S>(name: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut field = Self::new(name, FieldKind::Categorical);
        field.allowed = allowed.into_iter().map(Into::into).collect();
        field
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::List)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Case-insensitive lookup in the allowed set, returning the declared spelling.
    pub fn match_category(&self, raw: &str) -> Option<&str> {
        let needle = raw.trim();
        self.allowed
            .iter()
            .find(|allowed| allowed.eq_ignore_ascii_case(needle))
            .map(String::as_str)
    }
}

/// Cross-field invariant a well-formed record should satisfy
///
/// Used by the default coherence scorer in mining mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldConstraint {
    /// Numeric `lower` must not exceed numeric `upper` when both are present
    Ordered { lower: String, upper: String },
}

impl FieldConstraint {
    pub fn ordered(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        FieldConstraint::Ordered {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    /// Field names this constraint refers to
    pub fn fields(&self) -> [&str; 2] {
        match self {
            FieldConstraint::Ordered { lower, upper } => [lower.as_str(), upper.as_str()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_category_case_insensitive() {
        let field = SchemaField::categorical("severity", ["High", "Medium", "Low"]);
        assert_eq!(field.match_category("high"), Some("High"));
        assert_eq!(field.match_category("  MEDIUM "), Some("Medium"));
        assert_eq!(field.match_category("critical"), None);
    }

    #[test]
    fn test_builders() {
        let field = SchemaField::numeric("value").optional().weighted(2.0);
        assert_eq!(field.kind, FieldKind::Numeric);
        assert!(!field.required);
        assert_eq!(field.weight, 2.0);
    }

    #[test]
    fn test_field_kind_parse() {
        assert_eq!("Numeric".parse::<FieldKind>(), Ok(FieldKind::Numeric));
        assert_eq!("list".parse::<FieldKind>(), Ok(FieldKind::List));
        assert!("date".parse::<FieldKind>().is_err());
    }

    #[test]
    fn test_field_deserialize_defaults() {
        let field: SchemaField =
            serde_json::from_str(r#"{"name": "owner", "kind": "text"}"#).unwrap();
        assert!(!field.required);
        assert_eq!(field.weight, 1.0);
        assert!(field.allowed.is_empty());
    }
}
