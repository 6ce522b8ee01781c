//! Extraction schema

use super::field::{FieldConstraint, FieldKind, SchemaField};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named set of fields the generator is asked to fill in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub title: String,
    /// Task description prepended to the extraction prompt
    #[serde(default)]
    pub instructions: String,
    pub fields: Vec<SchemaField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<FieldConstraint>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            instructions: String::new(),
            fields: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_constraint(mut self, constraint: FieldConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }

    /// Check that the schema is usable for extraction.
    ///
    /// Rejects empty schemas, duplicate field names, categorical fields
    /// without an allowed set, allowed sets on non-categorical fields,
    /// non-finite or negative weights, and constraints that reference
    /// unknown or non-numeric fields.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::config("schema name must not be empty"));
        }
        if self.fields.is_empty() {
            return Err(DomainError::config(format!(
                "schema '{}' declares no fields",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(DomainError::config(format!(
                    "schema '{}' has a field with an empty name",
                    self.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(DomainError::config(format!(
                    "schema '{}' declares field '{}' twice",
                    self.name, field.name
                )));
            }
            match field.kind {
                FieldKind::Categorical if field.allowed.is_empty() => {
                    return Err(DomainError::config(format!(
                        "categorical field '{}.{}' has no allowed values",
                        self.name, field.name
                    )));
                }
                FieldKind::Numeric | FieldKind::Text | FieldKind::List
                    if !field.allowed.is_empty() =>
                {
                    return Err(DomainError::config(format!(
                        "field '{}.{}' is {} but declares allowed values",
                        self.name, field.name, field.kind
                    )));
                }
                _ => {}
            }
            if !field.weight.is_finite() || field.weight < 0.0 {
                return Err(DomainError::config(format!(
                    "field '{}.{}' has invalid weight {}",
                    self.name, field.name, field.weight
                )));
            }
        }

        for constraint in &self.constraints {
            for name in constraint.fields() {
                match self.field(name) {
                    Some(f) if f.kind == FieldKind::Numeric => {}
                    Some(_) => {
                        return Err(DomainError::config(format!(
                            "constraint in schema '{}' references non-numeric field '{}'",
                            self.name, name
                        )));
                    }
                    None => {
                        return Err(DomainError::config(format!(
                            "constraint in schema '{}' references unknown field '{}'",
                            self.name, name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
