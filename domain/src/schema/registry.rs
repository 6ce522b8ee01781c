//! Named schema lookup

use super::builtin;
use super::definition::Schema;
use crate::core::error::DomainError;
use std::collections::BTreeMap;

/// Either a registered schema name or an inline definition
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRef {
    Named(String),
    Inline(Schema),
}

impl From<&str> for SchemaRef {
    fn from(name: &str) -> Self {
        SchemaRef::Named(name.to_string())
    }
}

impl From<String> for SchemaRef {
    fn from(name: String) -> Self {
        SchemaRef::Named(name)
    }
}

impl From<Schema> for SchemaRef {
    fn from(schema: Schema) -> Self {
        SchemaRef::Inline(schema)
    }
}

/// Schemas available by name
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in project-management schemas.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for schema in builtin::all() {
            registry.schemas.insert(schema.name.clone(), schema);
        }
        registry
    }

    /// Register a custom schema. Replaces any schema with the same name.
    pub fn register(&mut self, schema: Schema) -> Result<(), DomainError> {
        schema.validate()?;
        if self.schemas.contains_key(&schema.name) {
            tracing::debug!("Replacing registered schema '{}'", schema.name);
        }
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Schema, DomainError> {
        self.schemas
            .get(name)
            .ok_or_else(|| DomainError::UnknownSchema(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    /// Resolve a reference into an owned, validated schema.
    pub fn resolve(&self, schema: &SchemaRef) -> Result<Schema, DomainError> {
        match schema {
            SchemaRef::Named(name) => self.get(name).cloned(),
            SchemaRef::Inline(schema) => {
                schema.validate()?;
                Ok(schema.clone())
            }
        }
    }
}
