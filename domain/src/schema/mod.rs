//! Extraction schemas: field declarations, validation and the named registry

pub mod builtin;
pub mod definition;
pub mod field;
pub mod registry;

pub use definition::Schema;
pub use field::{FieldConstraint, FieldKind, SchemaField};
pub use registry::{SchemaRef, SchemaRegistry};
