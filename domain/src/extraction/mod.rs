//! Schema-guided extraction of raw generations into typed records

pub mod parser;
pub mod record;

pub use parser::{Extraction, SchemaExtractor};
pub use record::{FieldStatus, FieldValue, StructuredRecord};
