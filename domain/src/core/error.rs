//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Only configuration problems and a shortage of usable samples are fatal.
/// Per-sample failures (generation, parsing) are recorded on the sample or
/// record they belong to and never surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    #[error("Insufficient samples: {usable} usable, {required} required")]
    InsufficientSamples { usable: usize, required: usize },
}

impl DomainError {
    /// Shorthand for building a [`DomainError::Configuration`]
    pub fn config(message: impl Into<String>) -> Self {
        DomainError::Configuration(message.into())
    }

    /// Check if this error was raised before any work started
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DomainError::Configuration(_) | DomainError::UnknownSchema(_)
        )
    }
}
