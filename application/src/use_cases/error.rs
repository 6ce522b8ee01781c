//! Errors surfaced by the sampling use cases

use concord_domain::DomainError;
use thiserror::Error;

/// Named failures of a whole run
///
/// Per-sample failures are absorbed and tallied in the result metrics; only
/// these reach the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Insufficient samples: {usable} usable, {required} required")]
    InsufficientSamples { usable: usize, required: usize },

    #[error("Operation cancelled")]
    Cancelled,
}

impl RunError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunError::Cancelled)
    }

    /// Check if this error was raised before any generation call
    pub fn is_configuration(&self) -> bool {
        matches!(self, RunError::Configuration(_))
    }
}

impl From<DomainError> for RunError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InsufficientSamples { usable, required } => {
                RunError::InsufficientSamples { usable, required }
            }
            DomainError::Configuration(message) => RunError::Configuration(message),
            other @ DomainError::UnknownSchema(_) => RunError::Configuration(other.to_string()),
        }
    }
}
