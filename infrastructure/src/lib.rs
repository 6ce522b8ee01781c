//! Infrastructure layer for concord
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod embedding;
pub mod replay;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigIssueCode, ConfigLoader, FileConfig, FileConsensusConfig,
    FileMiningConfig, FileSamplingConfig, Severity,
};
pub use embedding::{DEFAULT_DIMENSIONS, HashingEmbedder};
pub use replay::{ReplayError, ReplayGateway};
