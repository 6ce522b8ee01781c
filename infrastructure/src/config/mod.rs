//! Configuration file loading for concord
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./concord.toml` or `./.concord.toml`
//! 3. Global config: `$XDG_CONFIG_HOME/concord/config.toml`
//! 4. `CONCORD_` environment variables
//! 5. Default values

mod file_config;
mod issue;
mod loader;

pub use file_config::{FileConfig, FileConsensusConfig, FileMiningConfig, FileSamplingConfig};
pub use issue::{ConfigIssue, ConfigIssueCode, Severity};
pub use loader::ConfigLoader;
