//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`SamplingParams`]: orchestrator loop control (samples, concurrency, retries, early stop)
//! - [`EngineConfig`]: container for both run modes

pub mod engine_config;
pub mod sampling_params;

pub use engine_config::EngineConfig;
pub use sampling_params::{RECOMMENDED_CONCURRENCY, SamplingParams};
