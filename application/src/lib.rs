//! Application layer for concord
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineConfig, RECOMMENDED_CONCURRENCY, SamplingParams};
pub use ports::{
    embedding::EmbeddingGateway,
    generation::{GatewayError, Generation, GenerationGateway, GenerationRequest},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::batch::{
    BatchConsensusResult, BatchEntry, BatchFailure, BatchMiningResult, BatchResult, RunCost,
};
pub use use_cases::error::RunError;
pub use use_cases::orchestrator::{SampleOrchestrator, SamplingRun};
pub use use_cases::run_extract::{ExtractInput, RunExtractUseCase};
pub use use_cases::run_mine::{MineInput, RunMineUseCase};
