//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod batch;
pub mod error;
pub mod orchestrator;
pub mod run_extract;
pub mod run_mine;
pub(crate) mod shared;

#[cfg(test)]
pub(crate) mod test_support;
