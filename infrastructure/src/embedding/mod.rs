//! Embedding adapters

mod hashing;

pub use hashing::{DEFAULT_DIMENSIONS, HashingEmbedder};
