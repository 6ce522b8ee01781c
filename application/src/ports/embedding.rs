//! Embedding gateway port
//!
//! Used only in mining mode, once per run, over the texts of the records
//! that passed the quality filter.

use super::generation::GatewayError;
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingGateway: Send + Sync {
    /// Map each text to a fixed-length vector, one vector per input, in order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, GatewayError>;
}
