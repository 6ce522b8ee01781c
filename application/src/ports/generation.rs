//! Generation gateway port
//!
//! Defines the interface for issuing one sampling call against a text
//! generation provider. Vendor adapters live outside the core.

use async_trait::async_trait;
use concord_domain::TokenUsage;
use thiserror::Error;

/// Errors a single generation call can fail with
///
/// These never reach the caller of a use case: the orchestrator retries,
/// then records the failure on the sample.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GatewayError::InvalidResponse(_))
    }
}

/// One parameterized sampling call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Position of this call in the run (0..N-1)
    pub sample_index: usize,
    pub system_prompt: String,
    pub prompt: String,
    pub temperature: f64,
}

/// What the provider returned for one call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
    pub cost_usd: f64,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage, cost_usd: f64) -> Self {
        self.usage = usage;
        self.cost_usd = cost_usd;
        self
    }
}

/// Gateway for text generation
///
/// Implementations must be safe to call concurrently; the orchestrator
/// keeps several calls in flight at once.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, GatewayError>;
}
