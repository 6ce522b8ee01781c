//! Scripted gateways shared by the use case tests

use crate::ports::embedding::EmbeddingGateway;
use crate::ports::generation::{GatewayError, Generation, GenerationGateway, GenerationRequest};
use async_trait::async_trait;
use concord_domain::TokenUsage;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) const CALL_COST: f64 = 0.01;

/// What the scripted gateway does for one attempt
pub(crate) enum Step {
    Reply(String),
    /// Reply after a delay
    Slow(Duration, String),
    Fail(GatewayError),
    /// Sleep far past any test timeout
    Hang,
}

type Script = dyn Fn(usize, u32) -> Step + Send + Sync;

/// Gateway driven by a function of (sample index, attempt number)
pub(crate) struct ScriptedGateway {
    script: Box<Script>,
    attempts: Mutex<HashMap<usize, u32>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGateway {
    pub fn new(script: impl Fn(usize, u32) -> Step + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            attempts: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call replies with the same text
    pub fn uniform(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_, _| Step::Reply(text.clone()))
    }

    /// Replies picked by sample index
    pub fn by_index(texts: Vec<String>) -> Self {
        Self::new(move |index, _| Step::Reply(texts[index % texts.len()].clone()))
    }

    /// Total attempts made, retries included
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationGateway for ScriptedGateway {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, GatewayError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let counter = attempts.entry(request.sample_index).or_insert(0);
            *counter += 1;
            *counter
        };
        self.requests.lock().unwrap().push(request.clone());

        match (self.script)(request.sample_index, attempt) {
            Step::Reply(text) => {
                Ok(Generation::new(text).with_usage(TokenUsage::new(100, 50), CALL_COST))
            }
            Step::Slow(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(Generation::new(text).with_usage(TokenUsage::new(100, 50), CALL_COST))
            }
            Step::Fail(error) => Err(error),
            Step::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GatewayError::Timeout)
            }
        }
    }
}

/// Embeds by looking up a group label in the text; one axis per label
pub(crate) struct LabelEmbedder {
    pub labels: Vec<&'static str>,
}

#[async_trait]
impl EmbeddingGateway for LabelEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, GatewayError> {
        Ok(texts
            .iter()
            .map(|text| {
                self.labels
                    .iter()
                    .map(|label| if text.contains(label) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect())
    }
}

pub(crate) struct FailingEmbedder;

#[async_trait]
impl EmbeddingGateway for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, GatewayError> {
        Err(GatewayError::RequestFailed("embedding backend down".into()))
    }
}
