//! Replay gateway
//!
//! Serves recorded generations from a JSON file instead of calling a
//! provider. Sample `i` receives entry `i mod len`, so a short recording
//! can back a long run. Entries are either raw text, a call with usage, or
//! a recorded failure:
//!
//! ```json
//! {
//!   "responses": [
//!     "{\"severity\": \"High\"}",
//!     { "text": "{\"severity\": \"Low\"}", "input_tokens": 420, "output_tokens": 35, "cost_usd": 0.0011 },
//!     { "error": "timeout" }
//!   ]
//! }
//! ```
//!
//! A bare top-level array is accepted too.

use async_trait::async_trait;
use concord_application::{GatewayError, Generation, GenerationGateway, GenerationRequest};
use concord_domain::TokenUsage;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading a recording
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Failed to read recording: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse recording: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Recording has no responses")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RecordedEntry {
    Text(String),
    Failure {
        error: String,
    },
    Call {
        text: String,
        #[serde(default)]
        input_tokens: u64,
        #[serde(default)]
        output_tokens: u64,
        #[serde(default)]
        cost_usd: f64,
        /// Simulated latency
        #[serde(default)]
        delay_ms: u64,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Recording {
    Wrapped { responses: Vec<RecordedEntry> },
    Bare(Vec<RecordedEntry>),
}

pub struct ReplayGateway {
    entries: Vec<RecordedEntry>,
}

impl ReplayGateway {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let entries = match serde_json::from_str::<Recording>(json)? {
            Recording::Wrapped { responses } => responses,
            Recording::Bare(entries) => entries,
        };
        if entries.is_empty() {
            return Err(ReplayError::Empty);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Map a recorded failure label onto the gateway error it stands for
fn recorded_error(label: &str) -> GatewayError {
    match label.to_lowercase().as_str() {
        "timeout" => GatewayError::Timeout,
        "rate_limited" | "rate-limited" | "429" => GatewayError::RateLimited,
        other if other.starts_with("invalid") => GatewayError::InvalidResponse(label.to_string()),
        _ => GatewayError::RequestFailed(label.to_string()),
    }
}

#[async_trait]
impl GenerationGateway for ReplayGateway {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, GatewayError> {
        let entry = &self.entries[request.sample_index % self.entries.len()];
        debug!(
            "Replaying entry {} for sample {}",
            request.sample_index % self.entries.len(),
            request.sample_index
        );
        match entry {
            RecordedEntry::Text(text) => Ok(Generation::new(text.clone())),
            RecordedEntry::Failure { error } => Err(recorded_error(error)),
            RecordedEntry::Call {
                text,
                input_tokens,
                output_tokens,
                cost_usd,
                delay_ms,
            } => {
                if *delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                }
                Ok(Generation::new(text.clone())
                    .with_usage(TokenUsage::new(*input_tokens, *output_tokens), *cost_usd))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn request(index: usize) -> GenerationRequest {
        GenerationRequest {
            sample_index: index,
            system_prompt: String::new(),
            prompt: "q".to_string(),
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn test_entries_cycle_by_index() {
        let gateway = ReplayGateway::from_json(r#"["first", "second"]"#).unwrap();
        assert_eq!(gateway.len(), 2);
        assert_eq!(gateway.generate(&request(0)).await.unwrap().text, "first");
        assert_eq!(gateway.generate(&request(1)).await.unwrap().text, "second");
        assert_eq!(gateway.generate(&request(2)).await.unwrap().text, "first");
    }

    #[tokio::test]
    async fn test_usage_and_failures() {
        let json = r#"{
            "responses": [
                {"text": "{\"a\": 1}", "input_tokens": 10, "output_tokens": 4, "cost_usd": 0.002},
                {"error": "rate_limited"},
                {"error": "boom"}
            ]
        }"#;
        let gateway = ReplayGateway::from_json(json).unwrap();

        let generation = gateway.generate(&request(0)).await.unwrap();
        assert_eq!(generation.usage.total(), 14);
        assert_eq!(generation.cost_usd, 0.002);

        assert_eq!(
            gateway.generate(&request(1)).await.unwrap_err(),
            GatewayError::RateLimited
        );
        assert_eq!(
            gateway.generate(&request(2)).await.unwrap_err(),
            GatewayError::RequestFailed("boom".to_string())
        );
    }

    #[test]
    fn test_empty_recording_rejected() {
        assert!(matches!(
            ReplayGateway::from_json(r#"{"responses": []}"#),
            Err(ReplayError::Empty)
        ));
        assert!(matches!(
            ReplayGateway::from_json("not json"),
            Err(ReplayError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["recorded"]"#).unwrap();
        let gateway = ReplayGateway::from_file(file.path()).unwrap();
        assert_eq!(gateway.len(), 1);
        assert!(matches!(
            ReplayGateway::from_file("/definitely/not/here.json"),
            Err(ReplayError::Io(_))
        ));
    }
}
