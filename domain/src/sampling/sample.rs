//! Raw generation outputs

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Token counts reported by the generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: Self) -> Self::Output {
        TokenUsage {
            input_tokens: self.input_tokens + rhs.input_tokens,
            output_tokens: self.output_tokens + rhs.output_tokens,
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleOutcome {
    Completed { text: String },
    /// Call failed after all retries; excluded downstream
    Failed { error: String },
}

/// One generation call's result, keyed by its request index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub index: usize,
    pub outcome: SampleOutcome,
    pub usage: TokenUsage,
    pub cost_usd: f64,
    pub temperature: f64,
    /// Number of attempts made, including retries
    pub attempts: u32,
}

impl RawSample {
    pub fn completed(index: usize, text: impl Into<String>, temperature: f64) -> Self {
        Self {
            index,
            outcome: SampleOutcome::Completed { text: text.into() },
            usage: TokenUsage::default(),
            cost_usd: 0.0,
            temperature,
            attempts: 1,
        }
    }

    pub fn failed(index: usize, error: impl Into<String>, temperature: f64) -> Self {
        Self {
            index,
            outcome: SampleOutcome::Failed {
                error: error.into(),
            },
            usage: TokenUsage::default(),
            cost_usd: 0.0,
            temperature,
            attempts: 1,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage, cost_usd: f64) -> Self {
        self.usage = usage;
        self.cost_usd = cost_usd;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            SampleOutcome::Completed { text } => Some(text),
            SampleOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            SampleOutcome::Completed { .. } => None,
            SampleOutcome::Failed { error } => Some(error),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, SampleOutcome::Completed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_add() {
        let mut total = TokenUsage::new(10, 5);
        total += TokenUsage::new(3, 2);
        assert_eq!(total, TokenUsage::new(13, 7));
        assert_eq!(total.total(), 20);
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = RawSample::completed(0, "{}", 0.7);
        assert_eq!(ok.text(), Some("{}"));
        assert!(ok.error().is_none());

        let failed = RawSample::failed(1, "timeout", 0.7).with_attempts(3);
        assert!(!failed.is_completed());
        assert_eq!(failed.error(), Some("timeout"));
        assert_eq!(failed.attempts, 3);
    }
}
