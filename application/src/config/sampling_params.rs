//! Sampling parameters: orchestrator loop control.
//!
//! [`SamplingParams`] groups the knobs that control how the
//! [`SampleOrchestrator`](crate::use_cases::orchestrator::SampleOrchestrator)
//! issues calls: how many, how many at once, how long each may take, how
//! often to retry, and when to stop early.

use concord_domain::{Budget, DomainError, PromptDiversification, TemperaturePolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Concurrency window the orchestrator is tuned for
pub const RECOMMENDED_CONCURRENCY: std::ops::RangeInclusive<usize> = 3..=8;

/// Sampling loop control parameters.
///
/// The batch size of the orchestrator equals `concurrency`: the stability
/// predicate and the budget check both run between batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Number of calls requested.
    pub samples: usize,
    /// Calls in flight at once; also the batch size.
    pub concurrency: usize,
    /// Timeout applied to each call attempt independently.
    pub call_timeout: Duration,
    /// Extra attempts after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_backoff: Duration,
    /// Whether the stability predicate may halt sampling.
    pub early_stop: bool,
    /// Provisional confidence at which sampling halts.
    pub early_stop_threshold: f64,
    /// Records needed before the predicate is consulted.
    pub min_samples_before_stop: usize,
    /// Spend ceiling for one run.
    pub max_cost_usd: Option<f64>,
    pub temperature: TemperaturePolicy,
    pub diversification: PromptDiversification,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            samples: 5,
            concurrency: 3,
            call_timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
            early_stop: true,
            early_stop_threshold: 0.6,
            min_samples_before_stop: 2,
            max_cost_usd: None,
            temperature: TemperaturePolicy::default(),
            diversification: PromptDiversification::None,
        }
    }
}

impl SamplingParams {
    /// Defaults for mining runs: more samples, rising temperature, role
    /// injection, and no early stop.
    pub fn exploration() -> Self {
        Self {
            samples: 32,
            concurrency: 8,
            early_stop: false,
            temperature: TemperaturePolicy::exploration(),
            diversification: PromptDiversification::RoleInjection,
            ..Self::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_early_stop(mut self, enabled: bool) -> Self {
        self.early_stop = enabled;
        self
    }

    pub fn with_early_stop_threshold(mut self, threshold: f64) -> Self {
        self.early_stop_threshold = threshold;
        self
    }

    pub fn with_min_samples_before_stop(mut self, min: usize) -> Self {
        self.min_samples_before_stop = min;
        self
    }

    pub fn with_max_cost_usd(mut self, max: Option<f64>) -> Self {
        self.max_cost_usd = max;
        self
    }

    pub fn with_temperature(mut self, temperature: TemperaturePolicy) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_diversification(mut self, diversification: PromptDiversification) -> Self {
        self.diversification = diversification;
        self
    }

    // ==================== Validation ====================

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.samples == 0 {
            return Err(DomainError::config("sample count must be positive"));
        }
        if self.concurrency == 0 {
            return Err(DomainError::config("concurrency must be positive"));
        }
        if self.call_timeout.is_zero() {
            return Err(DomainError::config("call timeout must be positive"));
        }
        if !(0.0..=1.0).contains(&self.early_stop_threshold) {
            return Err(DomainError::config(format!(
                "early_stop_threshold must be within [0, 1], got {}",
                self.early_stop_threshold
            )));
        }
        self.temperature.validate()?;
        self.budget().map(|_| ())
    }

    /// Spend ceiling as a domain budget
    pub fn budget(&self) -> Result<Budget, DomainError> {
        Budget::new(self.max_cost_usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_domain::TemperatureSchedule;

    #[test]
    fn test_defaults() {
        let params = SamplingParams::default();
        assert_eq!(params.samples, 5);
        assert_eq!(params.concurrency, 3);
        assert!(params.concurrency < params.samples);
        assert!(RECOMMENDED_CONCURRENCY.contains(&params.concurrency));
        assert_eq!(params.max_retries, 2);
        assert!(params.early_stop);
        assert_eq!(params.early_stop_threshold, 0.6);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_exploration_never_stops_early() {
        let params = SamplingParams::exploration();
        assert!(!params.early_stop);
        assert_eq!(params.temperature.schedule, TemperatureSchedule::LinearIncrease);
        assert_eq!(params.diversification, PromptDiversification::RoleInjection);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(SamplingParams::default().with_samples(0).validate().is_err());
        assert!(SamplingParams::default().with_concurrency(0).validate().is_err());
        assert!(
            SamplingParams::default()
                .with_early_stop_threshold(1.5)
                .validate()
                .is_err()
        );
        assert!(
            SamplingParams::default()
                .with_max_cost_usd(Some(0.0))
                .validate()
                .is_err()
        );
        assert!(
            SamplingParams::default()
                .with_call_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }
}
