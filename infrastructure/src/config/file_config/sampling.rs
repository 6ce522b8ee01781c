//! Sampling configuration from TOML (`[sampling]` section)

use crate::config::issue::ConfigIssue;
use concord_application::SamplingParams;
use concord_domain::{PromptDiversification, TemperaturePolicy, TemperatureSchedule};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub(super) const SCHEDULES: [&str; 5] = [
    "fixed",
    "linear_increase",
    "exponential",
    "random",
    "explore_exploit",
];

pub(super) const DIVERSIFICATIONS: [&str; 5] = [
    "none",
    "role_injection",
    "instruction_variation",
    "perspective_shift",
    "all",
];

/// Raw sampling configuration for consensus runs
///
/// `timeout_seconds`, `max_retries` and `retry_backoff_ms` also apply to
/// mining runs.
///
/// # Example
///
/// ```toml
/// [sampling]
/// samples = 5
/// concurrency = 3
/// timeout_seconds = 60
/// max_retries = 2
/// early_stop = true
/// early_stop_threshold = 0.6
/// temperature_schedule = "fixed"    # fixed, linear_increase, exponential, random, explore_exploit
/// temperature_start = 0.7
/// diversification = "none"          # none, role_injection, instruction_variation, perspective_shift, all
/// max_cost_usd = 0.50
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSamplingConfig {
    pub samples: usize,
    pub concurrency: usize,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub early_stop: bool,
    pub early_stop_threshold: f64,
    pub min_samples_before_stop: usize,
    pub max_cost_usd: Option<f64>,
    pub temperature_schedule: String,
    pub temperature_start: f64,
    pub temperature_end: f64,
    pub temperature_seed: Option<u64>,
    pub diversification: String,
}

impl Default for FileSamplingConfig {
    fn default() -> Self {
        let params = SamplingParams::default();
        Self {
            samples: params.samples,
            concurrency: params.concurrency,
            timeout_seconds: params.call_timeout.as_secs(),
            max_retries: params.max_retries,
            retry_backoff_ms: 500,
            early_stop: params.early_stop,
            early_stop_threshold: params.early_stop_threshold,
            min_samples_before_stop: params.min_samples_before_stop,
            max_cost_usd: None,
            temperature_schedule: params.temperature.schedule.to_string(),
            temperature_start: params.temperature.start,
            temperature_end: params.temperature.end,
            temperature_seed: None,
            diversification: params.diversification.to_string(),
        }
    }
}

impl FileSamplingConfig {
    /// Parse the schedule string, returning warnings on failure.
    pub fn parse_schedule(&self) -> (TemperatureSchedule, Vec<ConfigIssue>) {
        parse_schedule(
            "sampling.temperature_schedule",
            &self.temperature_schedule,
            TemperatureSchedule::Fixed,
        )
    }

    /// Parse the diversification string, returning warnings on failure.
    pub fn parse_diversification(&self) -> (PromptDiversification, Vec<ConfigIssue>) {
        parse_diversification(
            "sampling.diversification",
            &self.diversification,
            PromptDiversification::None,
        )
    }

    /// Convert to orchestrator parameters; unknown enum strings fall back.
    pub fn to_sampling_params(&self) -> SamplingParams {
        let mut temperature = TemperaturePolicy::new(
            self.parse_schedule().0,
            self.temperature_start,
            self.temperature_end,
        );
        if let Some(seed) = self.temperature_seed {
            temperature = temperature.with_seed(seed);
        }
        SamplingParams::default()
            .with_samples(self.samples)
            .with_concurrency(self.concurrency)
            .with_call_timeout(Duration::from_secs(self.timeout_seconds))
            .with_max_retries(self.max_retries)
            .with_retry_backoff(Duration::from_millis(self.retry_backoff_ms))
            .with_early_stop(self.early_stop)
            .with_early_stop_threshold(self.early_stop_threshold)
            .with_min_samples_before_stop(self.min_samples_before_stop)
            .with_max_cost_usd(self.max_cost_usd)
            .with_temperature(temperature)
            .with_diversification(self.parse_diversification().0)
    }
}

pub(super) fn parse_schedule(
    field: &str,
    value: &str,
    fallback: TemperatureSchedule,
) -> (TemperatureSchedule, Vec<ConfigIssue>) {
    match value.parse::<TemperatureSchedule>() {
        Ok(schedule) => (schedule, vec![]),
        Err(_) => (
            fallback,
            vec![ConfigIssue::invalid_enum(
                field,
                value,
                &SCHEDULES,
                &fallback.to_string(),
            )],
        ),
    }
}

pub(super) fn parse_diversification(
    field: &str,
    value: &str,
    fallback: PromptDiversification,
) -> (PromptDiversification, Vec<ConfigIssue>) {
    match value.parse::<PromptDiversification>() {
        Ok(strategy) => (strategy, vec![]),
        Err(_) => (
            fallback,
            vec![ConfigIssue::invalid_enum(
                field,
                value,
                &DIVERSIFICATIONS,
                &fallback.to_string(),
            )],
        ),
    }
}
