//! Sampling value objects: requests, temperature policy, raw outputs

pub mod diversification;
pub mod request;
pub mod sample;
pub mod temperature;

pub use diversification::PromptDiversification;
pub use request::SamplingRequest;
pub use sample::{RawSample, SampleOutcome, TokenUsage};
pub use temperature::{TemperaturePolicy, TemperatureSchedule};
