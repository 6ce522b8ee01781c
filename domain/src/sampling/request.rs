use super::diversification::PromptDiversification;
use super::temperature::TemperaturePolicy;
use crate::core::{error::DomainError, query::Query};
use crate::schema::SchemaRef;

/// Everything needed to drive one sampling run
#[derive(Debug, Clone)]
pub struct SamplingRequest {
    pub query: Query,
    pub context: Option<String>,
    pub schema: SchemaRef,
    pub samples: usize,
    pub temperature: TemperaturePolicy,
    pub diversification: PromptDiversification,
}

impl SamplingRequest {
    pub fn new(query: Query, schema: impl Into<SchemaRef>) -> Self {
        Self {
            query,
            context: None,
            schema: schema.into(),
            samples: 5,
            temperature: TemperaturePolicy::default(),
            diversification: PromptDiversification::default(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = (!context.trim().is_empty()).then_some(context);
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
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

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.samples == 0 {
            return Err(DomainError::config("sample count must be positive"));
        }
        self.temperature.validate()
    }
}
