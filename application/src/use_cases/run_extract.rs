//! Run Extract use case
//!
//! Self-consistency mode: sample N answers, parse each against the schema,
//! and collapse the records into one consensus answer with a confidence.

use super::batch::{BatchConsensusResult, BatchResult, pair_schemas};
use super::error::RunError;
use super::orchestrator::SampleOrchestrator;
use super::shared::{elapsed_ms, log_discarded};
use crate::config::{EngineConfig, SamplingParams};
use crate::ports::generation::GenerationGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use concord_domain::{
    AggregationConfig, ConfidenceStability, ConsensusAggregator, ConsensusResult, Query,
    SamplingRequest, SchemaExtractor, SchemaRef, SchemaRegistry, TemperaturePolicy,
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Input for one consensus extraction
#[derive(Debug, Clone)]
pub struct ExtractInput {
    pub query: Query,
    pub context: Option<String>,
    pub schema: SchemaRef,
    /// Overrides the configured sample count
    pub samples: Option<usize>,
    /// Overrides the configured temperature policy
    pub temperature: Option<TemperaturePolicy>,
    /// Overrides the configured early-stop switch
    pub early_stop: Option<bool>,
}

impl ExtractInput {
    pub fn new(query: Query, schema: impl Into<SchemaRef>) -> Self {
        Self {
            query,
            context: None,
            schema: schema.into(),
            samples: None,
            temperature: None,
            early_stop: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn with_temperature(mut self, temperature: TemperaturePolicy) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_early_stop(mut self, enabled: bool) -> Self {
        self.early_stop = Some(enabled);
        self
    }
}

/// Use case for consensus extraction
pub struct RunExtractUseCase<G: GenerationGateway + 'static> {
    gateway: Arc<G>,
    registry: Arc<SchemaRegistry>,
    sampling: SamplingParams,
    aggregation: AggregationConfig,
    cancellation_token: Option<CancellationToken>,
}

impl<G: GenerationGateway + 'static> RunExtractUseCase<G> {
    pub fn new(gateway: Arc<G>, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            gateway,
            registry,
            sampling: SamplingParams::default(),
            aggregation: AggregationConfig::default(),
            cancellation_token: None,
        }
    }

    /// Build with the consensus slices of an engine configuration
    pub fn from_config(gateway: Arc<G>, registry: Arc<SchemaRegistry>, config: &EngineConfig) -> Self {
        Self::new(gateway, registry)
            .with_sampling(config.sampling.clone())
            .with_aggregation(config.aggregation.clone())
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_aggregation(mut self, aggregation: AggregationConfig) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: ExtractInput) -> Result<ConsensusResult, RunError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: ExtractInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<ConsensusResult, RunError> {
        let start = Instant::now();
        let schema = self.registry.resolve(&input.schema)?;
        self.aggregation.validate()?;

        let mut params = self.sampling.clone();
        if let Some(samples) = input.samples {
            params.samples = samples;
        }
        if let Some(temperature) = input.temperature {
            params.temperature = temperature;
        }
        if let Some(early_stop) = input.early_stop {
            params.early_stop = early_stop;
        }

        let mut request = SamplingRequest::new(input.query, schema.clone())
            .with_samples(params.samples)
            .with_temperature(params.temperature)
            .with_diversification(params.diversification);
        if let Some(context) = input.context {
            request = request.with_context(context);
        }

        info!(
            "Extracting '{}' with {} samples",
            schema.name, params.samples
        );

        let stability = ConfidenceStability::new(
            schema.clone(),
            self.aggregation.clone(),
            params.early_stop_threshold,
            params.min_samples_before_stop,
        );
        let mut orchestrator = SampleOrchestrator::new(Arc::clone(&self.gateway));
        if let Some(ref token) = self.cancellation_token {
            orchestrator = orchestrator.with_cancellation(token.clone());
        }
        let run = orchestrator
            .run_with_progress(&request, &schema, &params, &stability, progress)
            .await?;

        let extraction = SchemaExtractor::new(&schema).extract_all(&run.samples);
        log_discarded(&run.samples, &extraction.discarded);

        let consensus =
            ConsensusAggregator::new(self.aggregation.clone()).aggregate(&schema, &extraction.records)?;

        info!(
            "Consensus confidence {:.2} ({}) from {} records",
            consensus.confidence,
            consensus.review_level,
            consensus.records_used
        );

        Ok(ConsensusResult {
            consensus,
            samples_requested: run.requested,
            samples_used: run.used(),
            samples_failed: run.failed(),
            records_discarded: extraction.discarded.len(),
            early_stopped: run.early_stopped,
            budget_exhausted: run.budget_exhausted,
            cost_usd: run.ledger.spent_usd(),
            cost_saved_usd: run.cost_saved(),
            tokens_used: run.ledger.tokens(),
            latency_ms: elapsed_ms(start),
        })
    }

    /// Extract several queries, at most `max_concurrent` at a time.
    ///
    /// `schemas` holds one schema per query, or a single schema used for all.
    /// Failed queries are reported per index; the batch itself only fails on
    /// a configuration problem or cancellation.
    pub async fn extract_batch(
        &self,
        queries: Vec<Query>,
        schemas: Vec<SchemaRef>,
        max_concurrent: usize,
    ) -> Result<BatchConsensusResult, RunError> {
        if max_concurrent == 0 {
            return Err(RunError::Configuration(
                "max_concurrent must be positive".to_string(),
            ));
        }
        let pairs = pair_schemas(queries, schemas)?;
        info!(
            "Extracting batch of {} queries ({} at a time)",
            pairs.len(),
            max_concurrent
        );

        let outcomes: Vec<(usize, Result<ConsensusResult, RunError>)> =
            stream::iter(pairs.into_iter().enumerate())
                .map(|(index, (query, schema))| async move {
                    (index, self.execute(ExtractInput::new(query, schema)).await)
                })
                .buffered(max_concurrent)
                .collect()
                .await;

        BatchResult::collect(outcomes)
    }
}
