//! Run Mine use case
//!
//! Exploration mode: sample widely, drop low-quality records, embed the
//! survivors, then cluster and rank them into distinct candidates. Early
//! stopping is always off here; stopping early would favour whichever
//! cluster formed first.

use super::batch::{BatchMiningResult, BatchResult, pair_schemas};
use super::error::RunError;
use super::orchestrator::SampleOrchestrator;
use super::shared::{elapsed_ms, log_discarded};
use crate::config::{EngineConfig, SamplingParams};
use crate::ports::embedding::EmbeddingGateway;
use crate::ports::generation::GenerationGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use concord_domain::{
    AggregationConfig, DiversityMiner, MiningConfig, MiningResult, NeverStable, Query,
    SamplingRequest, SchemaExtractor, SchemaRef, SchemaRegistry, StabilityPredicate,
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Input for one mining run
#[derive(Debug, Clone)]
pub struct MineInput {
    pub query: Query,
    pub context: Option<String>,
    pub schema: SchemaRef,
    /// Overrides the configured sample count
    pub samples: Option<usize>,
    /// Overrides the configured mining parameters
    pub config: Option<MiningConfig>,
}

impl MineInput {
    pub fn new(query: Query, schema: impl Into<SchemaRef>) -> Self {
        Self {
            query,
            context: None,
            schema: schema.into(),
            samples: None,
            config: None,
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

    pub fn with_config(mut self, config: MiningConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Use case for diversity mining
pub struct RunMineUseCase<G: GenerationGateway + 'static, E: EmbeddingGateway + 'static> {
    gateway: Arc<G>,
    embedder: Arc<E>,
    registry: Arc<SchemaRegistry>,
    sampling: SamplingParams,
    mining: MiningConfig,
    aggregation: AggregationConfig,
    /// Only consulted when early stop is on, which a mining run never is
    stability: Arc<dyn StabilityPredicate>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: GenerationGateway + 'static, E: EmbeddingGateway + 'static> RunMineUseCase<G, E> {
    pub fn new(gateway: Arc<G>, embedder: Arc<E>, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            gateway,
            embedder,
            registry,
            sampling: SamplingParams::exploration(),
            mining: MiningConfig::default(),
            aggregation: AggregationConfig::default(),
            stability: Arc::new(NeverStable),
            cancellation_token: None,
        }
    }

    /// Build with the mining slices of an engine configuration
    pub fn from_config(
        gateway: Arc<G>,
        embedder: Arc<E>,
        registry: Arc<SchemaRegistry>,
        config: &EngineConfig,
    ) -> Self {
        Self::new(gateway, embedder, registry)
            .with_sampling(config.mining_sampling.clone())
            .with_mining(config.mining.clone())
            .with_aggregation(config.aggregation.clone())
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_mining(mut self, mining: MiningConfig) -> Self {
        self.mining = mining;
        self
    }

    /// Aggregation settings for the consensus baseline
    pub fn with_aggregation(mut self, aggregation: AggregationConfig) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_stability(mut self, stability: Arc<dyn StabilityPredicate>) -> Self {
        self.stability = stability;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: MineInput) -> Result<MiningResult, RunError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: MineInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<MiningResult, RunError> {
        let start = Instant::now();
        let schema = self.registry.resolve(&input.schema)?;
        self.aggregation.validate()?;
        let miner = DiversityMiner::new(input.config.unwrap_or_else(|| self.mining.clone()))?
            .with_aggregation(self.aggregation.clone());

        let mut params = self.sampling.clone();
        if let Some(samples) = input.samples {
            params.samples = samples;
        }
        if params.early_stop {
            debug!("Early stop requested for a mining run; ignoring");
            params.early_stop = false;
        }

        let query_text = input.query.content().to_string();
        let mut request = SamplingRequest::new(input.query, schema.clone())
            .with_samples(params.samples)
            .with_temperature(params.temperature)
            .with_diversification(params.diversification);
        if let Some(context) = input.context {
            request = request.with_context(context);
        }

        info!(
            "Mining '{}' with {} samples ({} tier available)",
            schema.name,
            params.samples,
            miner.tier()
        );

        let mut orchestrator = SampleOrchestrator::new(Arc::clone(&self.gateway));
        if let Some(ref token) = self.cancellation_token {
            orchestrator = orchestrator.with_cancellation(token.clone());
        }
        let run = orchestrator
            .run_with_progress(&request, &schema, &params, self.stability.as_ref(), progress)
            .await?;

        let extraction = SchemaExtractor::new(&schema).extract_all(&run.samples);
        log_discarded(&run.samples, &extraction.discarded);
        let discarded = extraction.discarded.len();

        let gate = miner.filter(&schema, &query_text, extraction.records, discarded)?;
        info!(
            "{} of {} records passed the quality filter",
            gate.survivors.len(),
            gate.total
        );

        let texts = gate.texts();
        let embeddings = match tokio::time::timeout(params.call_timeout, self.embedder.embed(&texts))
            .await
        {
            Ok(Ok(vectors)) => Some(vectors),
            Ok(Err(e)) => {
                warn!("Embedding failed: {}", e);
                None
            }
            Err(_) => {
                warn!("Embedding timed out");
                None
            }
        };

        let mining = miner.rank(&schema, gate, embeddings);

        Ok(MiningResult {
            mining,
            samples_generated: run.used(),
            samples_failed: run.failed(),
            records_discarded: discarded,
            budget_exhausted: run.budget_exhausted,
            tokens_used: run.ledger.tokens(),
            cost_usd: run.ledger.spent_usd(),
            latency_ms: elapsed_ms(start),
        })
    }

    /// Mine several queries, at most `max_concurrent` at a time.
    ///
    /// `schemas` holds one schema per query, or a single schema used for all.
    pub async fn mine_batch(
        &self,
        queries: Vec<Query>,
        schemas: Vec<SchemaRef>,
        max_concurrent: usize,
    ) -> Result<BatchMiningResult, RunError> {
        if max_concurrent == 0 {
            return Err(RunError::Configuration(
                "max_concurrent must be positive".to_string(),
            ));
        }
        let pairs = pair_schemas(queries, schemas)?;
        info!(
            "Mining batch of {} queries ({} at a time)",
            pairs.len(),
            max_concurrent
        );

        let outcomes: Vec<(usize, Result<MiningResult, RunError>)> =
            stream::iter(pairs.into_iter().enumerate())
                .map(|(index, (query, schema))| async move {
                    (index, self.execute(MineInput::new(query, schema)).await)
                })
                .buffered(max_concurrent)
                .collect()
                .await;

        BatchResult::collect(outcomes)
    }
}
