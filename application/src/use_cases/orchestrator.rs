//! Generation orchestrator
//!
//! Issues the calls of one sampling run in concurrency-sized batches. Each
//! call gets its own timeout and retry budget; a call that still fails is
//! recorded as a failed [`RawSample`] instead of failing the run. Between
//! batches the orchestrator consults the cost budget and the stability
//! predicate, and stops dispatching when either says so.

use super::error::RunError;
use super::shared::check_cancelled;
use crate::config::SamplingParams;
use crate::ports::generation::{GatewayError, GenerationGateway, GenerationRequest};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use concord_domain::{
    CostLedger, PromptTemplate, RawSample, SamplingRequest, Schema, StabilityPredicate,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Everything one sampling run produced
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingRun {
    /// One entry per issued call, in request-index order
    pub samples: Vec<RawSample>,
    pub ledger: CostLedger,
    pub requested: usize,
    pub early_stopped: bool,
    pub budget_exhausted: bool,
}

impl SamplingRun {
    /// Calls issued, completed or failed
    pub fn used(&self) -> usize {
        self.samples.len()
    }

    pub fn failed(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_completed()).count()
    }

    /// Projected cost of the calls early stop skipped
    pub fn cost_saved(&self) -> f64 {
        if self.early_stopped {
            self.ledger.cost_saved(self.requested)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl From<&SamplingParams> for RetryPolicy {
    fn from(params: &SamplingParams) -> Self {
        Self {
            timeout: params.call_timeout,
            max_retries: params.max_retries,
            backoff: params.retry_backoff,
        }
    }
}

/// Batch-synchronous sampler over a [`GenerationGateway`]
pub struct SampleOrchestrator<G: GenerationGateway + 'static> {
    gateway: Arc<G>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: GenerationGateway + 'static> SampleOrchestrator<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            cancellation_token: None,
        }
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Run with default (no-op) progress
    pub async fn run(
        &self,
        request: &SamplingRequest,
        schema: &Schema,
        params: &SamplingParams,
        stability: &dyn StabilityPredicate,
    ) -> Result<SamplingRun, RunError> {
        self.run_with_progress(request, schema, params, stability, &NoProgress)
            .await
    }

    /// Run with progress callbacks.
    ///
    /// `request` decides what is asked (samples, temperatures, prompt
    /// variants); `params` decides how it is issued (concurrency, timeout,
    /// retries, budget, early stop).
    pub async fn run_with_progress(
        &self,
        request: &SamplingRequest,
        schema: &Schema,
        params: &SamplingParams,
        stability: &dyn StabilityPredicate,
        progress: &dyn ProgressNotifier,
    ) -> Result<SamplingRun, RunError> {
        request.validate()?;
        params.validate()?;
        let budget = params.budget()?;
        check_cancelled(&self.cancellation_token)?;

        let total = request.samples;
        let batch_size = params.concurrency.min(total);
        let temperatures = request.temperature.temperatures(total);
        let system_prompt = PromptTemplate::extraction_system();
        let base_prompt = PromptTemplate::extraction(
            schema,
            request.query.content(),
            request.context.as_deref(),
        );
        let retry = RetryPolicy::from(params);

        info!(
            "Sampling {} calls for schema '{}' in batches of {}",
            total, schema.name, batch_size
        );
        progress.on_sampling_start(total);

        let mut samples: Vec<RawSample> = Vec::with_capacity(total);
        let mut ledger = CostLedger::new();
        let mut early_stopped = false;
        let mut budget_exhausted = false;
        let mut next = 0;
        let mut batch = 0;

        while next < total {
            let end = (next + batch_size).min(total);

            if !budget.allows(&ledger, end - next) {
                warn!(
                    "Budget exhausted after {} calls (${:.4} spent)",
                    ledger.calls(),
                    ledger.spent_usd()
                );
                progress.on_budget_exhausted(ledger.spent_usd());
                budget_exhausted = true;
                break;
            }

            debug!("Dispatching batch {} (samples {}..{})", batch, next, end);
            progress.on_batch_start(batch, end - next);

            let mut join_set = JoinSet::new();
            for index in next..end {
                let gateway = Arc::clone(&self.gateway);
                let call = GenerationRequest {
                    sample_index: index,
                    system_prompt: system_prompt.to_string(),
                    prompt: PromptTemplate::diversify(&base_prompt, request.diversification, index),
                    temperature: temperatures[index],
                };
                join_set.spawn(async move { Self::sample_with_retries(&gateway, call, retry).await });
            }

            let mut batch_samples = Vec::with_capacity(end - next);
            loop {
                let joined = if let Some(ref token) = self.cancellation_token {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            join_set.abort_all();
                            warn!("Sampling cancelled during batch {}", batch);
                            return Err(RunError::Cancelled);
                        }
                        result = join_set.join_next() => result,
                    }
                } else {
                    join_set.join_next().await
                };

                let Some(result) = joined else {
                    break;
                };
                match result {
                    Ok(sample) => {
                        progress.on_sample_complete(sample.index, sample.is_completed());
                        batch_samples.push(sample);
                    }
                    Err(e) => {
                        warn!("Task join error: {}", e);
                    }
                }
            }

            // A call whose task died still counts toward the run
            for index in next..end {
                if !batch_samples.iter().any(|s| s.index == index) {
                    progress.on_sample_complete(index, false);
                    batch_samples.push(RawSample::failed(
                        index,
                        "sampling task aborted",
                        temperatures[index],
                    ));
                }
            }

            for sample in &batch_samples {
                ledger.record(sample);
            }
            samples.extend(batch_samples);
            samples.sort_by_key(|s| s.index);
            next = end;
            batch += 1;

            if params.early_stop && next < total && stability.is_stable(&samples) {
                info!("Early stop after {} of {} samples", next, total);
                progress.on_early_stop(next, total);
                early_stopped = true;
                break;
            }
        }

        info!(
            "Sampling finished: {} issued, {} failed, ${:.4} spent",
            samples.len(),
            samples.iter().filter(|s| !s.is_completed()).count(),
            ledger.spent_usd()
        );
        progress.on_sampling_complete(samples.len());

        Ok(SamplingRun {
            samples,
            ledger,
            requested: total,
            early_stopped,
            budget_exhausted,
        })
    }

    /// One call with per-attempt timeout and exponential backoff
    async fn sample_with_retries(
        gateway: &G,
        request: GenerationRequest,
        retry: RetryPolicy,
    ) -> RawSample {
        let index = request.sample_index;
        let mut delay = retry.backoff;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let outcome = match tokio::time::timeout(retry.timeout, gateway.generate(&request)).await
            {
                Ok(result) => result,
                Err(_) => Err(GatewayError::Timeout),
            };

            match outcome {
                Ok(generation) => {
                    return RawSample::completed(index, generation.text, request.temperature)
                        .with_usage(generation.usage, generation.cost_usd)
                        .with_attempts(attempts);
                }
                Err(e) if e.is_retryable() && attempts <= retry.max_retries => {
                    warn!(
                        "Sample {} attempt {} failed: {}; retrying",
                        index, attempts, e
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    delay = delay.saturating_mul(2);
                }
                Err(e) => {
                    warn!("Sample {} failed after {} attempts: {}", index, attempts, e);
                    return RawSample::failed(index, e.to_string(), request.temperature)
                        .with_attempts(attempts);
                }
            }
        }
    }
}
