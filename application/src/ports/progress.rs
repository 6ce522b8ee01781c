//! Progress notification port
//!
//! Defines the interface for reporting progress during a sampling run.

/// Callback for progress updates during sampling
///
/// Implementations live in the outer layers and can display progress in
/// various ways (log lines, a progress bar, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called once before the first batch is dispatched
    fn on_sampling_start(&self, total_samples: usize);

    /// Called when a batch of calls is dispatched
    fn on_batch_start(&self, _batch: usize, _size: usize) {}

    /// Called when one sample finishes, after retries
    fn on_sample_complete(&self, index: usize, success: bool);

    /// Called when the stability predicate halts sampling
    fn on_early_stop(&self, _samples_used: usize, _samples_requested: usize) {}

    /// Called when the cost budget halts sampling
    fn on_budget_exhausted(&self, _spent_usd: f64) {}

    /// Called once after the last batch
    fn on_sampling_complete(&self, samples_used: usize);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_sampling_start(&self, _total_samples: usize) {}
    fn on_sample_complete(&self, _index: usize, _success: bool) {}
    fn on_sampling_complete(&self, _samples_used: usize) {}
}
