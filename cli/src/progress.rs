//! Progress reporting through tracing events

use concord_application::ProgressNotifier;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

/// Emits one event per sampling milestone; visible from `-v`
#[derive(Default)]
pub struct TracingProgress {
    total: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressNotifier for TracingProgress {
    fn on_sampling_start(&self, total_samples: usize) {
        self.total.store(total_samples, Ordering::Relaxed);
        self.completed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        info!("Sampling {} generations", total_samples);
    }

    fn on_batch_start(&self, batch: usize, size: usize) {
        info!("Batch {} ({} samples)", batch + 1, size);
    }

    fn on_sample_complete(&self, index: usize, success: bool) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        if success {
            info!("[{}/{}] sample {} ok", done, total, index);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
            warn!("[{}/{}] sample {} failed", done, total, index);
        }
    }

    fn on_early_stop(&self, samples_used: usize, samples_requested: usize) {
        info!(
            "Answer stable after {}/{} samples, stopping early",
            samples_used, samples_requested
        );
    }

    fn on_budget_exhausted(&self, spent_usd: f64) {
        warn!("Cost budget reached at ${:.4}", spent_usd);
    }

    fn on_sampling_complete(&self, samples_used: usize) {
        info!(
            "Sampling complete: {} used, {} failed",
            samples_used,
            self.failed.load(Ordering::Relaxed)
        );
    }
}
