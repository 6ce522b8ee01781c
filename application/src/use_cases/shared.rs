//! Shared utilities for use cases.

use super::error::RunError;
use concord_domain::RawSample;
use concord_domain::util::{normalize_whitespace, truncate_str};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const PREVIEW_BYTES: usize = 120;

/// Check if cancellation has been requested.
///
/// Returns `Err(RunError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), RunError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(RunError::Cancelled);
    }
    Ok(())
}

/// Milliseconds elapsed, saturating
pub(crate) fn elapsed_ms(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Warn about samples that produced no usable field, with a text preview at debug level
pub(crate) fn log_discarded(samples: &[RawSample], discarded: &[usize]) {
    if discarded.is_empty() {
        return;
    }
    warn!(
        "Discarded {} samples with no usable fields: {:?}",
        discarded.len(),
        discarded
    );
    for sample in samples.iter().filter(|s| discarded.contains(&s.index)) {
        if let Some(text) = sample.text() {
            let flat = normalize_whitespace(text);
            debug!("Sample {}: {}", sample.index, truncate_str(&flat, PREVIEW_BYTES));
        }
    }
}
