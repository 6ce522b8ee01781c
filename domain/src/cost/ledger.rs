//! Cost accounting for one sampling run

use crate::core::error::DomainError;
use crate::sampling::{RawSample, TokenUsage};
use serde::Serialize;

/// Accumulated spend; single writer, append only
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostLedger {
    spent_usd: f64,
    calls: usize,
    tokens: TokenUsage,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: &RawSample) {
        self.spent_usd += sample.cost_usd;
        self.tokens += sample.usage;
        self.calls += 1;
    }

    pub fn spent_usd(&self) -> f64 {
        self.spent_usd
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn tokens(&self) -> TokenUsage {
        self.tokens
    }

    pub fn average_cost(&self) -> Option<f64> {
        (self.calls > 0).then(|| self.spent_usd / self.calls as f64)
    }

    /// Projected spend of calls never issued
    pub fn cost_saved(&self, requested: usize) -> f64 {
        let skipped = requested.saturating_sub(self.calls);
        self.average_cost().unwrap_or(0.0) * skipped as f64
    }
}

/// Optional spend ceiling
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Budget {
    max_cost_usd: Option<f64>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn new(max_cost_usd: Option<f64>) -> Result<Self, DomainError> {
        if let Some(max) = max_cost_usd
            && (!max.is_finite() || max <= 0.0)
        {
            return Err(DomainError::config(format!(
                "max_cost_usd must be positive, got {max}"
            )));
        }
        Ok(Self { max_cost_usd })
    }

    pub fn max_cost_usd(&self) -> Option<f64> {
        self.max_cost_usd
    }

    /// Whether `calls` more calls fit, projecting from the average so far.
    ///
    /// With no history the first batch is always allowed.
    pub fn allows(&self, ledger: &CostLedger, calls: usize) -> bool {
        let Some(max) = self.max_cost_usd else {
            return true;
        };
        match ledger.average_cost() {
            Some(avg) => ledger.spent_usd() + avg * calls as f64 <= max,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(cost: f64) -> RawSample {
        RawSample::completed(0, "{}", 0.7).with_usage(TokenUsage::new(100, 50), cost)
    }

    #[test]
    fn test_ledger_accumulates() {
        let mut ledger = CostLedger::new();
        ledger.record(&sample(0.01));
        ledger.record(&sample(0.03));
        assert_eq!(ledger.calls(), 2);
        assert!((ledger.spent_usd() - 0.04).abs() < 1e-12);
        assert_eq!(ledger.tokens().total(), 300);
        assert!((ledger.cost_saved(5) - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_cost_saved_empty_ledger() {
        assert_eq!(CostLedger::new().cost_saved(5), 0.0);
    }

    #[test]
    fn test_budget_projection() {
        let budget = Budget::new(Some(0.05)).unwrap();
        let mut ledger = CostLedger::new();
        assert!(budget.allows(&ledger, 3));
        ledger.record(&sample(0.02));
        assert!(budget.allows(&ledger, 1));
        assert!(!budget.allows(&ledger, 2));
        assert!(Budget::unlimited().allows(&ledger, 1000));
    }

    #[test]
    fn test_budget_rejects_non_positive() {
        assert!(Budget::new(Some(0.0)).is_err());
        assert!(Budget::new(None).is_ok());
    }
}
