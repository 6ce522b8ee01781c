//! Batch results shared by the extract and mine use cases

use super::error::RunError;
use concord_domain::{ConsensusResult, MiningResult, SchemaRef, TokenUsage};
use serde::Serialize;

/// Spend reported by one run
pub trait RunCost {
    fn cost_usd(&self) -> f64;
    fn tokens_used(&self) -> TokenUsage;
}

impl RunCost for ConsensusResult {
    fn cost_usd(&self) -> f64 {
        self.cost_usd
    }

    fn tokens_used(&self) -> TokenUsage {
        self.tokens_used
    }
}

impl RunCost for MiningResult {
    fn cost_usd(&self) -> f64 {
        self.cost_usd
    }

    fn tokens_used(&self) -> TokenUsage {
        self.tokens_used
    }
}

/// A successful query of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry<T> {
    /// Position of the query in the batch input
    pub index: usize,
    pub result: T,
}

/// A failed query of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub index: usize,
    pub error: String,
}

/// Per-query outcomes of a batch, in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult<T> {
    pub results: Vec<BatchEntry<T>>,
    pub failures: Vec<BatchFailure>,
    /// Spend of the successful queries
    pub total_cost_usd: f64,
    pub total_tokens: TokenUsage,
}

pub type BatchConsensusResult = BatchResult<ConsensusResult>;
pub type BatchMiningResult = BatchResult<MiningResult>;

impl<T: RunCost> BatchResult<T> {
    /// Fold ordered outcomes; a cancellation anywhere cancels the batch
    pub(crate) fn collect(outcomes: Vec<(usize, Result<T, RunError>)>) -> Result<Self, RunError> {
        let mut batch = BatchResult {
            results: Vec::new(),
            failures: Vec::new(),
            total_cost_usd: 0.0,
            total_tokens: TokenUsage::default(),
        };
        for (index, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    batch.total_cost_usd += result.cost_usd();
                    batch.total_tokens += result.tokens_used();
                    batch.results.push(BatchEntry { index, result });
                }
                Err(RunError::Cancelled) => return Err(RunError::Cancelled),
                Err(e) => batch.failures.push(BatchFailure {
                    index,
                    error: e.to_string(),
                }),
            }
        }
        Ok(batch)
    }
}

impl<T> BatchResult<T> {
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Result of the query at `index`, if it succeeded
    pub fn get(&self, index: usize) -> Option<&T> {
        self.results
            .iter()
            .find(|entry| entry.index == index)
            .map(|entry| &entry.result)
    }
}

/// Pair each query with its schema; a single schema is broadcast
pub(crate) fn pair_schemas<Q>(
    queries: Vec<Q>,
    schemas: Vec<SchemaRef>,
) -> Result<Vec<(Q, SchemaRef)>, RunError> {
    match schemas.len() {
        1 => {
            let schema = &schemas[0];
            Ok(queries.into_iter().map(|q| (q, schema.clone())).collect())
        }
        n if n == queries.len() => Ok(queries.into_iter().zip(schemas).collect()),
        n => Err(RunError::Configuration(format!(
            "{} schemas given for {} queries",
            n,
            queries.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_schema_is_broadcast() {
        let pairs = pair_schemas(vec!["a", "b", "c"], vec![SchemaRef::from("risk")]).unwrap();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|(_, s)| *s == SchemaRef::from("risk")));
    }

    #[test]
    fn test_schema_count_mismatch() {
        let err = pair_schemas(
            vec!["a", "b", "c"],
            vec![SchemaRef::from("risk"), SchemaRef::from("estimate")],
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Spend(f64);

    impl RunCost for Spend {
        fn cost_usd(&self) -> f64 {
            self.0
        }

        fn tokens_used(&self) -> TokenUsage {
            TokenUsage::new(10, 5)
        }
    }

    #[test]
    fn test_collect_totals_successes_only() {
        let batch = BatchResult::collect(vec![
            (0, Ok(Spend(0.02))),
            (1, Err(RunError::InsufficientSamples { usable: 0, required: 2 })),
            (2, Ok(Spend(0.03))),
        ])
        .unwrap();

        assert_eq!(batch.succeeded(), 2);
        assert_eq!(batch.failed(), 1);
        assert!((batch.total_cost_usd - 0.05).abs() < 1e-12);
        assert_eq!(batch.total_tokens.total(), 30);
        assert_eq!(batch.get(2), Some(&Spend(0.03)));
        assert!(batch.get(1).is_none());
        assert_eq!(batch.failures[0].index, 1);

        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["results"][1]["index"], 2);
        assert_eq!(json["failures"][0]["index"], 1);
    }

    #[test]
    fn test_cancellation_cancels_batch() {
        let outcome = BatchResult::collect(vec![(0, Ok(Spend(0.01))), (1, Err(RunError::Cancelled))]);
        assert_eq!(outcome.unwrap_err(), RunError::Cancelled);
    }
}
