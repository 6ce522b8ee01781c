//! Cost accounting, budgets and early-stop predicates

pub mod ledger;
pub mod stability;

pub use ledger::{Budget, CostLedger};
pub use stability::{ConfidenceStability, NeverStable, StabilityPredicate};
