//! Core domain concepts shared across all subdomains.
//!
//! - [`query::Query`]: a validated extraction question
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod query;
