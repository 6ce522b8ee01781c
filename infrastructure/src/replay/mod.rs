//! Recorded-generation adapter

mod gateway;

pub use gateway::{ReplayError, ReplayGateway};
