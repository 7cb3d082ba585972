//! Core domain types and the evaluation pipeline.

pub mod config_validation;
pub mod enrich;
pub mod error;
pub mod evaluator;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod signal;
pub mod universe;
