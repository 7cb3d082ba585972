//! smacross: moving-average crossover strategy evaluator.
//!
//! Hexagonal layout: the pure evaluation core lives in [`domain`], port traits
//! in [`ports`], file-backed implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
