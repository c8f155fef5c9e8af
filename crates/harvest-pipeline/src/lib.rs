//! # harvest-pipeline
//!
//! The batch orchestrator: wires discovery, filtering, locking, state
//! transitions, preprocessing, and the external analyzer into the
//! per-invocation control flow, plus the post-batch usage tracking pass.

pub mod analyzer;
pub mod runner;

pub use analyzer::Analyzer;
pub use runner::{BatchRunner, RunReport};
