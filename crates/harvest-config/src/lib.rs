//! # harvest-config
//!
//! Configuration system for Harvest (`harvest.toml`).
//!
//! All keys are optional; defaults are tuned so a fresh install works with an
//! empty (or missing) config file.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{
    AnalyzerConfig, HarvestConfig, IntakeConfig, LoggingConfig, PathsConfig, RetirementConfig,
};
