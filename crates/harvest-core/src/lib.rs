//! # harvest-core
//!
//! Core error types and path resolution for the Harvest pipeline.
//! This crate defines the shared vocabulary used by every other crate in the workspace.

pub mod error;
pub mod paths;

pub use error::{HarvestError, Result};
pub use paths::HarvestPaths;
