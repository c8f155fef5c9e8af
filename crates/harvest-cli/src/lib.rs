//! # harvest-cli
//!
//! Command-line interface for the Harvest pipeline.
//!
//! ## Commands
//!
//! - `harvest run` — Process one batch of new transcripts
//! - `harvest retire` — Consolidate and archive unused skills
//! - `harvest status` — Show processing state and catalog counts
//! - `harvest skills` — List skills, check for near-duplicate names
//! - `harvest config` — Show effective configuration
//! - `harvest init` — Create the state directory and a default config

pub mod commands;

pub use commands::Cli;
