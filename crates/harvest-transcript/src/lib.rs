//! # harvest-transcript
//!
//! Transcript intake: recursive discovery under the transcript root,
//! candidate filtering against the processing state, and the preprocessing
//! transform that shrinks a transcript to fit the analyzer's token budget.

pub mod discover;
pub mod filter;
pub mod preprocess;

pub use discover::{DiscoveryOptions, discover};
pub use filter::{FilterOptions, select_candidates};
pub use preprocess::{Preprocessed, preprocess};
