//! # harvest-state
//!
//! Durable processing state for the transcript pipeline.
//!
//! Two primitives live here:
//! - [`store`] — the transcript → status map, persisted as a JSON snapshot
//!   and mutated only through atomic temp-write-then-rename.
//! - [`lock`] — directory-based mutual exclusion so at most one batch runs
//!   per state directory across invocations.

pub mod lock;
pub mod store;

pub use lock::{LockGuard, acquire, release};
pub use store::{StateSnapshot, TranscriptRecord, TranscriptStatus};
