//! # harvest-skills
//!
//! Skill artifacts and their lifecycle. A skill is a directory holding a
//! SKILL.md (frontmatter metadata + Markdown instructions) plus companion
//! EXAMPLES.md and TROUBLESHOOTING.md documents.
//!
//! Skills are created by the external analyzer; this crate owns everything
//! that happens afterwards: cataloging the active set, scoring
//! name similarity to catch duplicates, tracking usage per processed
//! transcript, and consolidating-then-retiring skills that stop being used.

pub mod catalog;
pub mod metadata;
pub mod retire;
pub mod similarity;
pub mod usage;

pub use catalog::SkillCatalog;
pub use metadata::SkillMetadata;
pub use retire::{RetirementManager, RetirementReport};
pub use similarity::{SimilarityMatch, find_strict, find_wide, jaccard, prefix_count};
pub use usage::{UsageReport, track_transcript};
