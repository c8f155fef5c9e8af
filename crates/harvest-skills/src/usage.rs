use chrono::Utc;
use regex::RegexBuilder;
use std::path::Path;
use tracing::{debug, warn};

use crate::catalog::SkillCatalog;

/// Outcome of one usage-tracking pass over a single transcript.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UsageReport {
    /// Skills whose name was found in the transcript.
    pub used: Vec<String>,
    /// Skills not referenced; their idle counter was incremented.
    pub idle: usize,
}

/// Update every active skill's usage counters against one transcript.
///
/// The match pattern is the skill name, case-insensitive, with whitespace
/// accepted in place of hyphens — prose references like "the rust test mock
/// approach" count. One scan of the content per skill, so cost is
/// O(activeSkills × transcriptSize).
pub fn track_transcript(skills_root: &Path, content: &str) -> harvest_core::Result<UsageReport> {
    let catalog = SkillCatalog::load(skills_root)?;
    let mut report = UsageReport::default();

    for skill in catalog.active() {
        let pattern = match name_pattern(&skill.name) {
            Ok(p) => p,
            Err(e) => {
                warn!(skill = %skill.name, error = %e, "skipping skill with unbuildable pattern");
                continue;
            }
        };

        let mut updated = skill.clone();
        if pattern.is_match(content) {
            updated.usage_count += 1;
            updated.sessions_since_use = 0;
            updated.last_used = Some(Utc::now().format("%Y-%m-%d").to_string());
            report.used.push(skill.name.clone());
            debug!(skill = %skill.name, usage_count = updated.usage_count, "skill referenced in transcript");
        } else {
            updated.sessions_since_use += 1;
            report.idle += 1;
        }

        if let Err(e) = updated.save() {
            warn!(skill = %skill.name, error = %e, "failed to persist usage counters");
        }
    }

    Ok(report)
}

/// Case-insensitive matcher for a hyphen-tokenized name that also accepts
/// whitespace between tokens.
fn name_pattern(name: &str) -> Result<regex::Regex, regex::Error> {
    let pattern = name
        .split('-')
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[-\s]+");
    RegexBuilder::new(&pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SkillMetadata;

    fn write_skill(root: &Path, name: &str, sessions_since_use: u64) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("SKILL.md"),
            format!(
                "---\nname: {name}\ndescription: test\nusage_count: 2\nsessions_since_use: {sessions_since_use}\n---\n\nBody."
            ),
        )
        .unwrap();
    }

    fn load(root: &Path, name: &str) -> SkillMetadata {
        SkillMetadata::from_file(&root.join(name).join("SKILL.md")).unwrap()
    }

    #[test]
    fn hyphenated_reference_matches() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "rust-test-mock", 4);

        let report =
            track_transcript(dir.path(), "let's apply rust-test-mock here").unwrap();
        assert_eq!(report.used, vec!["rust-test-mock"]);

        let skill = load(dir.path(), "rust-test-mock");
        assert_eq!(skill.usage_count, 3);
        assert_eq!(skill.sessions_since_use, 0);
        assert!(skill.last_used.is_some());
    }

    #[test]
    fn whitespace_and_case_variants_match() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "rust-test-mock", 0);

        let report =
            track_transcript(dir.path(), "We used the Rust Test  Mock approach").unwrap();
        assert_eq!(report.used, vec!["rust-test-mock"]);
    }

    #[test]
    fn unreferenced_skill_goes_idle() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "docker-compose-setup", 4);

        let report = track_transcript(dir.path(), "nothing relevant here").unwrap();
        assert!(report.used.is_empty());
        assert_eq!(report.idle, 1);

        let skill = load(dir.path(), "docker-compose-setup");
        assert_eq!(skill.usage_count, 2);
        assert_eq!(skill.sessions_since_use, 5);
    }

    #[test]
    fn each_skill_tracked_independently() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "api-retry", 1);
        write_skill(dir.path(), "sql-migration", 1);

        let report = track_transcript(dir.path(), "added api-retry logic").unwrap();
        assert_eq!(report.used, vec!["api-retry"]);
        assert_eq!(report.idle, 1);
        assert_eq!(load(dir.path(), "api-retry").sessions_since_use, 0);
        assert_eq!(load(dir.path(), "sql-migration").sessions_since_use, 2);
    }

    #[test]
    fn empty_catalog_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let report = track_transcript(dir.path(), "any content").unwrap();
        assert_eq!(report, UsageReport::default());
    }
}
