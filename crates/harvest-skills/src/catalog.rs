use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::metadata::SkillMetadata;

/// Name of the holding area for retired skills, directly under the skills
/// root. Anything beneath it is no longer active.
pub const RETIRED_DIR: &str = "retired";

/// The active skill catalog — every directory under the skills root that
/// contains a SKILL.md, excluding the retired holding area.
pub struct SkillCatalog {
    skills: Vec<SkillMetadata>,
    skills_root: PathBuf,
}

impl SkillCatalog {
    /// Scan the skills root. A missing root yields an empty catalog; a skill
    /// whose SKILL.md fails to parse is logged and skipped, never fatal.
    pub fn load(skills_root: &Path) -> harvest_core::Result<Self> {
        let mut skills = Vec::new();

        if !skills_root.exists() {
            debug!(root = %skills_root.display(), "skills root does not exist, empty catalog");
            return Ok(Self {
                skills,
                skills_root: skills_root.to_path_buf(),
            });
        }

        let entries = std::fs::read_dir(skills_root).map_err(|e| {
            harvest_core::HarvestError::Skill(format!(
                "failed to read skills root {}: {}",
                skills_root.display(),
                e
            ))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| harvest_core::HarvestError::Skill(e.to_string()))?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }
            if path.file_name().is_some_and(|n| n == RETIRED_DIR) {
                continue;
            }

            let skill_md = path.join("SKILL.md");
            if !skill_md.exists() {
                continue;
            }
            match SkillMetadata::from_file(&skill_md) {
                Ok(skill) => {
                    debug!(skill = %skill.name, "loaded skill");
                    skills.push(skill);
                }
                Err(e) => {
                    warn!(path = %skill_md.display(), error = %e, "failed to load skill");
                }
            }
        }

        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self {
            skills,
            skills_root: skills_root.to_path_buf(),
        })
    }

    /// All active skills, sorted by name.
    pub fn active(&self) -> &[SkillMetadata] {
        &self.skills
    }

    /// Names of all active skills.
    pub fn names(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name.clone()).collect()
    }

    /// Look up an active skill by name.
    pub fn get(&self, name: &str) -> Option<&SkillMetadata> {
        self.skills.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// The skills root this catalog was loaded from.
    pub fn root(&self) -> &Path {
        &self.skills_root
    }

    /// Count of skill directories in the retired holding area.
    pub fn retired_count(&self) -> usize {
        let retired = self.skills_root.join(RETIRED_DIR);
        match std::fs::read_dir(&retired) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .count(),
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_skill(root: &Path, name: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("SKILL.md"),
            format!("---\nname: {name}\ndescription: test skill\n---\n\nBody."),
        )
        .unwrap();
    }

    #[test]
    fn missing_root_is_empty() {
        let catalog = SkillCatalog::load(Path::new("/nonexistent/skills")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn loads_active_skills_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "zebra-handling");
        write_skill(dir.path(), "api-retry");

        let catalog = SkillCatalog::load(dir.path()).unwrap();
        assert_eq!(catalog.names(), vec!["api-retry", "zebra-handling"]);
        assert!(catalog.get("api-retry").is_some());
        assert!(catalog.get("unknown").is_none());
    }

    #[test]
    fn retired_skills_are_not_active() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "live-skill");
        write_skill(&dir.path().join(RETIRED_DIR), "dead-skill");

        let catalog = SkillCatalog::load(dir.path()).unwrap();
        assert_eq!(catalog.names(), vec!["live-skill"]);
        assert_eq!(catalog.retired_count(), 1);
    }

    #[test]
    fn unparsable_skill_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "good-skill");
        let bad = dir.path().join("bad-skill");
        std::fs::create_dir_all(&bad).unwrap();
        std::fs::write(bad.join("SKILL.md"), "no frontmatter here").unwrap();

        let catalog = SkillCatalog::load(dir.path()).unwrap();
        assert_eq!(catalog.names(), vec!["good-skill"]);
    }

    #[test]
    fn directories_without_skill_md_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "real-skill");
        std::fs::create_dir_all(dir.path().join("scratch")).unwrap();

        let catalog = SkillCatalog::load(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
    }
}
