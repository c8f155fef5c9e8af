use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::catalog::{RETIRED_DIR, SkillCatalog};
use crate::metadata::SkillMetadata;
use crate::similarity::find_strict;

/// Marker heading before which consolidated content is inserted, when the
/// target document has one.
const VERSION_HISTORY_MARKER: &str = "## Version History";

/// How many lines of the Instructions section count as the key-insight
/// excerpt carried over during consolidation.
const KEY_INSIGHT_MAX_LINES: usize = 10;

/// Outcome of one retirement pass.
#[derive(Debug, Default)]
pub struct RetirementReport {
    /// Active skills examined.
    pub scanned: usize,
    /// Skills moved to the holding area.
    pub retired: Vec<String>,
    /// (source, target) pairs where content was merged before the move.
    pub consolidated: Vec<(String, String)>,
    /// Skills that could not be moved. Logged and left in place.
    pub failures: Vec<String>,
}

/// Retires skills whose `sessions_since_use` strictly exceeds the threshold,
/// consolidating salvageable content into the most similar surviving skill
/// first. Consolidation is best-effort: a skill with no similar neighbor is
/// still retired, and a failure on one skill never aborts the rest.
pub struct RetirementManager {
    skills_root: PathBuf,
}

impl RetirementManager {
    pub fn new(skills_root: &Path) -> Self {
        Self {
            skills_root: skills_root.to_path_buf(),
        }
    }

    /// Run one retirement pass over the active catalog.
    pub fn run(&self, threshold: u64) -> harvest_core::Result<RetirementReport> {
        let catalog = SkillCatalog::load(&self.skills_root)?;
        let mut report = RetirementReport {
            scanned: catalog.len(),
            ..Default::default()
        };

        // Strict inequality: a skill sitting exactly at the threshold stays.
        let stale: Vec<SkillMetadata> = catalog
            .active()
            .iter()
            .filter(|s| s.sessions_since_use > threshold)
            .cloned()
            .collect();

        for skill in stale {
            let others: Vec<String> = catalog
                .names()
                .into_iter()
                .filter(|n| *n != skill.name)
                .collect();

            let target_name = find_strict(&skill.name, &others)
                .into_iter()
                .next()
                .map(|m| m.name);

            if let Some(target_name) = &target_name {
                match catalog.get(target_name) {
                    Some(target) => {
                        if let Err(e) = consolidate(&skill, target) {
                            warn!(
                                source = %skill.name,
                                target = %target_name,
                                error = %e,
                                "consolidation failed, retiring without merge"
                            );
                        } else {
                            info!(source = %skill.name, target = %target_name, "consolidated skill content");
                            report
                                .consolidated
                                .push((skill.name.clone(), target_name.clone()));
                        }
                    }
                    None => {
                        warn!(target = %target_name, "similarity target missing from catalog");
                    }
                }
            }

            match self.archive(&skill) {
                Ok(dest) => {
                    info!(
                        skill = %skill.name,
                        idle_sessions = skill.sessions_since_use,
                        dest = %dest.display(),
                        "retired skill"
                    );
                    report.retired.push(skill.name.clone());
                }
                Err(e) => {
                    warn!(skill = %skill.name, error = %e, "failed to retire skill");
                    report.failures.push(skill.name.clone());
                }
            }
        }

        Ok(report)
    }

    /// Move the skill's whole directory into the holding area. On a name
    /// collision, disambiguate with a date suffix.
    fn archive(&self, skill: &SkillMetadata) -> harvest_core::Result<PathBuf> {
        let holding = self.skills_root.join(RETIRED_DIR);
        std::fs::create_dir_all(&holding)?;

        let mut dest = holding.join(&skill.name);
        if dest.exists() {
            dest = holding.join(format!("{}-{}", skill.name, Utc::now().format("%Y%m%d")));
        }
        if dest.exists() {
            dest = holding.join(format!(
                "{}-{}",
                skill.name,
                Utc::now().format("%Y%m%d-%H%M%S")
            ));
        }

        std::fs::rename(&skill.base_dir, &dest)?;
        Ok(dest)
    }
}

/// Merge salvageable content from a retiring skill into the target:
/// the Failed Attempts table and a leading key-insight excerpt go into the
/// target SKILL.md; the companion troubleshooting and examples documents are
/// appended to the target's counterparts. Every piece is independently
/// optional.
fn consolidate(source: &SkillMetadata, target: &SkillMetadata) -> harvest_core::Result<()> {
    let date = Utc::now().format("%Y-%m-%d");
    let tag = format!("## Consolidated from {} ({date})", source.name);

    let mut skill_md_addition = String::new();
    if let Some(table) = extract_section(&source.body, "## Failed Attempts") {
        skill_md_addition.push_str(&format!("\n### Failed attempts\n\n{table}\n"));
    }
    if let Some(insight) = key_insight(&source.body) {
        skill_md_addition.push_str(&format!("\n### Key insight\n\n{insight}\n"));
    }
    if !skill_md_addition.is_empty() {
        append_to_document(
            &target.file_path,
            &format!("\n{tag}\n{skill_md_addition}"),
        )?;
    }

    for companion in ["TROUBLESHOOTING.md", "EXAMPLES.md"] {
        let source_doc = source.base_dir.join(companion);
        let content = match std::fs::read_to_string(&source_doc) {
            Ok(c) if !c.trim().is_empty() => c,
            _ => continue,
        };
        append_to_document(
            &target.base_dir.join(companion),
            &format!("\n{tag}\n\n{}\n", content.trim()),
        )?;
    }

    Ok(())
}

/// Append `addition` to a document, inserting before a trailing
/// `## Version History` marker when one exists. A missing document is
/// created.
fn append_to_document(path: &Path, addition: &str) -> harvest_core::Result<()> {
    let existing = std::fs::read_to_string(path).unwrap_or_default();

    let merged = match existing.rfind(VERSION_HISTORY_MARKER) {
        Some(pos) => {
            let (head, tail) = existing.split_at(pos);
            format!("{}{}\n{}", head.trim_end(), addition, tail)
        }
        None => format!("{}{}", existing, addition),
    };

    std::fs::write(path, merged)?;
    Ok(())
}

/// Extract one `## `-level section (heading excluded) from a Markdown body.
fn extract_section(body: &str, heading: &str) -> Option<String> {
    let start = body.find(heading)?;
    let after_heading = &body[start + heading.len()..];
    let end = after_heading.find("\n## ").unwrap_or(after_heading.len());
    let section = after_heading[..end].trim();
    if section.is_empty() {
        None
    } else {
        Some(section.to_string())
    }
}

/// Leading excerpt of the Instructions section: the first paragraph, capped
/// at a few lines.
fn key_insight(body: &str) -> Option<String> {
    let section = extract_section(body, "## Instructions")?;
    let excerpt: Vec<&str> = section
        .lines()
        .take_while(|l| !l.trim().is_empty())
        .take(KEY_INSIGHT_MAX_LINES)
        .collect();
    if excerpt.is_empty() {
        None
    } else {
        Some(excerpt.join("\n"))
    }
}
