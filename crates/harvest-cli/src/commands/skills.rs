use harvest_core::HarvestPaths;
use harvest_skills::{SkillCatalog, find_wide};

pub fn cmd_list(paths: HarvestPaths) -> harvest_core::Result<()> {
    let catalog = SkillCatalog::load(&paths.skills_root)?;
    if catalog.is_empty() {
        println!("No active skills under {}", paths.skills_root.display());
        return Ok(());
    }

    for skill in catalog.active() {
        println!(
            "{:<40} v{:<8} used {:<4} idle {:<4} {}",
            skill.name,
            skill.version,
            skill.usage_count,
            skill.sessions_since_use,
            skill.last_used.as_deref().unwrap_or("never"),
        );
    }
    Ok(())
}

/// The duplicate check run before creating a new skill: deliberately wide,
/// a human reviews the hits.
pub fn cmd_similar(paths: HarvestPaths, name: &str) -> harvest_core::Result<()> {
    let catalog = SkillCatalog::load(&paths.skills_root)?;
    let matches = find_wide(name, &catalog.names());

    if matches.is_empty() {
        println!("No similar skills found for \"{name}\".");
        return Ok(());
    }
    println!("Possible duplicates of \"{name}\":");
    for m in matches {
        println!(
            "  {:<40} jaccard {:.2}  shared prefix {}",
            m.name, m.jaccard, m.prefix
        );
    }
    Ok(())
}
