use harvest_core::HarvestPaths;
use harvest_skills::SkillCatalog;
use harvest_state::{TranscriptStatus, store};

pub fn cmd_status(paths: HarvestPaths, json: bool) -> harvest_core::Result<()> {
    let snapshot = store::read(&paths.state_dir)?.unwrap_or_default();
    let catalog = SkillCatalog::load(&paths.skills_root)?;

    let in_progress = snapshot.count(TranscriptStatus::InProgress);
    let completed = snapshot.count(TranscriptStatus::Completed);
    let failed = snapshot.count(TranscriptStatus::Failed);

    if json {
        let out = serde_json::json!({
            "transcripts": {
                "in_progress": in_progress,
                "completed": completed,
                "failed": failed,
            },
            "skills": {
                "active": catalog.len(),
                "retired": catalog.retired_count(),
            },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Transcripts: {completed} completed, {failed} failed, {in_progress} in progress");
    if in_progress > 0 {
        // There is no automatic recovery for these; surface them so an
        // operator can investigate a run that died mid-analysis.
        for (identity, record) in &snapshot.transcripts {
            if record.status == TranscriptStatus::InProgress {
                println!(
                    "  in progress since {}: {identity}",
                    record.started_at.as_deref().unwrap_or("unknown")
                );
            }
        }
    }
    println!(
        "Skills: {} active, {} retired",
        catalog.len(),
        catalog.retired_count()
    );
    Ok(())
}
