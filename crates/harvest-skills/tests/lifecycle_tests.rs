//! The post-creation skill lifecycle end to end: usage tracking drives the
//! idle counters that the retirement pass consumes.

use harvest_skills::{RetirementManager, SkillCatalog, SkillMetadata, track_transcript};
use std::path::Path;

fn write_skill(root: &Path, name: &str, body: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("SKILL.md"),
        format!("---\nname: {name}\ndescription: test\n---\n\n{body}"),
    )
    .unwrap();
}

fn load(root: &Path, name: &str) -> SkillMetadata {
    SkillMetadata::from_file(&root.join(name).join("SKILL.md")).unwrap()
}

#[test]
fn idle_sessions_accumulate_until_retirement() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_skill(root, "sql-migration-plan", "## Instructions\n\nPlan first.\n");
    write_skill(root, "api-pagination", "## Instructions\n\nCursor over offset.\n");

    // Three sessions mention pagination, never migrations
    for _ in 0..3 {
        track_transcript(root, "paginate with api-pagination cursors").unwrap();
    }

    assert_eq!(load(root, "sql-migration-plan").sessions_since_use, 3);
    assert_eq!(load(root, "api-pagination").sessions_since_use, 0);
    assert_eq!(load(root, "api-pagination").usage_count, 3);

    // Threshold 2: migrations (idle 3) goes, pagination stays
    let report = RetirementManager::new(root).run(2).unwrap();
    assert_eq!(report.retired, vec!["sql-migration-plan"]);

    let catalog = SkillCatalog::load(root).unwrap();
    assert_eq!(catalog.names(), vec!["api-pagination"]);
    assert_eq!(catalog.retired_count(), 1);
}

#[test]
fn use_resets_the_idle_clock() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_skill(root, "docker-layer-cache", "## Instructions\n\nOrder your COPYs.\n");

    track_transcript(root, "unrelated session").unwrap();
    track_transcript(root, "unrelated session").unwrap();
    assert_eq!(load(root, "docker-layer-cache").sessions_since_use, 2);

    track_transcript(root, "sped up builds via docker layer cache").unwrap();
    assert_eq!(load(root, "docker-layer-cache").sessions_since_use, 0);

    // A skill that was just used survives any sane threshold
    let report = RetirementManager::new(root).run(1).unwrap();
    assert!(report.retired.is_empty());
}

#[test]
fn retired_skills_stop_accumulating_counters() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_skill(root, "old-and-unused-helper", "## Instructions\n\nX.\n");

    track_transcript(root, "nothing relevant").unwrap();
    track_transcript(root, "nothing relevant").unwrap();
    RetirementManager::new(root).run(1).unwrap();

    // Now in the holding area: further tracking passes ignore it
    let report = track_transcript(root, "even old-and-unused-helper by name").unwrap();
    assert!(report.used.is_empty());
    assert_eq!(report.idle, 0);
}

#[test]
fn consolidation_carries_companion_docs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_skill(
        root,
        "git-rebase-conflicts-legacy",
        "## Instructions\n\nRebase early.\n\n## Failed Attempts\n\n| merge -X theirs | lost edits |\n",
    );
    std::fs::write(
        root.join("git-rebase-conflicts-legacy").join("EXAMPLES.md"),
        "## Interactive rebase\n\ngit rebase -i HEAD~3\n",
    )
    .unwrap();
    write_skill(root, "git-rebase-conflicts", "## Instructions\n\nCurrent doctrine.\n");

    // Age the legacy skill only
    let mut legacy = load(root, "git-rebase-conflicts-legacy");
    legacy.sessions_since_use = 9;
    legacy.save().unwrap();

    let report = RetirementManager::new(root).run(5).unwrap();
    assert_eq!(
        report.consolidated,
        vec![(
            "git-rebase-conflicts-legacy".to_string(),
            "git-rebase-conflicts".to_string()
        )]
    );

    let target_md = std::fs::read_to_string(root.join("git-rebase-conflicts/SKILL.md")).unwrap();
    assert!(target_md.contains("| merge -X theirs | lost edits |"));

    let examples =
        std::fs::read_to_string(root.join("git-rebase-conflicts/EXAMPLES.md")).unwrap();
    assert!(examples.contains("git rebase -i HEAD~3"));
    assert!(examples.contains("Consolidated from git-rebase-conflicts-legacy"));
}
