use harvest_config::HarvestConfig;
use harvest_core::HarvestPaths;
use harvest_skills::RetirementManager;
use harvest_state::LockGuard;

pub fn cmd_retire(
    config: HarvestConfig,
    paths: HarvestPaths,
    threshold: Option<u64>,
) -> harvest_core::Result<()> {
    let threshold = threshold.unwrap_or(config.retirement.threshold);

    // The retirement pass mutates the skills tree, so it takes the same batch
    // lock as `run`.
    let Some(guard) = LockGuard::try_acquire(&paths.state_dir)? else {
        println!("Another run is active; skipped.");
        return Ok(());
    };

    let report = RetirementManager::new(&paths.skills_root).run(threshold)?;
    guard.release()?;

    if report.retired.is_empty() {
        println!("No skills past the threshold ({} scanned).", report.scanned);
        return Ok(());
    }
    for (source, target) in &report.consolidated {
        println!("Consolidated {source} → {target}");
    }
    for name in &report.retired {
        println!("Retired {name}");
    }
    if !report.failures.is_empty() {
        println!("Failed to move: {}", report.failures.join(", "));
    }
    Ok(())
}
