use harvest_config::HarvestConfig;
use harvest_core::HarvestPaths;
use harvest_pipeline::BatchRunner;

pub async fn cmd_run(config: HarvestConfig, paths: HarvestPaths) -> harvest_core::Result<()> {
    let report = BatchRunner::new(config, paths).run().await?;

    if report.lock_skipped {
        println!("Another run is active; skipped.");
        return Ok(());
    }
    if report.candidates == 0 {
        println!(
            "Nothing to do ({} transcript(s) in window, none new).",
            report.discovered
        );
        return Ok(());
    }
    println!(
        "Batch complete: {} analyzed, {} failed (of {} candidate(s)).",
        report.completed, report.failed, report.candidates
    );
    Ok(())
}
