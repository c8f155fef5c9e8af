use harvest_config::HarvestConfig;
use harvest_core::HarvestPaths;
use std::path::Path;
use tracing::info;

/// Create the on-disk layout: state dir with an empty state file, transcript
/// and skills roots, and a default harvest.toml if none exists yet.
pub fn cmd_init(
    config: HarvestConfig,
    paths: HarvestPaths,
    config_path: &Path,
) -> harvest_core::Result<()> {
    std::fs::create_dir_all(&paths.state_dir)?;
    std::fs::create_dir_all(&paths.transcript_root)?;
    std::fs::create_dir_all(&paths.skills_root)?;
    harvest_state::store::init(&paths.state_dir)?;

    if config_path.exists() {
        info!(path = %config_path.display(), "config file already exists, leaving it");
    } else {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(&config)
            .map_err(|e| harvest_core::HarvestError::Config(e.to_string()))?;
        std::fs::write(config_path, rendered)?;
        println!("Wrote default config to {}", config_path.display());
    }

    println!("State dir:       {}", paths.state_dir.display());
    println!("Transcript root: {}", paths.transcript_root.display());
    println!("Skills root:     {}", paths.skills_root.display());
    Ok(())
}
