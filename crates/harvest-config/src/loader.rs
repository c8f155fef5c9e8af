use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::schema::HarvestConfig;

/// Loads the Harvest configuration.
///
/// Every pipeline invocation is short-lived, so the config is read once at
/// startup; there is no hot-reload watcher.
pub struct ConfigLoader {
    config: Arc<RwLock<HarvestConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > HARVEST_CONFIG env > ~/.harvest/harvest.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("HARVEST_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".harvest")
            .join("harvest.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> harvest_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            toml::from_str::<HarvestConfig>(&raw).map_err(|e| {
                harvest_core::HarvestError::Config(format!(
                    "failed to parse {}: {}",
                    config_path.display(),
                    e
                ))
            })?
        } else {
            info!(?config_path, "config file not found, using defaults");
            HarvestConfig::default()
        };

        // Apply environment variable overrides
        let config = Self::apply_env_overrides(config);

        // Validate config — log warnings, fail on errors
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(harvest_core::HarvestError::Config(e));
            }
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> HarvestConfig {
        self.config.read().clone()
    }

    /// Path the config was loaded from (or would be written to).
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides (HARVEST_BATCH_SIZE, HARVEST_ANALYZER_CMD, etc.)
    fn apply_env_overrides(mut config: HarvestConfig) -> HarvestConfig {
        if let Ok(v) = std::env::var("HARVEST_BATCH_SIZE") {
            if let Ok(n) = v.parse::<usize>() {
                config.intake.batch_size = n;
            }
        }
        if let Ok(v) = std::env::var("HARVEST_LOOKBACK_HOURS") {
            if let Ok(n) = v.parse::<u64>() {
                config.intake.lookback_hours = n;
            }
        }
        if let Ok(v) = std::env::var("HARVEST_ANALYZER_CMD") {
            config.analyzer.command = v;
        }
        if let Ok(v) = std::env::var("HARVEST_RETIREMENT_THRESHOLD") {
            if let Ok(n) = v.parse::<u64>() {
                config.retirement.threshold = n;
            }
        }
        if let Ok(v) = std::env::var("HARVEST_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("HARVEST_SAVE_OUTPUT") {
            config.analyzer.save_output = matches!(v.as_str(), "1" | "true" | "yes");
        }
        config
    }
}
