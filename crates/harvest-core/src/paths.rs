use std::path::{Path, PathBuf};

/// Resolved filesystem roots for a pipeline run.
///
/// The three roots are independent so tests (and unusual installs) can point
/// them anywhere, but the defaults all hang off `~/.harvest/`.
#[derive(Debug, Clone)]
pub struct HarvestPaths {
    /// Directory holding the state file, the lock directory, and run artifacts.
    pub state_dir: PathBuf,
    /// Root under which session transcripts are discovered.
    pub transcript_root: PathBuf,
    /// Root of the skill artifact tree. `retired/` lives underneath it.
    pub skills_root: PathBuf,
}

impl HarvestPaths {
    /// Resolve a root: explicit path > env var > `~/.harvest/<leaf>`.
    pub fn resolve(explicit: Option<&Path>, env_var: &str, leaf: &str) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var(env_var) {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".harvest")
            .join(leaf)
    }

    /// Default layout: everything under `~/.harvest/`.
    pub fn resolve_default(
        state_dir: Option<&Path>,
        transcript_root: Option<&Path>,
        skills_root: Option<&Path>,
    ) -> Self {
        Self {
            state_dir: Self::resolve(state_dir, "HARVEST_STATE_DIR", "state"),
            transcript_root: Self::resolve(transcript_root, "HARVEST_TRANSCRIPTS", "transcripts"),
            skills_root: Self::resolve(skills_root, "HARVEST_SKILLS", "skills"),
        }
    }

    /// The segregated holding area for retired skills.
    pub fn retired_dir(&self) -> PathBuf {
        self.skills_root.join("retired")
    }
}
