use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

/// Name of the canonical state file inside the state directory.
pub const STATE_FILE: &str = "state.json";

/// Processing status of a single transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptStatus {
    InProgress,
    Completed,
    Failed,
}

/// Per-transcript state record.
///
/// Fields irrelevant to the current status are `None` and omitted from the
/// serialized form — a completed record carries `analyzed_at` only, never a
/// stale `started_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub status: TranscriptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// The full on-disk state: a versioned map of transcript identity → record.
///
/// Snapshots are immutable values. Every transition produces a new snapshot
/// which the caller commits with [`write`]; nothing mutates in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,
    #[serde(default)]
    pub transcripts: BTreeMap<String, TranscriptRecord>,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            version: 1,
            transcripts: BTreeMap::new(),
        }
    }
}

impl StateSnapshot {
    /// Whether a transcript has been seen in any status. Failed transcripts
    /// count as seen — analyses are never retried automatically.
    pub fn contains(&self, identity: &str) -> bool {
        self.transcripts.contains_key(identity)
    }

    /// New snapshot with `identity` marked in-progress.
    pub fn mark_in_progress(&self, identity: &str) -> StateSnapshot {
        let mut next = self.clone();
        next.transcripts.insert(
            identity.to_string(),
            TranscriptRecord {
                status: TranscriptStatus::InProgress,
                started_at: Some(Utc::now().to_rfc3339()),
                analyzed_at: None,
                failed_at: None,
                exit_code: None,
            },
        );
        next
    }

    /// New snapshot with `identity` marked completed. Clears `started_at`.
    pub fn mark_completed(&self, identity: &str) -> StateSnapshot {
        let mut next = self.clone();
        next.transcripts.insert(
            identity.to_string(),
            TranscriptRecord {
                status: TranscriptStatus::Completed,
                started_at: None,
                analyzed_at: Some(Utc::now().to_rfc3339()),
                failed_at: None,
                exit_code: None,
            },
        );
        next
    }

    /// New snapshot with `identity` marked failed, preserving the analyzer
    /// exit code for diagnostics. Clears `started_at`.
    pub fn mark_failed(&self, identity: &str, exit_code: i32) -> StateSnapshot {
        let mut next = self.clone();
        next.transcripts.insert(
            identity.to_string(),
            TranscriptRecord {
                status: TranscriptStatus::Failed,
                started_at: None,
                analyzed_at: None,
                failed_at: Some(Utc::now().to_rfc3339()),
                exit_code: Some(exit_code),
            },
        );
        next
    }

    /// Count of records in the given status.
    pub fn count(&self, status: TranscriptStatus) -> usize {
        self.transcripts
            .values()
            .filter(|r| r.status == status)
            .count()
    }
}

/// Read the state file. `Ok(None)` when the file does not exist yet;
/// `Err` on malformed content so the caller can decide to reinitialize.
pub fn read(state_dir: &Path) -> harvest_core::Result<Option<StateSnapshot>> {
    let path = state_dir.join(STATE_FILE);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let snapshot = serde_json::from_str::<StateSnapshot>(&raw).map_err(|e| {
        harvest_core::HarvestError::StateMalformed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok(Some(snapshot))
}

/// Atomically persist a snapshot: serialize to a unique temp file in the same
/// directory, then rename over the canonical path. The rename is the only
/// mutation of the canonical file, so a crash at any point leaves either the
/// old or the new snapshot, never a torn one.
pub fn write(state_dir: &Path, snapshot: &StateSnapshot) -> harvest_core::Result<()> {
    std::fs::create_dir_all(state_dir)?;
    let path = state_dir.join(STATE_FILE);
    let tmp = state_dir.join(format!(
        "{}.tmp.{}.{}",
        STATE_FILE,
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));

    let json = serde_json::to_string_pretty(snapshot)?;
    if let Err(e) = std::fs::write(&tmp, json) {
        // Hard I/O fault — clean up and propagate.
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!(path = %path.display(), entries = snapshot.transcripts.len(), "state written");
    Ok(())
}

/// Ensure a readable state file exists. A missing or unparsable file is
/// replaced with the empty default snapshot; valid content is left untouched.
pub fn init(state_dir: &Path) -> harvest_core::Result<StateSnapshot> {
    match read(state_dir) {
        Ok(Some(snapshot)) => Ok(snapshot),
        Ok(None) => {
            info!(dir = %state_dir.display(), "initializing empty state file");
            let snapshot = StateSnapshot::default();
            write(state_dir, &snapshot)?;
            Ok(snapshot)
        }
        Err(harvest_core::HarvestError::StateMalformed { path, reason }) => {
            warn!(%path, %reason, "state file corrupted, reinitializing");
            let snapshot = StateSnapshot::default();
            write(state_dir, &snapshot)?;
            Ok(snapshot)
        }
        Err(e) => Err(e),
    }
}
