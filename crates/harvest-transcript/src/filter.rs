use harvest_state::StateSnapshot;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Marker phrase embedded in analyzer-generated sessions. The instructions
/// document opens with it, so any session the analyzer itself drove carries
/// the phrase in its leading records. Scanning for it keeps the pipeline
/// from analyzing its own output and looping.
pub const SELF_SESSION_MARKER: &str = "Extract reusable skills from this transcript";

/// How many leading records to scan for the marker.
const MARKER_SCAN_RECORDS: usize = 10;

/// Filename prefix used by sub-agent (child session) transcripts.
const SUBAGENT_PREFIX: &str = "agent-";

/// Knobs for candidate selection.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Stop once this many qualifying candidates are collected.
    pub batch_size: usize,
    /// Minimum non-blank lines for a transcript to be worth analyzing.
    pub min_lines: usize,
    /// Admit sub-agent transcripts instead of excluding them.
    pub include_subagents: bool,
}

/// Select up to `batch_size` candidates from the discovered, newest-first
/// list. A transcript qualifies when it is unseen by the state store (any
/// status counts as seen — failures are never retried), is not one of our
/// own analyzer sessions, is not a sub-agent session (unless admitted), and
/// has enough substance to analyze.
pub fn select_candidates(
    discovered: &[PathBuf],
    state: &StateSnapshot,
    opts: &FilterOptions,
) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    for path in discovered {
        if candidates.len() >= opts.batch_size {
            break;
        }

        let identity = path.to_string_lossy();
        if state.contains(&identity) {
            continue;
        }

        if !opts.include_subagents && is_subagent(path) {
            debug!(path = %path.display(), "skipping sub-agent transcript");
            continue;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                // Vanished or unreadable between discovery and now. No state
                // entry is written; it may qualify again on a later run.
                warn!(path = %path.display(), error = %e, "skipping unreadable transcript");
                continue;
            }
        };

        let non_blank = content.lines().filter(|l| !l.trim().is_empty()).count();
        if non_blank < opts.min_lines {
            debug!(path = %path.display(), lines = non_blank, "skipping short transcript");
            continue;
        }

        if is_self_session(&content) {
            debug!(path = %path.display(), "skipping analyzer-generated session");
            continue;
        }

        candidates.push(path.clone());
    }

    candidates
}

fn is_subagent(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(SUBAGENT_PREFIX))
}

fn is_self_session(content: &str) -> bool {
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(MARKER_SCAN_RECORDS)
        .any(|l| l.contains(SELF_SESSION_MARKER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn opts() -> FilterOptions {
        FilterOptions {
            batch_size: 10,
            min_lines: 3,
            include_subagents: false,
        }
    }

    fn write_transcript(dir: &Path, name: &str, lines: usize) -> PathBuf {
        let path = dir.join(name);
        let body: String = (0..lines)
            .map(|i| format!("{{\"type\":\"user\",\"uuid\":\"{i}\"}}\n"))
            .collect();
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn unseen_transcripts_are_selected() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_transcript(dir.path(), "a.jsonl", 5);
        let selected = select_candidates(&[a.clone()], &StateSnapshot::default(), &opts());
        assert_eq!(selected, vec![a]);
    }

    #[test]
    fn seen_transcripts_are_excluded_in_any_status() {
        let dir = tempfile::tempdir().unwrap();
        let done = write_transcript(dir.path(), "done.jsonl", 5);
        let failed = write_transcript(dir.path(), "failed.jsonl", 5);
        let fresh = write_transcript(dir.path(), "fresh.jsonl", 5);

        let state = StateSnapshot::default()
            .mark_completed(&done.to_string_lossy())
            .mark_failed(&failed.to_string_lossy(), 1);

        let selected = select_candidates(
            &[done, failed, fresh.clone()],
            &state,
            &opts(),
        );
        assert_eq!(selected, vec![fresh]);
    }

    #[test]
    fn batch_size_stops_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let all: Vec<_> = (0..5)
            .map(|i| write_transcript(dir.path(), &format!("t{i}.jsonl"), 5))
            .collect();

        let mut two = opts();
        two.batch_size = 2;
        let selected = select_candidates(&all, &StateSnapshot::default(), &two);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected, all[..2].to_vec());
    }

    #[test]
    fn subagent_transcripts_excluded_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let sub = write_transcript(dir.path(), "agent-12345.jsonl", 5);
        let selected = select_candidates(&[sub.clone()], &StateSnapshot::default(), &opts());
        assert!(selected.is_empty());

        let mut inclusive = opts();
        inclusive.include_subagents = true;
        let selected = select_candidates(&[sub.clone()], &StateSnapshot::default(), &inclusive);
        assert_eq!(selected, vec![sub]);
    }

    #[test]
    fn self_sessions_excluded_by_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("self.jsonl");
        let body = format!(
            "{{\"type\":\"user\",\"text\":\"{SELF_SESSION_MARKER}\"}}\n{}",
            "{\"type\":\"assistant\"}\n".repeat(5)
        );
        fs::write(&path, body).unwrap();

        let selected = select_candidates(&[path], &StateSnapshot::default(), &opts());
        assert!(selected.is_empty());
    }

    #[test]
    fn marker_deep_in_transcript_does_not_exclude() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.jsonl");
        let mut body = "{\"type\":\"user\"}\n".repeat(MARKER_SCAN_RECORDS + 2);
        body.push_str(&format!("{{\"text\":\"{SELF_SESSION_MARKER}\"}}\n"));
        fs::write(&path, body).unwrap();

        let selected = select_candidates(&[path.clone()], &StateSnapshot::default(), &opts());
        assert_eq!(selected, vec![path]);
    }

    #[test]
    fn short_transcripts_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let short = write_transcript(dir.path(), "short.jsonl", 2);
        let selected = select_candidates(&[short], &StateSnapshot::default(), &opts());
        assert!(selected.is_empty());
    }

    #[test]
    fn vanished_transcript_is_skipped() {
        let gone = PathBuf::from("/nonexistent/gone.jsonl");
        let selected = select_candidates(&[gone], &StateSnapshot::default(), &opts());
        assert!(selected.is_empty());
    }
}
