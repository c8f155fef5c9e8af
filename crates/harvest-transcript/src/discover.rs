use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Knobs for transcript discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Only files modified within this window are kept.
    pub lookback_hours: u64,
    /// Hard cap applied after the newest-first sort.
    pub cap: usize,
    /// Files smaller than this are dropped. 0 disables the filter.
    pub min_file_size_bytes: u64,
}

/// Recursively enumerate `.jsonl` transcripts under `root`, newest first.
///
/// A missing root is an empty result, not an error — the pipeline runs on
/// hosts that have never produced a transcript. Unreadable entries are
/// logged and skipped; one bad file never hides the rest.
pub fn discover(root: &Path, opts: &DiscoveryOptions) -> Vec<PathBuf> {
    if !root.exists() {
        debug!(root = %root.display(), "transcript root does not exist, nothing to discover");
        return Vec::new();
    }

    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(opts.lookback_hours * 3600))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut found: Vec<(PathBuf, SystemTime)> = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().is_none_or(|e| e != "jsonl") {
            continue;
        }
        let meta = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "skipping file without metadata");
                continue;
            }
        };
        if opts.min_file_size_bytes > 0 && meta.len() < opts.min_file_size_bytes {
            continue;
        }
        let modified = match meta.modified() {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "skipping file without mtime");
                continue;
            }
        };
        if modified < cutoff {
            continue;
        }
        found.push((entry.into_path(), modified));
    }

    found.sort_by(|a, b| b.1.cmp(&a.1));
    found.truncate(opts.cap);
    debug!(count = found.len(), root = %root.display(), "discovery complete");
    found.into_iter().map(|(p, _)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn opts() -> DiscoveryOptions {
        DiscoveryOptions {
            lookback_hours: 24,
            cap: 100,
            min_file_size_bytes: 0,
        }
    }

    #[test]
    fn missing_root_is_empty() {
        let found = discover(Path::new("/nonexistent/transcripts"), &opts());
        assert!(found.is_empty());
    }

    #[test]
    fn finds_jsonl_recursively_and_ignores_others() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("project-a");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("session1.jsonl"), "{}\n").unwrap();
        fs::write(dir.path().join("session2.jsonl"), "{}\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a transcript").unwrap();

        let found = discover(dir.path(), &opts());
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.extension().unwrap() == "jsonl"));
    }

    #[test]
    fn old_files_are_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.jsonl");
        fs::write(&old, "{}\n").unwrap();
        let two_days_ago = SystemTime::now() - Duration::from_secs(48 * 3600);
        let file = fs::File::options().write(true).open(&old).unwrap();
        file.set_modified(two_days_ago).unwrap();
        drop(file);

        let found = discover(dir.path(), &opts());
        assert!(found.is_empty());
    }

    #[test]
    fn cap_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            let p = dir.path().join(format!("s{i}.jsonl"));
            fs::write(&p, "{}\n").unwrap();
            // Stagger mtimes so s4 is newest
            let mtime = SystemTime::now() - Duration::from_secs((5 - i) * 60);
            let file = fs::File::options().write(true).open(&p).unwrap();
            file.set_modified(mtime).unwrap();
        }

        let mut capped = opts();
        capped.cap = 2;
        let found = discover(dir.path(), &capped);
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("s4.jsonl"));
        assert!(found[1].ends_with("s3.jsonl"));
    }

    #[test]
    fn tiny_files_are_filtered_by_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tiny.jsonl"), "{}").unwrap();
        fs::write(dir.path().join("big.jsonl"), "x".repeat(2048)).unwrap();

        let mut sized = opts();
        sized.min_file_size_bytes = 1024;
        let found = discover(dir.path(), &sized);
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("big.jsonl"));
    }
}
