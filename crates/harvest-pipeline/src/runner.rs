use harvest_config::HarvestConfig;
use harvest_core::HarvestPaths;
use harvest_state::LockGuard;
use harvest_transcript::{DiscoveryOptions, FilterOptions};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::analyzer::Analyzer;

/// Summary of one batch invocation.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Transcripts found inside the lookback window.
    pub discovered: usize,
    /// Candidates that passed filtering.
    pub candidates: usize,
    /// Candidates the analyzer completed.
    pub completed: usize,
    /// Candidates the analyzer failed (recorded with exit code, never retried).
    pub failed: usize,
    /// True when another run held the lock and this one skipped.
    pub lock_skipped: bool,
}

/// One batch run: discover → filter → lock → per candidate: mark
/// in-progress, preprocess, analyze, mark completed/failed, track usage.
///
/// Transcripts are processed strictly one at a time. The lock guard releases
/// on every exit path, including error propagation.
pub struct BatchRunner {
    config: HarvestConfig,
    paths: HarvestPaths,
}

impl BatchRunner {
    pub fn new(config: HarvestConfig, paths: HarvestPaths) -> Self {
        Self { config, paths }
    }

    pub async fn run(&self) -> harvest_core::Result<RunReport> {
        let mut report = RunReport::default();

        let discovered = harvest_transcript::discover(
            &self.paths.transcript_root,
            &DiscoveryOptions {
                lookback_hours: self.config.intake.lookback_hours,
                cap: self.config.intake.discovery_cap,
                min_file_size_bytes: self.config.intake.min_file_size_bytes,
            },
        );
        report.discovered = discovered.len();
        if discovered.is_empty() {
            info!("no recent transcripts, nothing to do");
            return Ok(report);
        }

        let mut snapshot = harvest_state::store::init(&self.paths.state_dir)?;

        let candidates = harvest_transcript::select_candidates(
            &discovered,
            &snapshot,
            &FilterOptions {
                batch_size: self.config.intake.batch_size,
                min_lines: self.config.intake.min_transcript_lines,
                include_subagents: self.config.intake.include_subagents,
            },
        );
        report.candidates = candidates.len();
        if candidates.is_empty() {
            info!(discovered = report.discovered, "no new candidates");
            return Ok(report);
        }

        // At most one batch system-wide per state directory. A held lock is
        // the normal "another run is active" signal: skip, rely on the next
        // trigger.
        let Some(guard) = LockGuard::try_acquire(&self.paths.state_dir)? else {
            info!("another run holds the lock, skipping");
            report.lock_skipped = true;
            return Ok(report);
        };

        let analyzer = Analyzer::new(
            self.config.analyzer.clone(),
            &self.paths.skills_root,
            &self.paths.state_dir,
        );

        for path in &candidates {
            if !path.exists() {
                // Vanished between discovery and now: no state entry, it can
                // qualify again if it reappears.
                warn!(path = %path.display(), "transcript vanished before processing, skipping");
                continue;
            }
            let identity = path.to_string_lossy().to_string();

            snapshot = snapshot.mark_in_progress(&identity);
            harvest_state::store::write(&self.paths.state_dir, &snapshot)?;

            let pre = harvest_transcript::preprocess(path, self.config.intake.truncate_lines)?;
            let outcome = analyzer.analyze(&pre.path).await;
            // The preprocessed temp file is ours to delete, success or not.
            if let Err(e) = std::fs::remove_file(&pre.path) {
                warn!(path = %pre.path.display(), error = %e, "failed to delete preprocessed temp file");
            }
            let exit_code = outcome?;

            if exit_code == 0 {
                snapshot = snapshot.mark_completed(&identity);
                report.completed += 1;
            } else {
                snapshot = snapshot.mark_failed(&identity, exit_code);
                report.failed += 1;
            }
            harvest_state::store::write(&self.paths.state_dir, &snapshot)?;

            if self.config.retirement.usage_tracking {
                self.track_usage(path);
            }
        }

        info!(
            completed = report.completed,
            failed = report.failed,
            "batch finished"
        );
        guard.release()?;
        Ok(report)
    }

    /// Best-effort usage pass over the raw transcript. Counter updates are
    /// bookkeeping; a failure here never fails the batch.
    fn track_usage(&self, transcript: &Path) {
        let content = match std::fs::read_to_string(transcript) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %transcript.display(), error = %e, "usage tracking skipped, transcript unreadable");
                return;
            }
        };
        match harvest_skills::track_transcript(&self.paths.skills_root, &content) {
            Ok(usage) => {
                debug!(used = usage.used.len(), idle = usage.idle, "usage counters updated");
            }
            Err(e) => {
                warn!(error = %e, "usage tracking failed");
            }
        }
    }
}
