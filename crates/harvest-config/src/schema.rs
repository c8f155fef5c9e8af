use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration — maps to `harvest.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub intake: IntakeConfig,
    pub analyzer: AnalyzerConfig,
    pub retirement: RetirementConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            intake: IntakeConfig::default(),
            analyzer: AnalyzerConfig::default(),
            retirement: RetirementConfig::default(),
            paths: PathsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ── Intake ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Maximum transcripts analyzed per batch.
    pub batch_size: usize,
    /// Only transcripts modified within this window are considered.
    pub lookback_hours: u64,
    /// Hard cap on files returned by discovery, after sorting newest-first.
    pub discovery_cap: usize,
    /// Transcripts with fewer non-blank lines than this are skipped.
    pub min_transcript_lines: usize,
    /// Files smaller than this (bytes) are dropped during discovery.
    /// 0 disables the size filter.
    pub min_file_size_bytes: u64,
    /// K for tool-result truncation: payloads longer than 2K lines keep the
    /// first K and last K lines.
    pub truncate_lines: usize,
    /// Include sub-agent (child session) transcripts. Off by default — they
    /// repeat content already present in the parent session.
    pub include_subagents: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            lookback_hours: 24,
            discovery_cap: 100,
            min_transcript_lines: 20,
            min_file_size_bytes: 1024,
            truncate_lines: 20,
            include_subagents: false,
        }
    }
}

// ── Analyzer ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Command invoked to analyze a preprocessed transcript.
    pub command: String,
    /// Extra arguments appended before the transcript path.
    pub extra_args: Vec<String>,
    /// Path to the instructions document passed to the analyzer.
    /// Defaults to `<state_dir>/instructions.md` when unset.
    pub instructions_path: Option<PathBuf>,
    /// Capture combined analyzer output to a per-run artifact under the
    /// state dir. Off by default; output is discarded.
    pub save_output: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            command: "claude".into(),
            extra_args: vec![],
            instructions_path: None,
            save_output: false,
        }
    }
}

// ── Retirement ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetirementConfig {
    /// A skill is retired once `sessions_since_use` strictly exceeds this.
    pub threshold: u64,
    /// Update per-skill usage counters after each processed transcript.
    pub usage_tracking: bool,
}

impl Default for RetirementConfig {
    fn default() -> Self {
        Self {
            threshold: 20,
            usage_tracking: true,
        }
    }
}

// ── Paths ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// State directory (state file, lock, run artifacts). Default `~/.harvest/state`.
    pub state_dir: Option<PathBuf>,
    /// Transcript discovery root. Default `~/.harvest/transcripts`.
    pub transcript_root: Option<PathBuf>,
    /// Skill artifact tree root. Default `~/.harvest/skills`.
    pub skills_root: Option<PathBuf>,
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG and --log-level are absent.
    pub level: String,
    /// "text" or "json".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl HarvestConfig {
    /// Validate the config. Returns warnings for suspicious-but-workable
    /// values; returns Err for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<Vec<String>, String> {
        let mut warnings = Vec::new();

        if self.intake.batch_size == 0 {
            return Err("intake.batch_size must be at least 1".into());
        }
        if self.intake.truncate_lines == 0 {
            return Err("intake.truncate_lines must be at least 1".into());
        }
        if self.intake.lookback_hours == 0 {
            return Err("intake.lookback_hours must be at least 1".into());
        }
        if self.analyzer.command.trim().is_empty() {
            return Err("analyzer.command must not be empty".into());
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(format!(
                "logging.format must be \"text\" or \"json\", got \"{}\"",
                self.logging.format
            ));
        }

        if self.intake.discovery_cap > 1000 {
            warnings.push(format!(
                "intake.discovery_cap is very high ({}); discovery sorts every candidate by mtime",
                self.intake.discovery_cap
            ));
        }
        if self.retirement.threshold < 3 {
            warnings.push(format!(
                "retirement.threshold of {} is aggressive; skills will be archived after only {} idle sessions",
                self.retirement.threshold,
                self.retirement.threshold + 1
            ));
        }
        if self.intake.min_transcript_lines == 0 {
            warnings.push("intake.min_transcript_lines is 0; trivial sessions will be analyzed".into());
        }

        Ok(warnings)
    }
}
