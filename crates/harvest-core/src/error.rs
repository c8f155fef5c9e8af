use thiserror::Error;

/// Unified error type for the entire Harvest pipeline.
#[derive(Error, Debug)]
pub enum HarvestError {
    // ── State store errors ─────────────────────────────────────
    #[error("state error: {0}")]
    State(String),

    #[error("state file is malformed: {path}: {reason}")]
    StateMalformed { path: String, reason: String },

    // ── Lock errors ────────────────────────────────────────────
    #[error("lock error: {0}")]
    Lock(String),

    // ── Transcript errors ──────────────────────────────────────
    #[error("transcript error: {0}")]
    Transcript(String),

    #[error("preprocess failed: {path}: {reason}")]
    Preprocess { path: String, reason: String },

    // ── Skill errors ───────────────────────────────────────────
    #[error("skill error: {0}")]
    Skill(String),

    #[error("skill metadata invalid: {skill}: {reason}")]
    SkillMetadata { skill: String, reason: String },

    // ── Analyzer errors ────────────────────────────────────────
    #[error("analyzer spawn failed: {command}: {reason}")]
    AnalyzerSpawn { command: String, reason: String },

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
