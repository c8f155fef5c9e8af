use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Record types that carry pure session metadata and no conversational
/// content. Dropped entirely.
const METADATA_TYPES: [&str; 2] = ["summary", "file-history-snapshot"];

/// Fields that are constant across a whole session and therefore carry no
/// per-record information. Stripped from every surviving record.
const SESSION_CONSTANT_FIELDS: [&str; 4] = ["userType", "cwd", "gitBranch", "version"];

/// Character threshold for payloads line-splitting cannot shrink
/// (minified blobs, base64, single-line dumps).
const CHAR_TRUNCATE_THRESHOLD: usize = 50_000;

/// Result of preprocessing one transcript.
///
/// `path` is a freshly created temp file. The caller owns it and must delete
/// it after use, on success and failure paths alike.
#[derive(Debug)]
pub struct Preprocessed {
    pub path: PathBuf,
    pub records_in: usize,
    pub records_out: usize,
    pub bytes_in: usize,
    pub bytes_out: usize,
}

/// Shrink a transcript to fit the analyzer's token budget.
///
/// Per non-blank line: parse as an independent JSON record (unparsable lines
/// are skipped, never fatal), drop metadata-only records, strip
/// session-constant fields and the redundant `message.role`, and truncate
/// oversized tool-result payloads: those longer than `2 * truncate_lines`
/// lines keep only the first and last `truncate_lines` lines.
pub fn preprocess(path: &Path, truncate_lines: usize) -> harvest_core::Result<Preprocessed> {
    let raw = std::fs::read_to_string(path)?;
    let bytes_in = raw.len();

    let mut records_in = 0;
    let mut out = String::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        records_in += 1;

        let mut record: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "skipping malformed transcript record");
                continue;
            }
        };

        if record
            .get("type")
            .and_then(|t| t.as_str())
            .is_some_and(|t| METADATA_TYPES.contains(&t))
        {
            continue;
        }

        if let Some(obj) = record.as_object_mut() {
            for field in SESSION_CONSTANT_FIELDS {
                obj.remove(field);
            }
            // The record's own `type` already says user/assistant.
            if let Some(msg) = obj.get_mut("message").and_then(|m| m.as_object_mut()) {
                msg.remove("role");
            }
        }

        truncate_tool_results(&mut record, truncate_lines);

        out.push_str(&serde_json::to_string(&record)?);
        out.push('\n');
    }

    let records_out = out.lines().count();
    let bytes_out = out.len();
    let out_path = unique_temp_path();
    std::fs::write(&out_path, &out)?;

    info!(
        source = %path.display(),
        records_in,
        records_out,
        bytes_in,
        bytes_out,
        "transcript preprocessed"
    );

    Ok(Preprocessed {
        path: out_path,
        records_in,
        records_out,
        bytes_in,
        bytes_out,
    })
}

/// Unique temp path: high-resolution time + pid + random component, so
/// concurrent invocations can never collide.
fn unique_temp_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!(
        "harvest-pre-{}-{}-{:08x}.jsonl",
        nanos,
        std::process::id(),
        rand::random::<u32>()
    ))
}

/// Find and truncate every tool-result payload in a record: the top-level
/// `toolUseResult` field and any `tool_result` item inside the message
/// content array.
fn truncate_tool_results(record: &mut Value, k: usize) {
    if let Some(obj) = record.as_object_mut() {
        if let Some(result) = obj.get_mut("toolUseResult") {
            truncate_strings_in(result, k);
        }
        if let Some(content) = obj
            .get_mut("message")
            .and_then(|m| m.get_mut("content"))
            .and_then(|c| c.as_array_mut())
        {
            for item in content {
                if item
                    .get("type")
                    .and_then(|t| t.as_str())
                    .is_some_and(|t| t == "tool_result")
                {
                    truncate_strings_in(item, k);
                }
            }
        }
    }
}

/// Recursively truncate every string leaf inside a tool-result payload.
fn truncate_strings_in(value: &mut Value, k: usize) {
    match value {
        Value::String(s) => {
            if let Some(truncated) = truncate_payload(s, k) {
                *s = truncated;
            }
        }
        Value::Array(items) => {
            for item in items {
                truncate_strings_in(item, k);
            }
        }
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                // Never rewrite the discriminator.
                if key == "type" {
                    continue;
                }
                truncate_strings_in(item, k);
            }
        }
        _ => {}
    }
}

/// Truncate one payload. `None` means the payload is small enough as-is.
///
/// Two regimes, line-count first:
/// - more than 2K lines → first K + a 3-line marker + last K; the marker
///   states how many lines were elided;
/// - otherwise, more than 50 000 characters → first and last 25 000 chars
///   around a marker stating the elided character count. Catches long
///   single-line blobs that line-splitting cannot shrink.
fn truncate_payload(s: &str, k: usize) -> Option<String> {
    let lines: Vec<&str> = s.split('\n').collect();
    if lines.len() > 2 * k {
        let elided = lines.len() - 2 * k;
        let mut kept: Vec<String> = Vec::with_capacity(2 * k + 3);
        kept.extend(lines[..k].iter().map(|l| l.to_string()));
        kept.push(String::new());
        kept.push(format!("... {elided} lines truncated ..."));
        kept.push(String::new());
        kept.extend(lines[lines.len() - k..].iter().map(|l| l.to_string()));
        return Some(kept.join("\n"));
    }

    let chars: Vec<char> = s.chars().collect();
    if chars.len() > CHAR_TRUNCATE_THRESHOLD {
        let keep = CHAR_TRUNCATE_THRESHOLD / 2;
        let elided = chars.len() - CHAR_TRUNCATE_THRESHOLD;
        let head: String = chars[..keep].iter().collect();
        let tail: String = chars[chars.len() - keep..].iter().collect();
        return Some(format!(
            "{head}\n... {elided} characters truncated ...\n{tail}"
        ));
    }

    None
}
