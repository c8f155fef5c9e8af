use std::path::{Path, PathBuf};

/// Skill metadata parsed from a SKILL.md file.
///
/// The file is Markdown with a YAML-ish frontmatter block carrying both
/// identity (`name`, `description`, `version`) and the usage counters the
/// retirement pass consumes. The body is free-form Markdown with the
/// conventional sections (Instructions, Failed Attempts, Common Mistakes,
/// Version History).
#[derive(Debug, Clone)]
pub struct SkillMetadata {
    /// Hyphen-tokenized skill name, e.g. `rust-test-mock`.
    pub name: String,
    /// Short description of when to reach for this skill.
    pub description: String,
    /// Semantic version, bumped by the analyzer on edits.
    pub version: String,
    /// Number of sessions in which this skill was referenced.
    pub usage_count: u64,
    /// ISO date of the last session that referenced it.
    pub last_used: Option<String>,
    /// Sessions processed since the skill was last referenced. Retirement
    /// triggers once this strictly exceeds the configured threshold.
    pub sessions_since_use: u64,
    /// The full Markdown body.
    pub body: String,
    /// Absolute path to the SKILL.md file.
    pub file_path: PathBuf,
    /// Base directory of the skill (parent of SKILL.md).
    pub base_dir: PathBuf,
}

impl SkillMetadata {
    /// Parse a SKILL.md file from disk.
    pub fn from_file(path: &Path) -> harvest_core::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            harvest_core::HarvestError::Skill(format!("failed to read {}: {}", path.display(), e))
        })?;

        let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Self::parse(&content, path.to_path_buf(), base_dir)
    }

    /// Parse SKILL.md content with known path info. Counters default to zero
    /// when absent — externally created skills start without usage history.
    pub fn parse(content: &str, file_path: PathBuf, base_dir: PathBuf) -> harvest_core::Result<Self> {
        let (frontmatter, body) = split_frontmatter(content)?;

        let mut name = String::new();
        let mut description = String::new();
        let mut version = String::from("1.0.0");
        let mut usage_count = 0u64;
        let mut last_used: Option<String> = None;
        let mut sessions_since_use = 0u64;

        for line in frontmatter.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim();
                let value = value.trim();
                match key {
                    "name" => name = unquote(value),
                    "description" => description = unquote(value),
                    "version" => version = unquote(value),
                    "usage_count" => usage_count = value.parse().unwrap_or(0),
                    "last_used" => {
                        let v = unquote(value);
                        if !v.is_empty() && v != "null" {
                            last_used = Some(v);
                        }
                    }
                    "sessions_since_use" => sessions_since_use = value.parse().unwrap_or(0),
                    _ => {} // ignore unknown keys
                }
            }
        }

        if name.is_empty() {
            return Err(harvest_core::HarvestError::SkillMetadata {
                skill: file_path.display().to_string(),
                reason: "skill name is empty".into(),
            });
        }

        Ok(Self {
            name,
            description,
            version,
            usage_count,
            last_used,
            sessions_since_use,
            body: body.trim().to_string(),
            file_path,
            base_dir,
        })
    }

    /// Render the frontmatter block back out.
    pub fn render_frontmatter(&self) -> String {
        let mut fm = String::from("---\n");
        fm.push_str(&format!("name: {}\n", self.name));
        fm.push_str(&format!("description: {}\n", self.description));
        fm.push_str(&format!("version: {}\n", self.version));
        fm.push_str(&format!("usage_count: {}\n", self.usage_count));
        if let Some(last_used) = &self.last_used {
            fm.push_str(&format!("last_used: {last_used}\n"));
        }
        fm.push_str(&format!("sessions_since_use: {}\n", self.sessions_since_use));
        fm.push_str("---\n");
        fm
    }

    /// Write the skill back to its SKILL.md: re-rendered frontmatter, body
    /// preserved verbatim.
    pub fn save(&self) -> harvest_core::Result<()> {
        let content = format!("{}\n{}\n", self.render_frontmatter(), self.body);
        std::fs::write(&self.file_path, content).map_err(|e| {
            harvest_core::HarvestError::Skill(format!(
                "failed to write {}: {}",
                self.file_path.display(),
                e
            ))
        })
    }
}

/// Split a SKILL.md file into frontmatter and Markdown body.
fn split_frontmatter(content: &str) -> harvest_core::Result<(String, String)> {
    let trimmed = content.trim();

    if !trimmed.starts_with("---") {
        return Err(harvest_core::HarvestError::Skill(
            "SKILL.md must start with frontmatter (---)".into(),
        ));
    }

    let after_first = &trimmed[3..];
    let end_pos = after_first.find("\n---").ok_or_else(|| {
        harvest_core::HarvestError::Skill("SKILL.md: missing closing --- for frontmatter".into())
    })?;

    let frontmatter = after_first[..end_pos].trim().to_string();
    let body = after_first[end_pos + 4..].trim().to_string();

    Ok((frontmatter, body))
}

/// Remove surrounding quotes from a frontmatter value.
fn unquote(s: &str) -> String {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\''))
    {
        if s.len() >= 2 {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}
