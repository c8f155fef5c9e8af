use chrono::Utc;
use harvest_config::AnalyzerConfig;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info};

/// Boundary to the external analysis process.
///
/// The analyzer is an opaque collaborator: it reads a preprocessed
/// transcript, decides what is worth keeping, and writes skill artifacts
/// under the skills root. This side only defines the invocation contract:
///
/// ```text
/// <command> <extra_args...> --instructions <doc> --write-root <skills_root> <transcript>
/// ```
///
/// and interprets the exit code — 0 success, nonzero failure, preserved
/// verbatim for diagnostics. No retries, no timeout.
pub struct Analyzer {
    config: AnalyzerConfig,
    skills_root: PathBuf,
    state_dir: PathBuf,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig, skills_root: &Path, state_dir: &Path) -> Self {
        Self {
            config,
            skills_root: skills_root.to_path_buf(),
            state_dir: state_dir.to_path_buf(),
        }
    }

    /// The instructions document handed to every invocation.
    fn instructions_path(&self) -> PathBuf {
        self.config
            .instructions_path
            .clone()
            .unwrap_or_else(|| self.state_dir.join("instructions.md"))
    }

    /// Run the analyzer on one preprocessed transcript and await its exit
    /// code. This is the only unbounded blocking point in the pipeline.
    pub async fn analyze(&self, transcript: &Path) -> harvest_core::Result<i32> {
        let mut command = tokio::process::Command::new(&self.config.command);
        command
            .args(&self.config.extra_args)
            .arg("--instructions")
            .arg(self.instructions_path())
            .arg("--write-root")
            .arg(&self.skills_root)
            .arg(transcript);

        debug!(command = %self.config.command, transcript = %transcript.display(), "invoking analyzer");

        let code = if self.config.save_output {
            let output = command
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await
                .map_err(|e| harvest_core::HarvestError::AnalyzerSpawn {
                    command: self.config.command.clone(),
                    reason: e.to_string(),
                })?;
            self.save_output(&output.stdout, &output.stderr)?;
            output.status.code().unwrap_or(-1)
        } else {
            let status = command
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .map_err(|e| harvest_core::HarvestError::AnalyzerSpawn {
                    command: self.config.command.clone(),
                    reason: e.to_string(),
                })?;
            status.code().unwrap_or(-1)
        };

        info!(transcript = %transcript.display(), exit_code = code, "analyzer finished");
        Ok(code)
    }

    /// Capture combined output verbatim to a per-run artifact.
    fn save_output(&self, stdout: &[u8], stderr: &[u8]) -> harvest_core::Result<()> {
        let runs = self.state_dir.join("runs");
        std::fs::create_dir_all(&runs)?;
        let path = runs.join(format!(
            "analyzer-{}-{}.log",
            Utc::now().format("%Y%m%dT%H%M%S"),
            std::process::id()
        ));
        let mut combined = Vec::with_capacity(stdout.len() + stderr.len());
        combined.extend_from_slice(stdout);
        combined.extend_from_slice(stderr);
        std::fs::write(&path, combined)?;
        debug!(path = %path.display(), "analyzer output saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer_with(command: &str, save_output: bool, state_dir: &Path) -> Analyzer {
        Analyzer::new(
            AnalyzerConfig {
                command: command.into(),
                extra_args: vec![],
                instructions_path: None,
                save_output,
            },
            Path::new("/tmp/skills"),
            state_dir,
        )
    }

    #[tokio::test]
    async fn zero_exit_code_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = analyzer_with("true", false, dir.path());
        let code = analyzer.analyze(Path::new("/tmp/t.jsonl")).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn nonzero_exit_code_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = analyzer_with("false", false, dir.path());
        let code = analyzer.analyze(Path::new("/tmp/t.jsonl")).await.unwrap();
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn missing_command_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = analyzer_with("/nonexistent/analyzer-binary", false, dir.path());
        let err = analyzer.analyze(Path::new("/tmp/t.jsonl")).await.unwrap_err();
        assert!(matches!(
            err,
            harvest_core::HarvestError::AnalyzerSpawn { .. }
        ));
    }

    #[tokio::test]
    async fn save_output_writes_run_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = analyzer_with("echo", true, dir.path());
        analyzer.analyze(Path::new("/tmp/t.jsonl")).await.unwrap();

        let runs: Vec<_> = std::fs::read_dir(dir.path().join("runs"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(runs.len(), 1);
        let content = std::fs::read_to_string(&runs[0]).unwrap();
        assert!(content.contains("--write-root"));
    }
}
