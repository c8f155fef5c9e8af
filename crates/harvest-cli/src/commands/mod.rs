use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use harvest_config::ConfigLoader;
use harvest_core::HarvestPaths;

mod retire;
mod run;
mod setup;
mod skills;
mod status;

/// Harvest — distills conversation transcripts into reusable skills
#[derive(Parser)]
#[command(name = "harvest", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to harvest.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one batch of new transcripts through the analyzer
    Run,
    /// Consolidate and archive skills that stopped being used
    Retire {
        /// Override the configured idle-session threshold
        #[arg(short, long)]
        threshold: Option<u64>,
    },
    /// Show processing state and skill catalog counts
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the skill catalog
    Skills {
        #[command(subcommand)]
        action: SkillAction,
    },
    /// Show effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Initialize the state directory and a default harvest.toml
    Init,
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum SkillAction {
    /// List active skills with their usage counters
    List,
    /// Check a proposed skill name against the catalog for near-duplicates
    Similar { name: String },
}

impl Cli {
    pub async fn run(self) -> harvest_core::Result<()> {
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: --verbose > --quiet > --log-level > config default
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or(&config.logging.level)
        };

        if config.logging.format == "json" {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
                )
                .json()
                .with_target(true)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
                )
                .with_target(false)
                .init();
        }

        let paths = HarvestPaths::resolve_default(
            config.paths.state_dir.as_deref(),
            config.paths.transcript_root.as_deref(),
            config.paths.skills_root.as_deref(),
        );

        match self.command {
            Commands::Run => run::cmd_run(config, paths).await,
            Commands::Retire { threshold } => retire::cmd_retire(config, paths, threshold),
            Commands::Status { json } => status::cmd_status(paths, json),
            Commands::Skills { action } => match action {
                SkillAction::List => skills::cmd_list(paths),
                SkillAction::Similar { name } => skills::cmd_similar(paths, &name),
            },
            Commands::Config { json } => Self::cmd_config(config, json),
            Commands::Init => setup::cmd_init(config, paths, config_loader.path()),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_config(config: harvest_config::HarvestConfig, json: bool) -> harvest_core::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| harvest_core::HarvestError::Config(e.to_string()))?;
            println!("{rendered}");
        }
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> harvest_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "harvest", &mut std::io::stdout());
        Ok(())
    }
}
