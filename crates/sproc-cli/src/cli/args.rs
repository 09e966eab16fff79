use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sproc",
    version,
    about = "Stored procedure complexity analysis and refactoring review"
)]
pub struct Cli {
    /// Optional env file with API keys and Jira credentials
    #[arg(long, global = true, default_value = "config/settings.env")]
    pub env_file: PathBuf,

    /// Log filter (e.g. `info`, `sproc_core=debug`); falls back to SPROC_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze every procedure in the configured source and write reports
    Run(RunArgs),
    /// Score a single SQL definition without calling any model
    Score(ScoreArgs),
    /// Write a sample sproc.yaml
    Init(InitArgs),
    /// Check config, source, credentials and output locations
    Doctor(DoctorArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long, default_value = "sproc.yaml")]
    pub config: PathBuf,

    /// Override llm.provider (openai|fake)
    #[arg(long)]
    pub provider: Option<String>,

    /// Skip the local response cache
    #[arg(long)]
    pub no_cache: bool,

    /// File a Jira ticket per flagged procedure
    #[arg(long)]
    pub create_tickets: bool,

    /// Exit with 1 when any procedure is flagged
    #[arg(long)]
    pub fail_on_flagged: bool,

    /// Reject unknown config keys
    #[arg(long)]
    pub strict_config: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScoreArgs {
    /// SQL file to score, or `-` for stdin
    pub file: PathBuf,

    /// Procedure name shown in the output (default: file stem)
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "sproc.yaml")]
    pub config: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DoctorArgs {
    #[arg(long, default_value = "sproc.yaml")]
    pub config: PathBuf,

    #[arg(long)]
    pub strict_config: bool,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}
