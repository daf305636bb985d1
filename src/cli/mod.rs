//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Publish end-to-end test reports to a git-hosted history index
#[derive(Parser, Debug)]
#[command(name = "rpub", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root that relative paths resolve against (default: current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Project config file (default: <root>/.rpub.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Local artifacts root holding one directory per run
    #[arg(long, global = true)]
    pub artifacts_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the run key for this run and persist it
    Timestamp(TimestampArgs),

    /// Run the test command, writing its report into the run directory
    Run(RunArgs),

    /// Extract the latest run's results summary
    Extract,

    /// Publish the latest run to the index branch
    Publish(PublishArgs),

    /// Send the results summary to the chat webhook
    Notify(NotifyArgs),

    /// Timestamp, run, extract, publish and notify in one go
    Pipeline(PipelineArgs),

    /// List local run directories, newest first
    List(ListArgs),

    /// Print JSON Schemas of the summary and history documents
    Schema(SchemaArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TimestampArgs {
    /// Print the persisted key instead of generating a new one
    #[arg(long)]
    pub show: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Test command to run instead of the configured one
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PublishArgs {
    /// Publish this run key instead of the most recently modified run
    #[arg(long)]
    pub key: Option<String>,

    /// Index repository URL
    #[arg(long)]
    pub repo_url: Option<String>,

    /// Index branch
    #[arg(long)]
    pub branch: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct NotifyArgs {
    /// Webhook URL to post to
    #[arg(long)]
    pub webhook_url: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Skip the chat notification
    #[arg(long)]
    pub skip_notify: bool,

    /// Index repository URL
    #[arg(long)]
    pub repo_url: Option<String>,

    /// Index branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Test command to run instead of the configured one
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Show at most this many runs
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SchemaArgs {
    /// Which document schema to print
    #[arg(value_enum, default_value_t = SchemaDocument::All)]
    pub document: SchemaDocument,
}

/// Documents with a published JSON Schema.
#[derive(ValueEnum, Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum SchemaDocument {
    /// The per-run results summary
    Summary,
    /// The history document at the index root
    Index,
    /// Both
    #[default]
    All,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Print only this key's value
    #[arg(long, short = 'g', value_name = "KEY")]
    pub get: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}
