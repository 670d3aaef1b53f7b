use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pairwise",
    version,
    about = "Collect human preference labels between two LLM responses"
)]
pub struct Cli {
    /// Config file; defaults are used when it does not exist
    #[arg(long, global = true, default_value = "pairwise.yaml", env = "PAIRWISE_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a sample config file
    Init,
    /// Interactive labelling session
    Collect(CollectArgs),
    /// Show the saved record count and the most recent records
    History(HistoryArgs),
    /// Copy the JSONL log or the CSV table to another path
    Export(ExportArgs),
    /// Regenerate the CSV table from the JSONL log
    RebuildTable,
    /// Compare log and table; exits 1 when they diverge
    Status,
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CollectArgs {
    /// provider: openai|fake
    #[arg(long, default_value = "openai")]
    pub provider: String,

    /// overrides provider.model
    #[arg(long)]
    pub model: Option<String>,

    /// overrides provider.base_url
    #[arg(long)]
    pub base_url: Option<String>,

    /// overrides provider.temperature
    #[arg(long)]
    pub temperature: Option<f32>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct HistoryArgs {
    #[arg(long, default_value_t = 5)]
    pub last: usize,

    /// skip malformed log lines instead of failing
    #[arg(long)]
    pub lenient: bool,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    /// log|table
    #[arg(long)]
    pub what: String,

    #[arg(long)]
    pub out: PathBuf,
}
