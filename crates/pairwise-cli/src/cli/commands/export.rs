use super::exit_codes;
use crate::cli::args::ExportArgs;
use pairwise_core::config::PairwiseConfig;
use pairwise_core::storage::PreferenceStore;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Log,
    Table,
}

impl Artifact {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "log" | "jsonl" => Ok(Artifact::Log),
            "table" | "csv" => Ok(Artifact::Table),
            other => anyhow::bail!("unknown artifact: {} (expected log|table)", other),
        }
    }
}

pub fn run(args: ExportArgs, cfg: &PairwiseConfig) -> anyhow::Result<i32> {
    let store = PreferenceStore::from_settings(&cfg.storage);
    export_artifact(&store, Artifact::parse(&args.what)?, &args.out)?;
    Ok(exit_codes::OK)
}

pub fn export_artifact(store: &PreferenceStore, what: Artifact, out: &Path) -> anyhow::Result<()> {
    let bytes = match what {
        Artifact::Log => store.export_log(out)?,
        Artifact::Table => store.export_table(out)?,
    };
    eprintln!("wrote {} ({} bytes)", out.display(), bytes);
    Ok(())
}
