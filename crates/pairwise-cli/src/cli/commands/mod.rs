use super::args::*;
use pairwise_core::config::{load_config, write_sample_config, PairwiseConfig};
use pairwise_core::report::console;
use pairwise_core::storage::PreferenceStore;
use std::path::Path;

pub mod collect;
pub mod export;
pub mod history;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init => cmd_init(&cli.config),
        Command::Collect(args) => collect::run(args, load_settings(&cli.config)?).await,
        Command::History(args) => history::run(args, &load_settings(&cli.config)?),
        Command::Export(args) => export::run(args, &load_settings(&cli.config)?),
        Command::RebuildTable => cmd_rebuild_table(&load_settings(&cli.config)?),
        Command::Status => cmd_status(&load_settings(&cli.config)?),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn load_settings(path: &Path) -> anyhow::Result<PairwiseConfig> {
    let mut cfg = load_config(path)?;
    cfg.apply_env();
    Ok(cfg)
}

fn cmd_init(path: &Path) -> anyhow::Result<i32> {
    if path.exists() {
        eprintln!("note: {} already exists", path.display());
        return Ok(exit_codes::OK);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_sample_config(path)?;
    eprintln!("created {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_rebuild_table(cfg: &PairwiseConfig) -> anyhow::Result<i32> {
    let store = PreferenceStore::from_settings(&cfg.storage);
    let rows = store.rebuild_table()?;
    eprintln!(
        "rebuilt {} from {} ({} row(s))",
        store.table_path().display(),
        store.log_path().display(),
        rows
    );
    Ok(exit_codes::OK)
}

fn cmd_status(cfg: &PairwiseConfig) -> anyhow::Result<i32> {
    let store = PreferenceStore::from_settings(&cfg.storage);
    let records = store.count()?;
    let rows = store.table_row_count()?;

    println!("{}", console::render_status(records, rows));
    if records != rows {
        tracing::warn!(
            event = "pairwise.store.diverged",
            log_records = records,
            table_rows = rows,
        );
        return Ok(exit_codes::FAILED);
    }
    Ok(exit_codes::OK)
}
