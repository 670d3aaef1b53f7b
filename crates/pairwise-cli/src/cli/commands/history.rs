use super::exit_codes;
use crate::cli::args::HistoryArgs;
use pairwise_core::config::PairwiseConfig;
use pairwise_core::report::console;
use pairwise_core::storage::{HistoryLoad, PreferenceStore};

pub fn run(args: HistoryArgs, cfg: &PairwiseConfig) -> anyhow::Result<i32> {
    let store = PreferenceStore::from_settings(&cfg.storage);

    let load = if args.lenient {
        store.load_history_lenient()?
    } else {
        HistoryLoad {
            records: store.load_history()?,
            malformed: Vec::new(),
        }
    };

    if args.format == "json" {
        let recent: Vec<_> = load.records.iter().rev().take(args.last).collect();
        let out = serde_json::json!({
            "total": load.records.len(),
            "skipped_lines": load.malformed.iter().map(|m| m.line_no).collect::<Vec<_>>(),
            "recent": recent,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(exit_codes::OK);
    }

    println!("{} record(s) saved.", load.records.len());
    for m in &load.malformed {
        eprintln!("skipped malformed line {}: {}", m.line_no, m.error);
    }
    if !load.records.is_empty() {
        println!();
        print!("{}", console::render_preview(&load.records, args.last));
    }
    Ok(exit_codes::OK)
}
