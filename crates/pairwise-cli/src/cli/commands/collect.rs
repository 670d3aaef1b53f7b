use super::exit_codes;
use super::export::{export_artifact, Artifact};
use crate::cli::args::CollectArgs;
use dialoguer::{Input, Select};
use pairwise_core::config::{check_temperature, PairwiseConfig};
use pairwise_core::generation::generate_round;
use pairwise_core::model::Preference;
use pairwise_core::providers::llm::fake::FakeClient;
use pairwise_core::providers::llm::openai::OpenAIClient;
use pairwise_core::providers::llm::LlmClient;
use pairwise_core::report::console;
use pairwise_core::session::{save_preference, Round, SaveOutcome, SessionState};
use pairwise_core::storage::PreferenceStore;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    NewPrompt,
    SavePreference,
    ShowResponses,
    SavedData,
    ExportLog,
    ExportTable,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Action::NewPrompt => "🎲 Generate two responses for a new prompt",
            Action::SavePreference => "✅ Save preference",
            Action::ShowResponses => "Show responses again",
            Action::SavedData => "📦 Saved data",
            Action::ExportLog => "⬇️  Export JSONL",
            Action::ExportTable => "⬇️  Export CSV",
            Action::Quit => "Quit",
        }
    }
}

/// Saving is only offered while the current round is unsaved.
fn available_actions(state: &SessionState) -> Vec<Action> {
    let mut actions = vec![Action::NewPrompt];
    if state.can_save() {
        actions.push(Action::SavePreference);
    }
    if state.round.is_some() {
        actions.push(Action::ShowResponses);
    }
    actions.extend([
        Action::SavedData,
        Action::ExportLog,
        Action::ExportTable,
        Action::Quit,
    ]);
    actions
}

pub fn build_client(args: &CollectArgs, cfg: &PairwiseConfig) -> anyhow::Result<Box<dyn LlmClient>> {
    let mut settings = cfg.provider.clone();
    if let Some(m) = &args.model {
        settings.model = m.clone();
    }
    if let Some(u) = &args.base_url {
        settings.base_url = u.clone();
    }
    if let Some(t) = args.temperature {
        check_temperature(t)?;
        settings.temperature = t;
    }

    match args.provider.as_str() {
        "openai" => Ok(Box::new(OpenAIClient::from_settings(&settings))),
        "fake" => Ok(Box::new(FakeClient::echo(settings.model))),
        other => anyhow::bail!("unknown provider: {} (expected openai|fake)", other),
    }
}

pub async fn run(args: CollectArgs, cfg: PairwiseConfig) -> anyhow::Result<i32> {
    let client = build_client(&args, &cfg)?;
    let store = PreferenceStore::from_settings(&cfg.storage);

    tracing::info!(
        event = "pairwise.session.start",
        provider = client.provider_name(),
        model = %cfg.provider.model,
        log = %store.log_path().display(),
    );

    println!("⚖️  Response Preference Collector");
    println!("Generate two responses, pick the better one — data saved for RLHF training.\n");
    print_saved_data(&store)?;

    let mut state = SessionState::default();
    loop {
        let actions = available_actions(&state);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let idx = Select::new()
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[idx] {
            Action::NewPrompt => {
                let prompt: String = Input::new()
                    .with_prompt("Prompt")
                    .allow_empty(true)
                    .interact_text()?;
                if prompt.trim().is_empty() {
                    println!("Enter a prompt to generate responses.");
                    continue;
                }
                println!("Generating responses A and B…");
                match generate_round(client.as_ref(), &prompt).await {
                    Ok(round) => {
                        print_round(&round);
                        state = SessionState::with_round(round);
                    }
                    Err(e) => {
                        tracing::error!(event = "pairwise.generation.failed", error = %format!("{e:#}"));
                        eprintln!("❌ generation failed: {e:#}");
                    }
                }
            }
            Action::SavePreference => {
                let choice = ask_preference()?;
                let outcome = match save_preference(state, choice, &store) {
                    Ok((next, outcome)) => {
                        state = next;
                        outcome
                    }
                    Err(failed) => {
                        state = failed.state;
                        report_save_failure(&store, &failed.error);
                        continue;
                    }
                };
                match outcome {
                    SaveOutcome::Saved { choice, .. } => println!("{}", console::render_saved(choice)),
                    SaveOutcome::Skipped => println!("{}", console::render_skipped()),
                    SaveOutcome::AlreadySaved => println!("This round has already been saved."),
                    SaveOutcome::NoRound => println!("Generate two responses first."),
                }
            }
            Action::ShowResponses => {
                if let Some(round) = &state.round {
                    print_round(round);
                }
            }
            Action::SavedData => print_saved_data(&store)?,
            Action::ExportLog => prompt_export(&store, Artifact::Log)?,
            Action::ExportTable => prompt_export(&store, Artifact::Table)?,
            Action::Quit => break,
        }
    }

    Ok(exit_codes::OK)
}

fn ask_preference() -> anyhow::Result<Preference> {
    let labels: Vec<&str> = Preference::ALL.iter().map(|p| p.label()).collect();
    let idx = Select::new()
        .with_prompt("Which response is better?")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Preference::ALL[idx])
}

fn report_save_failure(store: &PreferenceStore, error: &anyhow::Error) {
    tracing::error!(
        event = "pairwise.store.append_failed",
        log = %store.log_path().display(),
        table = %store.table_path().display(),
        error = %format!("{error:#}"),
    );
    eprintln!("❌ save failed: {error:#}");
    eprintln!(
        "The round is still open. {} may already hold this record; check `pairwise status` (and `pairwise rebuild-table`) before saving again.",
        store.log_path().display()
    );
}

fn print_round(round: &Round) {
    println!();
    println!("{}", console::render_generation("Response A", &round.a));
    println!("{}", console::render_generation("Response B", &round.b));
}

fn print_saved_data(store: &PreferenceStore) -> anyhow::Result<()> {
    let history = store.load_history()?;
    println!("{} record(s) saved.", history.len());
    if !history.is_empty() {
        println!("Last {} records:", console::PREVIEW_LIMIT.min(history.len()));
        print!("{}", console::render_preview(&history, console::PREVIEW_LIMIT));
    }
    println!();
    Ok(())
}

fn prompt_export(store: &PreferenceStore, what: Artifact) -> anyhow::Result<()> {
    let source = match what {
        Artifact::Log => store.log_path(),
        Artifact::Table => store.table_path(),
    };
    if !source.exists() {
        println!("Nothing saved yet.");
        return Ok(());
    }

    let default_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dest: String = Input::new()
        .with_prompt("Export to")
        .default(format!("export-{}", default_name))
        .interact_text()?;

    if let Err(e) = export_artifact(store, what, &PathBuf::from(dest)) {
        eprintln!("❌ export failed: {e:#}");
    }
    Ok(())
}
