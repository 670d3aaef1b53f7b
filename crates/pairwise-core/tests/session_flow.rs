use pairwise_core::generation::{generate, generate_round};
use pairwise_core::model::{Generation, GenerationMetadata, Preference};
use pairwise_core::providers::llm::fake::FakeClient;
use pairwise_core::providers::llm::Completion;
use pairwise_core::session::{save_preference, Round, SaveOutcome, SessionState};
use pairwise_core::storage::PreferenceStore;
use tempfile::tempdir;

fn completion(text: &str, prompt_tokens: u64, completion_tokens: u64) -> Completion {
    Completion {
        text: text.into(),
        model: "llama3.2:1b".into(),
        prompt_tokens,
        completion_tokens,
    }
}

fn generation(text: &str, output_tokens: u64, latency_ms: u64, ts: &str) -> Generation {
    Generation {
        text: text.into(),
        meta: GenerationMetadata {
            model: "llama3.2:1b".into(),
            input_tokens: 12,
            output_tokens,
            latency_ms,
            timestamp: ts.into(),
        },
    }
}

fn gravity_round() -> Round {
    Round {
        prompt: "Explain gravity in one sentence.".into(),
        a: generation("T1", 30, 450, "2026-10-19T10:00:00.000000+00:00"),
        b: generation("T2", 25, 380, "2026-10-19T10:00:01.000000+00:00"),
    }
}

fn store_in(dir: &std::path::Path) -> PreferenceStore {
    PreferenceStore::new(dir.join("log.jsonl"), dir.join("table.csv"))
}

#[tokio::test]
async fn generate_fills_metadata_from_provider() -> anyhow::Result<()> {
    let client = FakeClient::scripted(vec![Ok(completion("Mass attracts mass.", 12, 30))]);

    let g = generate(&client, "Explain gravity in one sentence.").await?;
    assert_eq!(g.text, "Mass attracts mass.");
    assert_eq!(g.meta.model, "llama3.2:1b");
    assert_eq!(g.meta.input_tokens, 12);
    assert_eq!(g.meta.output_tokens, 30);
    assert!(g.meta.timestamp.ends_with("+00:00"));
    chrono::DateTime::parse_from_rfc3339(&g.meta.timestamp)?;
    Ok(())
}

#[tokio::test]
async fn empty_prompt_never_reaches_provider() {
    let client = FakeClient::echo("fake");
    let err = generate(&client, "   \n").await.unwrap_err();
    assert!(err.to_string().contains("prompt must not be empty"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn round_makes_two_independent_calls() -> anyhow::Result<()> {
    let client = FakeClient::echo("fake");
    let round = generate_round(&client, "same prompt").await?;

    assert_eq!(client.calls(), 2);
    assert_eq!(round.prompt, "same prompt");
    assert!(!round.a.text.is_empty());
    assert!(!round.b.text.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_first_call_skips_second() {
    let client = FakeClient::scripted(vec![
        Err("connection refused".into()),
        Ok(completion("B", 3, 1)),
    ]);

    let err = generate_round(&client, "new prompt").await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("response A"));
    assert!(msg.contains("connection refused"));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn failed_second_call_yields_no_round() {
    let client = FakeClient::scripted(vec![
        Ok(completion("A", 3, 1)),
        Err("connection refused".into()),
    ]);

    let err = generate_round(&client, "new prompt").await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("response B"));
    assert!(msg.contains("connection refused"));
    assert_eq!(client.calls(), 2);
}

#[test]
fn failed_table_write_hands_back_the_open_round() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = store_in(dir.path());
    std::fs::create_dir(store.table_path())?;

    let err = save_preference(
        SessionState::with_round(gravity_round()),
        Preference::ResponseA,
        &store,
    )
    .unwrap_err();

    assert!(err.state.can_save());
    assert_eq!(
        err.state.round.as_ref().map(|r| r.prompt.as_str()),
        Some("Explain gravity in one sentence.")
    );
    assert!(format!("{:#}", err.error).contains("table"));
    // log is written first, so it is now ahead of the table
    assert_eq!(store.count()?, 1);
    Ok(())
}

#[test]
fn choosing_a_persists_gravity_record() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = store_in(dir.path());

    let state = SessionState::with_round(gravity_round());
    let (state, outcome) = save_preference(state, Preference::ResponseA, &store)?;

    let SaveOutcome::Saved { choice, record } = outcome else {
        panic!("expected Saved");
    };
    assert_eq!(choice, Preference::ResponseA);
    assert_eq!(record.chosen, "T1");
    assert_eq!(record.rejected, "T2");
    assert_eq!(record.metadata.input_tokens, 12);
    assert_eq!(record.metadata.output_tokens_chosen, 30);
    assert_eq!(record.metadata.output_tokens_rejected, 25);
    assert_eq!(record.metadata.latency_ms_chosen, 450);
    assert_eq!(record.metadata.latency_ms_rejected, 380);

    assert!(!state.can_save());
    assert_eq!(store.load_history()?, vec![record]);
    assert_eq!(store.table_row_count()?, 1);
    Ok(())
}

#[test]
fn choosing_b_swaps_everything_but_the_timestamp() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = store_in(dir.path());

    let round = gravity_round();
    let a_ts = round.a.meta.timestamp.clone();
    let (_, outcome) = save_preference(SessionState::with_round(round), Preference::ResponseB, &store)?;

    let SaveOutcome::Saved { record, .. } = outcome else {
        panic!("expected Saved");
    };
    assert_eq!(record.chosen, "T2");
    assert_eq!(record.rejected, "T1");
    assert_eq!(record.metadata.output_tokens_chosen, 25);
    assert_eq!(record.metadata.latency_ms_chosen, 380);
    assert_eq!(record.metadata.latency_ms_rejected, 450);
    assert_eq!(record.timestamp, a_ts);
    Ok(())
}

#[test]
fn tie_skip_writes_nothing() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = store_in(dir.path());

    let (state, outcome) = save_preference(
        SessionState::with_round(gravity_round()),
        Preference::TieSkip,
        &store,
    )?;
    assert_eq!(outcome, SaveOutcome::Skipped);
    assert_eq!(store.count()?, 0);
    assert_eq!(store.table_row_count()?, 0);
    assert!(!store.log_path().exists());

    // the round stays open for a real choice
    assert!(state.can_save());
    Ok(())
}

#[test]
fn second_save_of_same_round_is_blocked() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = store_in(dir.path());

    let (state, _) = save_preference(
        SessionState::with_round(gravity_round()),
        Preference::ResponseA,
        &store,
    )?;
    let (_, outcome) = save_preference(state, Preference::ResponseB, &store)?;
    assert_eq!(outcome, SaveOutcome::AlreadySaved);
    assert_eq!(store.count()?, 1);

    // a new round resets the flag
    let state = SessionState::with_round(gravity_round());
    assert!(state.can_save());
    let (_, outcome) = save_preference(state, Preference::ResponseB, &store)?;
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert_eq!(store.count()?, 2);
    Ok(())
}

#[test]
fn saving_without_a_round_is_a_no_op() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = store_in(dir.path());

    let (state, outcome) = save_preference(SessionState::default(), Preference::ResponseA, &store)?;
    assert_eq!(outcome, SaveOutcome::NoRound);
    assert!(!state.can_save());
    assert_eq!(store.count()?, 0);
    Ok(())
}
