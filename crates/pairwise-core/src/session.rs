//! Per-reviewer interaction state.
//!
//! State is an explicit value: handlers take a `SessionState` and hand back
//! the next one. A new state is created only when a generation round
//! succeeds, so a failed generation leaves the previous round in place.

use crate::model::{Generation, Preference, PreferenceRecord};
use crate::storage::PreferenceStore;
use serde::Serialize;

/// One prompt and its two candidate responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Round {
    pub prompt: String,
    pub a: Generation,
    pub b: Generation,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub round: Option<Round>,
    /// Set once the current round has been written; cleared by the next round.
    pub saved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved {
        choice: Preference,
        record: PreferenceRecord,
    },
    Skipped,
    AlreadySaved,
    NoRound,
}

impl SessionState {
    pub fn with_round(round: Round) -> Self {
        Self {
            round: Some(round),
            saved: false,
        }
    }

    pub fn can_save(&self) -> bool {
        self.round.is_some() && !self.saved
    }
}

/// A failed write. Carries the unchanged state so the round survives.
#[derive(Debug)]
pub struct SaveError {
    pub state: SessionState,
    pub error: anyhow::Error,
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to save preference")
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.error)
    }
}

/// Records the reviewer's choice for the current round.
///
/// A tie/skip writes nothing and leaves the round open, so a binary choice
/// can still be saved afterwards. On a store failure the round stays
/// unsaved; the log may already hold the record while the table does not.
pub fn save_preference(
    state: SessionState,
    choice: Preference,
    store: &PreferenceStore,
) -> Result<(SessionState, SaveOutcome), SaveError> {
    let Some(round) = state.round.as_ref() else {
        return Ok((state, SaveOutcome::NoRound));
    };
    if state.saved {
        return Ok((state, SaveOutcome::AlreadySaved));
    }

    let Some(record) = PreferenceRecord::from_round(&round.prompt, &round.a, &round.b, choice)
    else {
        tracing::info!(event = "pairwise.preference.skipped");
        return Ok((state, SaveOutcome::Skipped));
    };

    if let Err(error) = store.append(&record) {
        return Err(SaveError { state, error });
    }

    let next = SessionState {
        saved: true,
        ..state
    };
    Ok((next, SaveOutcome::Saved { choice, record }))
}
