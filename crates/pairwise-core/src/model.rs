use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata captured around a single completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model identifier as reported by the provider.
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Wall-clock duration of the call in whole milliseconds.
    pub latency_ms: u64,
    /// UTC start instant of the call (RFC 3339).
    pub timestamp: String,
}

/// One candidate response and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub meta: GenerationMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    ResponseA,
    ResponseB,
    TieSkip,
}

impl Preference {
    pub const ALL: [Preference; 3] = [
        Preference::ResponseA,
        Preference::ResponseB,
        Preference::TieSkip,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Preference::ResponseA => "Response A",
            Preference::ResponseB => "Response B",
            Preference::TieSkip => "Tie / Skip",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens_chosen: u64,
    pub output_tokens_rejected: u64,
    pub latency_ms_chosen: u64,
    pub latency_ms_rejected: u64,
}

/// A persisted human judgment between two responses to the same prompt.
///
/// Field names are the on-disk JSONL schema; renaming any of them breaks
/// existing logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub timestamp: String,
    pub prompt: String,
    pub chosen: String,
    pub rejected: String,
    pub metadata: RecordMetadata,
}

impl PreferenceRecord {
    /// Builds the record for a binary choice. Returns `None` for `TieSkip`.
    ///
    /// `timestamp`, `model` and `input_tokens` always come from response A.
    pub fn from_round(
        prompt: &str,
        a: &Generation,
        b: &Generation,
        choice: Preference,
    ) -> Option<Self> {
        let (chosen, rejected) = match choice {
            Preference::ResponseA => (a, b),
            Preference::ResponseB => (b, a),
            Preference::TieSkip => return None,
        };

        Some(Self {
            timestamp: a.meta.timestamp.clone(),
            prompt: prompt.to_string(),
            chosen: chosen.text.clone(),
            rejected: rejected.text.clone(),
            metadata: RecordMetadata {
                model: a.meta.model.clone(),
                input_tokens: a.meta.input_tokens,
                output_tokens_chosen: chosen.meta.output_tokens,
                output_tokens_rejected: rejected.meta.output_tokens,
                latency_ms_chosen: chosen.meta.latency_ms,
                latency_ms_rejected: rejected.meta.latency_ms,
            },
        })
    }
}
