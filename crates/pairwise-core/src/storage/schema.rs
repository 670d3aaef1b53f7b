use crate::model::PreferenceRecord;
use serde::Serialize;

/// Column order of the tabular export. The header row is exactly these names.
pub const TABLE_COLUMNS: [&str; 10] = [
    "timestamp",
    "prompt",
    "chosen",
    "rejected",
    "model",
    "input_tokens",
    "output_tokens_chosen",
    "output_tokens_rejected",
    "latency_ms_chosen",
    "latency_ms_rejected",
];

/// Flattened projection of a record; field order must match `TABLE_COLUMNS`.
#[derive(Debug, Serialize)]
pub struct TableRow<'a> {
    pub timestamp: &'a str,
    pub prompt: &'a str,
    pub chosen: &'a str,
    pub rejected: &'a str,
    pub model: &'a str,
    pub input_tokens: u64,
    pub output_tokens_chosen: u64,
    pub output_tokens_rejected: u64,
    pub latency_ms_chosen: u64,
    pub latency_ms_rejected: u64,
}

impl<'a> From<&'a PreferenceRecord> for TableRow<'a> {
    fn from(r: &'a PreferenceRecord) -> Self {
        Self {
            timestamp: &r.timestamp,
            prompt: &r.prompt,
            chosen: &r.chosen,
            rejected: &r.rejected,
            model: &r.metadata.model,
            input_tokens: r.metadata.input_tokens,
            output_tokens_chosen: r.metadata.output_tokens_chosen,
            output_tokens_rejected: r.metadata.output_tokens_rejected,
            latency_ms_chosen: r.metadata.latency_ms_chosen,
            latency_ms_rejected: r.metadata.latency_ms_rejected,
        }
    }
}
