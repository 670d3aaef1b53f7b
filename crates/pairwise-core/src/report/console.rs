use crate::model::{Generation, Preference, PreferenceRecord};

pub const PREVIEW_LIMIT: usize = 5;
pub const PREVIEW_PROMPT_CHARS: usize = 80;
pub const PREVIEW_CHOSEN_CHARS: usize = 120;

/// At most `max` chars of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub fn render_generation(label: &str, g: &Generation) -> String {
    let meta = serde_json::to_string_pretty(&g.meta).unwrap_or_default();
    let mut s = String::new();
    s.push_str(&format!("### {}\n", label));
    s.push_str(&g.text);
    if !g.text.ends_with('\n') {
        s.push('\n');
    }
    s.push_str("--- metadata ---\n");
    s.push_str(&meta);
    s.push('\n');
    s
}

/// Newest first; `records` is expected oldest first, as loaded from the log.
pub fn render_preview(records: &[PreferenceRecord], limit: usize) -> String {
    let mut s = String::new();
    for rec in records.iter().rev().take(limit) {
        s.push_str(&format!(
            "{} — `{}…`\n",
            rec.timestamp,
            truncate_chars(&rec.prompt, PREVIEW_PROMPT_CHARS)
        ));
        s.push_str(&format!(
            "  Chosen (first {} chars): {}\n",
            PREVIEW_CHOSEN_CHARS,
            truncate_chars(&rec.chosen, PREVIEW_CHOSEN_CHARS)
        ));
        s.push_str("  ---\n");
    }
    s
}

pub fn render_saved(choice: Preference) -> String {
    format!("✅ Saved! {} marked as chosen.", choice)
}

pub fn render_skipped() -> &'static str {
    "⚠️  Record skipped — no preference saved."
}

pub fn render_status(records: usize, table_rows: usize) -> String {
    let mut s = format!("{} record(s) saved.", records);
    if table_rows != records {
        s.push_str(&format!(
            "\nwarning: table has {} row(s) but the log has {}; run `pairwise rebuild-table`",
            table_rows, records
        ));
    }
    s
}
