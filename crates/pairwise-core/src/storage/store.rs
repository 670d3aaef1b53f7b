use crate::config::StorageSettings;
use crate::errors::StoreError;
use crate::model::PreferenceRecord;
use crate::storage::schema::{TableRow, TABLE_COLUMNS};
use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Append-only preference history: a JSONL log (authoritative) and a CSV
/// mirror of it for spreadsheets. The CSV is never read back except to
/// count rows for divergence checks.
///
/// Assumes a single writer; no locking is done.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    log_path: PathBuf,
    table_path: PathBuf,
}

/// A log line that could not be parsed, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    pub line_no: usize,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct HistoryLoad {
    pub records: Vec<PreferenceRecord>,
    pub malformed: Vec<MalformedLine>,
}

impl PreferenceStore {
    pub fn new(log_path: impl Into<PathBuf>, table_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            table_path: table_path.into(),
        }
    }

    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(&settings.data_file, &settings.csv_file)
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    /// Appends one record to the log, then its row to the table.
    ///
    /// The table header is written only when the table file does not exist
    /// yet. If the process dies between the two writes the table is one row
    /// short; `rebuild_table` repairs that.
    pub fn append(&self, record: &PreferenceRecord) -> anyhow::Result<()> {
        ensure_parent_dir(&self.log_path)?;
        let mut line = serde_json::to_string(record).context("failed to serialize record")?;
        line.push('\n');

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("failed to open log {}", self.log_path.display()))?;
        log.write_all(line.as_bytes())
            .with_context(|| format!("failed to append to {}", self.log_path.display()))?;

        ensure_parent_dir(&self.table_path)?;
        let write_header = !self.table_path.exists();
        let table = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.table_path)
            .with_context(|| format!("failed to open table {}", self.table_path.display()))?;

        let mut w = table_writer(table);
        if write_header {
            w.write_record(TABLE_COLUMNS)?;
        }
        w.serialize(TableRow::from(record))?;
        w.flush()
            .with_context(|| format!("failed to append to {}", self.table_path.display()))?;

        tracing::info!(
            event = "pairwise.record.appended",
            log = %self.log_path.display(),
            table = %self.table_path.display(),
            header_written = write_header,
        );
        Ok(())
    }

    /// Every record in append order. A missing log is an empty history; any
    /// malformed line fails the whole load.
    pub fn load_history(&self) -> anyhow::Result<Vec<PreferenceRecord>> {
        Ok(self.read_log(false)?.records)
    }

    /// Like `load_history`, but malformed lines are skipped and reported.
    pub fn load_history_lenient(&self) -> anyhow::Result<HistoryLoad> {
        let load = self.read_log(true)?;
        for m in &load.malformed {
            tracing::warn!(
                event = "pairwise.history.malformed_line",
                log = %self.log_path.display(),
                line_no = m.line_no,
                error = %m.error,
            );
        }
        Ok(load)
    }

    pub fn count(&self) -> anyhow::Result<usize> {
        Ok(self.load_history()?.len())
    }

    /// The last `n` records, most recent first.
    pub fn recent(&self, n: usize) -> anyhow::Result<Vec<PreferenceRecord>> {
        Ok(self.load_history()?.into_iter().rev().take(n).collect())
    }

    /// Data rows currently in the table (header excluded).
    pub fn table_row_count(&self) -> anyhow::Result<usize> {
        if !self.table_path.exists() {
            return Ok(0);
        }
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.table_path)
            .with_context(|| format!("failed to open table {}", self.table_path.display()))?;
        let mut n = 0;
        for row in rdr.records() {
            row.with_context(|| format!("failed to read table {}", self.table_path.display()))?;
            n += 1;
        }
        Ok(n)
    }

    /// Regenerates the table from the log and returns the number of rows written.
    ///
    /// The new table is written beside the old one and renamed over it.
    pub fn rebuild_table(&self) -> anyhow::Result<usize> {
        let records = self.load_history()?;

        ensure_parent_dir(&self.table_path)?;
        let tmp = sibling_tmp(&self.table_path);
        {
            let file = File::create(&tmp)
                .with_context(|| format!("failed to create {}", tmp.display()))?;
            let mut w = table_writer(file);
            w.write_record(TABLE_COLUMNS)?;
            for r in &records {
                w.serialize(TableRow::from(r))?;
            }
            w.flush()
                .with_context(|| format!("failed to write {}", tmp.display()))?;
        }
        std::fs::rename(&tmp, &self.table_path).with_context(|| {
            format!(
                "failed to replace {} with rebuilt table",
                self.table_path.display()
            )
        })?;

        tracing::info!(
            event = "pairwise.table.rebuilt",
            table = %self.table_path.display(),
            rows = records.len(),
        );
        Ok(records.len())
    }

    pub fn export_log(&self, dest: &Path) -> anyhow::Result<u64> {
        export(&self.log_path, dest)
    }

    pub fn export_table(&self, dest: &Path) -> anyhow::Result<u64> {
        export(&self.table_path, dest)
    }

    fn read_log(&self, lenient: bool) -> anyhow::Result<HistoryLoad> {
        let mut load = HistoryLoad::default();
        if !self.log_path.exists() {
            return Ok(load);
        }

        let file = File::open(&self.log_path)
            .with_context(|| format!("failed to open log {}", self.log_path.display()))?;

        for (idx, raw) in BufReader::new(file).split(b'\n').enumerate() {
            let raw =
                raw.with_context(|| format!("failed to read log {}", self.log_path.display()))?;
            let line_no = idx + 1;

            let parsed = std::str::from_utf8(&raw)
                .map_err(|e| format!("invalid UTF-8: {}", e))
                .and_then(|line| {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        return Ok(None);
                    }
                    serde_json::from_str::<PreferenceRecord>(trimmed)
                        .map(Some)
                        .map_err(|e| e.to_string())
                });

            match parsed {
                Ok(Some(rec)) => load.records.push(rec),
                Ok(None) => {}
                Err(error) if lenient => load.malformed.push(MalformedLine { line_no, error }),
                Err(message) => {
                    return Err(StoreError::MalformedLine {
                        path: self.log_path.clone(),
                        line_no,
                        message,
                    }
                    .into())
                }
            }
        }
        Ok(load)
    }
}

/// RFC 4180 style: CRLF row terminator, quotes only where needed.
fn table_writer<W: Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(inner)
}

fn export(src: &Path, dest: &Path) -> anyhow::Result<u64> {
    if !src.exists() {
        return Err(StoreError::MissingArtifact {
            path: src.to_path_buf(),
        }
        .into());
    }
    ensure_parent_dir(dest)?;
    std::fs::copy(src, dest)
        .with_context(|| format!("failed to copy {} to {}", src.display(), dest.display()))
}

fn sibling_tmp(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
