//! History ledger: one JSON line per accepted diff, in sequence order.
//!
//! The ledger is the ordering authority for replay. Entry files hold the
//! diffs themselves and are never rewritten once created.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::BufRead;
use std::path::Path;

/// Immutable record of one accepted diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sequence_number: u64,
    pub episode_id: String,
    pub diff: Value,
    /// Digest of the canonical snapshot bytes after applying `diff`.
    pub resulting_snapshot_sha256: String,
}

/// Ledger line pointing at a history entry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub sequence_number: u64,
    pub episode_id: String,
    pub entry_file: String,
    pub resulting_snapshot_sha256: String,
}

impl LedgerRecord {
    pub fn for_entry(entry: &HistoryEntry) -> Self {
        Self {
            sequence_number: entry.sequence_number,
            episode_id: entry.episode_id.clone(),
            entry_file: entry_file_name(entry.sequence_number, &entry.episode_id),
            resulting_snapshot_sha256: entry.resulting_snapshot_sha256.clone(),
        }
    }
}

/// `<seq:04>_<episode_id>.diff.json`
pub fn entry_file_name(sequence_number: u64, episode_id: &str) -> String {
    format!("{sequence_number:04}_{episode_id}.diff.json")
}

/// Read ledger records. Blank lines and `#` comments are skipped.
/// Sequence numbers must be strictly increasing.
pub fn read_ledger(reader: impl BufRead) -> Result<Vec<LedgerRecord>, StoreError> {
    let mut records: Vec<LedgerRecord> = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| StoreError::Corrupt(format!("ledger line {}: {e}", line_no + 1)))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: LedgerRecord = serde_json::from_str(trimmed)
            .map_err(|e| StoreError::Corrupt(format!("ledger line {}: {e}", line_no + 1)))?;
        if let Some(previous) = records.last()
            && record.sequence_number <= previous.sequence_number
        {
            return Err(StoreError::Corrupt(format!(
                "ledger line {}: sequence {} does not follow {}",
                line_no + 1,
                record.sequence_number,
                previous.sequence_number
            )));
        }
        records.push(record);
    }
    Ok(records)
}

/// Read the ledger at `path`; a missing ledger is an empty history.
pub fn read_ledger_from_path(path: &Path) -> Result<Vec<LedgerRecord>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
    if bytes.contains(&0) || std::str::from_utf8(&bytes).is_err() {
        return Err(StoreError::Corrupt(format!(
            "{}: not a UTF-8 text ledger",
            path.display()
        )));
    }
    read_ledger(bytes.as_slice())
}
