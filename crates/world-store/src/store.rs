//! `ProjectCanonStore`: snapshot + ledger persistence rooted at a directory.

use crate::atomic::{append_line, write_atomic, write_new};
use crate::error::StoreError;
use crate::ledger::{HistoryEntry, LedgerRecord, entry_file_name, read_ledger_from_path};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use world_canon::{Canon, DiffError, apply_canon_diff};
use world_contracts::{CanonViolationReport, canonical_json_pretty};

pub const SNAPSHOT_FILE: &str = "CanonSnapshot.json";
pub const HISTORY_DIR: &str = "history";
pub const LEDGER_FILE: &str = "ledger.jsonl";
pub const VIOLATIONS_DIR: &str = "violations";

/// Project and episode ids become path components: `[A-Za-z0-9_.-]+`, not
/// starting with `.`.
pub fn is_valid_store_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn check_id(kind: &'static str, id: &str) -> Result<(), StoreError> {
    if is_valid_store_id(id) {
        Ok(())
    } else {
        Err(StoreError::InvalidId {
            kind,
            id: id.to_string(),
        })
    }
}

fn join_errors(errors: &[DiffError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of `commit`. A rejected diff leaves disk untouched.
#[derive(Debug, Clone)]
pub enum CommitOutcome {
    Committed { canon: Canon, entry: HistoryEntry },
    Rejected(Vec<DiffError>),
}

#[derive(Debug, Clone)]
pub struct ProjectCanonStore {
    root: PathBuf,
}

impl ProjectCanonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.root.join(project_id)
    }

    pub fn snapshot_path(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join(SNAPSHOT_FILE)
    }

    pub fn ledger_path(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join(HISTORY_DIR).join(LEDGER_FILE)
    }

    pub fn violation_report_path(&self, project_id: &str, episode_id: &str) -> PathBuf {
        self.project_dir(project_id)
            .join(VIOLATIONS_DIR)
            .join(format!("{episode_id}_CanonViolationReport.json"))
    }

    /// Current canon; the empty canon if the project has no snapshot yet.
    pub fn load(&self, project_id: &str) -> Result<Canon, StoreError> {
        check_id("project", project_id)?;
        let path = self.snapshot_path(project_id);
        if !path.exists() {
            tracing::debug!(project_id, "no snapshot yet; starting from empty canon");
            return Ok(Canon::empty());
        }
        let raw = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
        Ok(Canon::from_value(&value)?)
    }

    /// Ledger records in sequence order.
    pub fn history(&self, project_id: &str) -> Result<Vec<LedgerRecord>, StoreError> {
        check_id("project", project_id)?;
        read_ledger_from_path(&self.ledger_path(project_id))
    }

    pub fn read_entry(&self, project_id: &str, record: &LedgerRecord) -> Result<HistoryEntry, StoreError> {
        if record.entry_file != entry_file_name(record.sequence_number, &record.episode_id) {
            return Err(StoreError::Corrupt(format!(
                "ledger record {}/{} names unexpected entry file '{}'",
                record.sequence_number, record.episode_id, record.entry_file
            )));
        }
        let path = self
            .project_dir(project_id)
            .join(HISTORY_DIR)
            .join(&record.entry_file);
        let raw = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        let entry: HistoryEntry = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
        if entry.sequence_number != record.sequence_number || entry.episode_id != record.episode_id {
            return Err(StoreError::Corrupt(format!(
                "{}: entry does not match ledger record {}/{}",
                path.display(),
                record.sequence_number,
                record.episode_id
            )));
        }
        Ok(entry)
    }

    /// Persist `new_canon` as the result of applying `diff` to the current
    /// snapshot.
    ///
    /// `episode_seq` must exceed the ledger head; the store never picks one.
    /// `new_canon` must be exactly what `diff` produces, otherwise the history
    /// could not be replayed. Order: immutable entry file, ledger line, then
    /// snapshot replacement.
    pub fn save(
        &self,
        project_id: &str,
        new_canon: &Canon,
        diff: &Value,
        episode_id: &str,
        episode_seq: u64,
    ) -> Result<HistoryEntry, StoreError> {
        self.check_append(project_id, episode_id, episode_seq)?;

        let outcome = apply_canon_diff(&self.load(project_id)?, diff);
        if !outcome.is_accepted() {
            return Err(StoreError::DiffRejected {
                episode_id: episode_id.to_string(),
                reason: join_errors(&outcome.errors),
            });
        }
        if outcome.canon != *new_canon {
            return Err(StoreError::CanonMismatch {
                episode_id: episode_id.to_string(),
                expected: outcome.canon.digest()?,
                actual: new_canon.digest()?,
            });
        }
        self.append(project_id, new_canon, diff, episode_id, episode_seq)
    }

    /// Load, apply `diff`, and save if accepted.
    pub fn commit(
        &self,
        project_id: &str,
        diff: &Value,
        episode_id: &str,
        episode_seq: u64,
    ) -> Result<CommitOutcome, StoreError> {
        let current = self.load(project_id)?;
        let outcome = apply_canon_diff(&current, diff);
        if !outcome.is_accepted() {
            return Ok(CommitOutcome::Rejected(outcome.errors));
        }
        self.check_append(project_id, episode_id, episode_seq)?;
        let entry = self.append(project_id, &outcome.canon, diff, episode_id, episode_seq)?;
        Ok(CommitOutcome::Committed {
            canon: outcome.canon,
            entry,
        })
    }

    fn check_append(&self, project_id: &str, episode_id: &str, episode_seq: u64) -> Result<(), StoreError> {
        check_id("project", project_id)?;
        check_id("episode", episode_id)?;

        let ledger = self.history(project_id)?;
        if let Some(head) = ledger.last()
            && episode_seq <= head.sequence_number
        {
            return Err(StoreError::SequenceConflict {
                project_id: project_id.to_string(),
                requested: episode_seq,
                latest: head.sequence_number,
            });
        }
        if ledger.iter().any(|record| record.episode_id == episode_id) {
            return Err(StoreError::DuplicateEpisode {
                project_id: project_id.to_string(),
                episode_id: episode_id.to_string(),
            });
        }
        Ok(())
    }

    /// Write entry, ledger line and snapshot for an already checked step.
    ///
    /// An entry file left behind by an interrupted save (written, but never
    /// reached the ledger) is adopted when its bytes match this entry.
    fn append(
        &self,
        project_id: &str,
        new_canon: &Canon,
        diff: &Value,
        episode_id: &str,
        episode_seq: u64,
    ) -> Result<HistoryEntry, StoreError> {
        let snapshot = new_canon.to_canonical_json()?;
        let entry = HistoryEntry {
            sequence_number: episode_seq,
            episode_id: episode_id.to_string(),
            diff: diff.clone(),
            resulting_snapshot_sha256: new_canon.digest()?,
        };
        let entry_path = self
            .project_dir(project_id)
            .join(HISTORY_DIR)
            .join(entry_file_name(episode_seq, episode_id));
        let entry_bytes = canonical_json_pretty(&entry)?;
        match write_new(&entry_path, entry_bytes.as_bytes()) {
            Ok(()) => {}
            Err(StoreError::EntryExists(_))
                if fs::read(&entry_path).ok().as_deref() == Some(entry_bytes.as_bytes()) =>
            {
                tracing::warn!(
                    project_id,
                    episode_id,
                    path = %entry_path.display(),
                    "adopting entry file left by an interrupted save"
                );
            }
            Err(error) => return Err(error),
        }

        let record = LedgerRecord::for_entry(&entry);
        let line = serde_json::to_string(&record)
            .map_err(|e| StoreError::Corrupt(format!("ledger record: {e}")))?;
        append_line(&self.ledger_path(project_id), &line)?;

        write_atomic(&self.snapshot_path(project_id), snapshot.as_bytes())?;
        tracing::info!(
            project_id,
            episode_id,
            episode_seq,
            digest = %entry.resulting_snapshot_sha256,
            "canon snapshot saved"
        );
        Ok(entry)
    }

    /// Rebuild canon from the empty state through `upto_episode_id`
    /// (inclusive), checking every step against its recorded digest.
    pub fn replay(&self, project_id: &str, upto_episode_id: &str) -> Result<Canon, StoreError> {
        let ledger = self.history(project_id)?;
        let Some(stop) = ledger
            .iter()
            .position(|record| record.episode_id == upto_episode_id)
        else {
            return Err(StoreError::EpisodeNotFound {
                project_id: project_id.to_string(),
                episode_id: upto_episode_id.to_string(),
            });
        };

        let mut canon = Canon::empty();
        for record in &ledger[..=stop] {
            let entry = self.read_entry(project_id, record)?;
            let outcome = apply_canon_diff(&canon, &entry.diff);
            if !outcome.is_accepted() {
                return Err(StoreError::ReplayRejected {
                    episode_id: entry.episode_id,
                    reason: join_errors(&outcome.errors),
                });
            }
            let actual = outcome.canon.digest()?;
            if actual != entry.resulting_snapshot_sha256 {
                return Err(StoreError::ReplayDivergence {
                    episode_id: entry.episode_id,
                    expected: entry.resulting_snapshot_sha256,
                    actual,
                });
            }
            canon = outcome.canon;
        }
        tracing::debug!(project_id, upto_episode_id, steps = stop + 1, "canon replayed");
        Ok(canon)
    }

    /// Write a violation report under `violations/`. Reports for different
    /// episodes never collide; a rerun for the same episode replaces its own.
    pub fn save_violation_report(
        &self,
        project_id: &str,
        episode_id: &str,
        report: &CanonViolationReport,
    ) -> Result<PathBuf, StoreError> {
        check_id("project", project_id)?;
        check_id("episode", episode_id)?;
        report.validate_contract()?;
        let path = self.violation_report_path(project_id, episode_id);
        write_atomic(&path, canonical_json_pretty(report)?.as_bytes())?;
        tracing::info!(project_id, episode_id, path = %path.display(), "violation report saved");
        Ok(path)
    }
}
