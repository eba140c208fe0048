//! # world-store
//!
//! Durable, per-project canon persistence.
//!
//! This crate provides:
//! - `ProjectCanonStore`: load / save / replay / commit over a directory root
//! - the append-only history ledger (`ledger.jsonl`) and immutable entries
//! - atomic file replacement for snapshots and reports
//!
//! Sequence numbers are always supplied by the caller. The store validates
//! them against the ledger head and never derives one from directory contents.
//!
//! ## Layout
//!
//! ```text
//! <root>/<project_id>/
//!     CanonSnapshot.json                      current canon, canonical bytes
//!     history/ledger.jsonl                    one line per accepted diff
//!     history/<seq:04>_<episode_id>.diff.json immutable HistoryEntry
//!     violations/<episode_id>_CanonViolationReport.json
//! ```

pub mod atomic;
pub mod error;
pub mod ledger;
pub mod store;

pub use atomic::write_atomic;
pub use error::StoreError;
pub use ledger::{
    HistoryEntry, LedgerRecord, entry_file_name, read_ledger, read_ledger_from_path,
};
pub use store::{
    CommitOutcome, HISTORY_DIR, LEDGER_FILE, ProjectCanonStore, SNAPSHOT_FILE, VIOLATIONS_DIR,
    is_valid_store_id,
};
