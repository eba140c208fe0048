//! # world-contracts
//!
//! Contract documents exchanged between world-engine stages.
//!
//! This crate provides:
//! - `Script`, `ShotList` and `CanonViolationReport` models
//! - the embedded JSON Schema contracts (`Script.v1`, `ShotList.v1`,
//!   `CanonViolationReport.v1`) and the validator that enforces them
//! - canonical JSON serialization (sorted keys, fixed indent) and digests
//!
//! ## Flow
//!
//! ```text
//! raw JSON ── validate(SchemaId) ──> typed model ── canonical_json_pretty ──> bytes on disk
//! ```

pub mod canonical;
pub mod error;
pub mod report;
pub mod schema;
pub mod script;
pub mod shotlist;

pub use canonical::{
    canonical_json_compact, canonical_json_pretty, sha256_hex, sort_json_value, stable_hash,
};
pub use error::ContractError;
pub use report::{
    CANON_VIOLATION_REPORT_SCHEMA_ID, CANON_VIOLATION_REPORT_SCHEMA_VERSION, CanonViolation,
    CanonViolationReport, ViolationKind,
};
pub use schema::{SchemaId, ValidationResult, validate};
pub use script::{Beat, RosterEntry, SCRIPT_SCHEMA_ID, Scene, Script};
pub use shotlist::{
    AudioIntent, CameraFraming, CameraMovement, CharacterInShot, SHOTLIST_SCHEMA_ID,
    SHOTLIST_SCHEMA_VERSION, Shot, ShotList,
};
