//! Error types for canon loading, decisions and policy files.

use crate::decision::CanonDecision;
use world_contracts::ContractError;

/// Errors raised while loading or serializing a canon snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CanonError {
    #[error("invalid canon snapshot: {0}")]
    InvalidSnapshot(String),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Errors raised by the ShotList decision gate.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("ShotList missing timing_lock_hash")]
    MissingTimingLock,

    #[error("ShotList missing schema metadata")]
    MissingSchemaMetadata,

    #[error(transparent)]
    Canon(#[from] CanonError),

    /// Raised only by `assert_shotlist_canon`.
    #[error("CanonGate denied: {}", .decision.reasons.join(", "))]
    Denied { decision: Box<CanonDecision> },
}

/// Errors raised while loading a forbidden-token policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("policy file missing: {0}")]
    Missing(String),

    #[error("policy file unreadable: {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("invalid policy format: {0}")]
    InvalidFormat(String),
}
