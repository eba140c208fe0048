//! Errors from project store operations.

use world_canon::CanonError;
use world_contracts::ContractError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{path}: I/O error: {reason}")]
    Io { path: String, reason: String },

    #[error("invalid {kind} id '{id}'")]
    InvalidId { kind: &'static str, id: String },

    #[error(
        "sequence conflict in project '{project_id}': episode_seq {requested} must be greater than {latest}"
    )]
    SequenceConflict {
        project_id: String,
        requested: u64,
        latest: u64,
    },

    #[error("history entry already exists: {0}")]
    EntryExists(String),

    #[error("episode '{episode_id}' already recorded in project '{project_id}'")]
    DuplicateEpisode {
        project_id: String,
        episode_id: String,
    },

    #[error("episode '{episode_id}' not found in project '{project_id}' history")]
    EpisodeNotFound {
        project_id: String,
        episode_id: String,
    },

    #[error("diff for episode '{episode_id}' does not apply to the current canon: {reason}")]
    DiffRejected { episode_id: String, reason: String },

    #[error("canon for episode '{episode_id}' is not the result of its diff: diff yields {expected}, got {actual}")]
    CanonMismatch {
        episode_id: String,
        expected: String,
        actual: String,
    },

    #[error("replay rejected at episode '{episode_id}': {reason}")]
    ReplayRejected { episode_id: String, reason: String },

    #[error("replay diverged at episode '{episode_id}': recorded {expected}, recomputed {actual}")]
    ReplayDivergence {
        episode_id: String,
        expected: String,
        actual: String,
    },

    #[error("corrupted store: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Canon(#[from] CanonError),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }
}
