//! Adaptation errors.

use world_contracts::ContractError;

#[derive(Debug, thiserror::Error)]
pub enum AdaptError {
    /// The Script did not pass `Script.v1`; nothing was adapted.
    #[error("invalid Script: {0}")]
    InvalidScript(ContractError),

    /// The produced ShotList did not pass `ShotList.v1`; it is discarded.
    #[error("invalid ShotList produced: {0}")]
    InvalidShotList(ContractError),
}
