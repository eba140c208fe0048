//! # world-adapt
//!
//! Deterministic Script → ShotList adaptation.
//!
//! ## Pipeline
//!
//! ```text
//! Script (validated)
//!     │ segment     scenes → beats with running cast
//!     │ derive      beats → shot drafts (establishing, dialogue, reaction,
//!     │             action, transition, cutaway)
//!     │ propagate   ids, durations, camera, moods, tags
//!     │ assemble    totals, shotlist id, timing lock hash
//!     ▼ validate    ShotList.v1, or nothing is returned
//! ShotList
//! ```
//!
//! Every stage is a total function of its input. The clock is never read:
//! `created_at` is caller-supplied or `DEFAULT_CREATED_AT`.

pub mod assemble;
pub mod derive;
pub mod error;
pub mod propagate;
pub mod segment;
pub mod templates;
pub mod timing;

pub use assemble::{DEFAULT_CREATED_AT, assemble};
pub use error::AdaptError;
pub use templates::{ShotKind, ShotTemplate};
pub use timing::{estimate_duration, shotlist_id, timing_lock_hash};

use serde_json::Value;
use world_contracts::{Script, ShotList};

/// Adapt a validated Script with the default `created_at`.
pub fn adapt(script: &Script) -> Result<ShotList, AdaptError> {
    adapt_with(script, DEFAULT_CREATED_AT)
}

pub fn adapt_with(script: &Script, created_at: &str) -> Result<ShotList, AdaptError> {
    let scenes = segment::segment(script);
    let drafts = derive::derive(&scenes);
    let shots = propagate::propagate(&drafts);
    let shotlist = assemble(script, shots, created_at);
    shotlist
        .validate_contract()
        .map_err(AdaptError::InvalidShotList)?;
    tracing::debug!(
        script_id = %script.script_id,
        scenes = script.scenes.len(),
        shots = shotlist.shots.len(),
        timing_lock_hash = %shotlist.timing_lock_hash,
        "script adapted"
    );
    Ok(shotlist)
}

/// Validate a raw Script document against `Script.v1`, then adapt it.
pub fn adapt_value(script: &Value) -> Result<ShotList, AdaptError> {
    let script = Script::from_value(script).map_err(AdaptError::InvalidScript)?;
    adapt(&script)
}
