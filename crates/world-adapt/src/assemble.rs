//! Stage 4: assembly of the ShotList envelope around propagated shots.

use crate::timing::{round3, shotlist_id, timing_lock_hash};
use serde_json::{Map, Value, json};
use world_contracts::{SHOTLIST_SCHEMA_ID, SHOTLIST_SCHEMA_VERSION, Script, Shot, ShotList};

/// Stamp used when the caller supplies no `created_at`.
pub const DEFAULT_CREATED_AT: &str = "1970-01-01T00:00:00Z";

pub fn assemble(script: &Script, shots: Vec<Shot>, created_at: &str) -> ShotList {
    let total_duration_sec = round3(shots.iter().map(|shot| shot.duration_sec).sum());
    let mut metadata = Map::new();
    metadata.insert(
        "producer".to_string(),
        json!({"repo": "world-engine", "component": "ShotListAdapter"}),
    );
    if let Some(project_id) = &script.project_id {
        metadata.insert("project_id".to_string(), Value::String(project_id.clone()));
    }

    ShotList {
        schema_id: SHOTLIST_SCHEMA_ID.to_string(),
        schema_version: SHOTLIST_SCHEMA_VERSION.to_string(),
        shotlist_id: shotlist_id(&script.script_id),
        script_id: script.script_id.clone(),
        episode_id: script.episode_id.clone(),
        timing_lock_hash: timing_lock_hash(&shots),
        shots,
        total_duration_sec,
        created_at: created_at.to_string(),
        metadata,
    }
}
