//! ShotList contract: ordered shots derived from a Script.

use crate::error::ContractError;
use crate::schema::{SchemaId, validate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SHOTLIST_SCHEMA_ID: &str = "ShotList";
pub const SHOTLIST_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotList {
    pub schema_id: String,
    pub schema_version: String,
    pub shotlist_id: String,
    pub script_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<String>,
    pub shots: Vec<Shot>,
    pub total_duration_sec: f64,
    /// Single timing authority for downstream stages; covers shot order and durations.
    pub timing_lock_hash: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub shot_id: String,
    pub scene_id: String,
    pub duration_sec: f64,
    pub camera_framing: CameraFraming,
    pub camera_movement: CameraMovement,
    #[serde(default)]
    pub characters: Vec<CharacterInShot>,
    #[serde(default)]
    pub environment_notes: String,
    #[serde(default)]
    pub action_beat: String,
    pub audio_intent: AudioIntent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_template_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraFraming {
    Wide,
    Medium,
    CloseUp,
}

impl CameraFraming {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wide => "WIDE",
            Self::Medium => "MEDIUM",
            Self::CloseUp => "CLOSE_UP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraMovement {
    Static,
    PanLeft,
    PanRight,
    Tracking,
    SlowZoomIn,
}

impl CameraMovement {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "STATIC",
            Self::PanLeft => "PAN_LEFT",
            Self::PanRight => "PAN_RIGHT",
            Self::Tracking => "TRACKING",
            Self::SlowZoomIn => "SLOW_ZOOM_IN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterInShot {
    pub character_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<String>,
}

impl CharacterInShot {
    pub fn new(character_id: impl Into<String>) -> Self {
        Self {
            character_id: character_id.into(),
            expression: None,
            pose: None,
        }
    }
}

/// Audio intent: voice-over reference, SFX tags and music mood.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vo_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vo_speaker_id: Option<String>,
    #[serde(default)]
    pub sfx_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_mood: Option<String>,
}

impl Shot {
    /// Every human-readable text field of the shot, in a fixed order.
    pub fn text_fields(&self) -> Vec<&str> {
        let mut texts = vec![
            self.action_beat.as_str(),
            self.environment_notes.as_str(),
            self.camera_framing.as_str(),
            self.camera_movement.as_str(),
        ];
        if let Some(text) = self.audio_intent.vo_text.as_deref() {
            texts.push(text);
        }
        if let Some(speaker) = self.audio_intent.vo_speaker_id.as_deref() {
            texts.push(speaker);
        }
        texts
    }
}

impl ShotList {
    /// Validate `value` against `ShotList.v1`, then decode it.
    pub fn from_value(value: &Value) -> Result<Self, ContractError> {
        validate(value, SchemaId::ShotListV1).into_result()?;
        serde_json::from_value(value.clone()).map_err(|e| ContractError::Decode {
            schema: SchemaId::ShotListV1,
            reason: e.to_string(),
        })
    }

    pub fn to_value(&self) -> Result<Value, ContractError> {
        serde_json::to_value(self).map_err(|e| ContractError::Serialize(e.to_string()))
    }

    /// Re-check this in-memory shotlist against `ShotList.v1`.
    pub fn validate_contract(&self) -> Result<(), ContractError> {
        validate(&self.to_value()?, SchemaId::ShotListV1).into_result()
    }
}
