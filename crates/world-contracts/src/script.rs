//! Script contract: a roster of characters and scenes of ordered narrative beats.

use crate::error::ContractError;
use crate::schema::{SchemaId, validate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub const SCRIPT_SCHEMA_ID: &str = "Script";

/// A narrative script, validated against `Script.v1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub schema_id: String,
    pub schema_version: String,
    pub script_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub characters: Vec<RosterEntry>,
    pub scenes: Vec<Scene>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// One roster entry. Every fact besides `id` is optional and, when present,
/// is an explicit claim the story-draft gate checks against canon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_id: String,
    pub location: String,
    pub time_of_day: String,
    /// Characters on screen when the scene opens.
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub beats: Vec<Beat>,
    #[serde(default)]
    pub emotional_tags: Vec<String>,
}

/// A single narrative beat. Order within a scene is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Beat {
    Dialogue {
        speaker: String,
        line: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emotion: Option<String>,
    },
    Action {
        description: String,
        #[serde(default)]
        characters: Vec<String>,
    },
    CharacterEnter {
        character: String,
    },
    CharacterExit {
        character: String,
    },
}

impl Beat {
    /// Characters this beat names explicitly.
    pub fn referenced_characters(&self) -> Vec<&str> {
        match self {
            Self::Dialogue { speaker, .. } => vec![speaker.as_str()],
            Self::Action { characters, .. } => characters.iter().map(String::as_str).collect(),
            Self::CharacterEnter { character } | Self::CharacterExit { character } => {
                vec![character.as_str()]
            }
        }
    }
}

impl Script {
    /// Validate `value` against `Script.v1`, then decode it.
    pub fn from_value(value: &Value) -> Result<Self, ContractError> {
        validate(value, SchemaId::ScriptV1).into_result()?;
        serde_json::from_value(value.clone()).map_err(|e| ContractError::Decode {
            schema: SchemaId::ScriptV1,
            reason: e.to_string(),
        })
    }

    /// Every character id the script references, in first-reference order:
    /// roster first, then scene casts and beats in narrative order.
    pub fn referenced_characters(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        let mut push = |id: &str| {
            if seen.insert(id.to_string()) {
                ordered.push(id.to_string());
            }
        };

        for entry in &self.characters {
            push(&entry.id);
        }
        for scene in &self.scenes {
            for id in &scene.characters {
                push(id);
            }
            for beat in &scene.beats {
                for id in beat.referenced_characters() {
                    push(id);
                }
            }
        }
        ordered
    }

    /// Roster entry for `id`, if the roster declares one.
    pub fn roster_entry(&self, id: &str) -> Option<&RosterEntry> {
        self.characters.iter().find(|entry| entry.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "schema_id": "Script",
            "schema_version": "1.0.0",
            "script_id": "s001",
            "project_id": "proj1",
            "title": "Test Episode",
            "characters": [{"id": "char_lena", "name": "Lena"}],
            "scenes": [{
                "scene_id": "sc001",
                "location": "INT. HALL",
                "time_of_day": "DAY",
                "characters": ["char_marco"],
                "beats": [
                    {"type": "dialogue", "speaker": "char_lena", "line": "Hello."},
                    {"type": "character_enter", "character": "char_king"},
                    {"type": "action", "description": "They bow.", "characters": ["char_marco", "char_lena"]}
                ]
            }]
        })
    }

    #[test]
    fn decodes_tagged_beats() {
        let script = Script::from_value(&sample()).expect("sample should validate");
        let beats = &script.scenes[0].beats;
        assert_eq!(beats.len(), 3);
        assert!(matches!(&beats[0], Beat::Dialogue { speaker, emotion: None, .. } if speaker == "char_lena"));
        assert!(matches!(&beats[1], Beat::CharacterEnter { character } if character == "char_king"));
    }

    #[test]
    fn referenced_characters_are_unique_and_ordered() {
        let script = Script::from_value(&sample()).expect("sample should validate");
        assert_eq!(
            script.referenced_characters(),
            vec!["char_lena", "char_marco", "char_king"]
        );
    }

    #[test]
    fn schema_failure_blocks_decoding() {
        let mut raw = sample();
        raw["scenes"][0]["beats"][0]
            .as_object_mut()
            .expect("beat object")
            .remove("line");
        let err = Script::from_value(&raw).expect_err("missing line must fail");
        assert!(matches!(
            err,
            ContractError::SchemaViolation {
                schema: SchemaId::ScriptV1,
                ..
            }
        ));
    }
}
