//! Stage 3: metadata propagation.
//!
//! Attaches global shot ids, template camera settings, durations, scene
//! environment notes, emotional tags and music mood to every draft.

use crate::derive::SceneDrafts;
use crate::timing::estimate_duration;
use world_contracts::{AudioIntent, CharacterInShot, Shot};

/// `<scene_id>_shot_<NNN>` with a script-wide index.
pub fn shot_id(scene_id: &str, global_index: usize) -> String {
    format!("{scene_id}_shot_{global_index:03}")
}

pub fn propagate(scenes: &[SceneDrafts<'_>]) -> Vec<Shot> {
    let mut shots = Vec::new();
    for scene_drafts in scenes {
        let scene = scene_drafts.scene;
        let scene_tag = scene.emotional_tags.first().cloned();
        let environment_notes = format!("{}, {}", scene.location, scene.time_of_day);

        for draft in &scene_drafts.drafts {
            let template = draft.kind.template();
            let spoken_line = draft.spoken.as_ref().map(|(_, line)| line.as_str());
            let (vo_speaker_id, vo_text) = match &draft.spoken {
                Some((speaker, line)) => (Some(speaker.clone()), Some(line.clone())),
                None => (None, None),
            };

            shots.push(Shot {
                shot_id: shot_id(&scene.scene_id, shots.len()),
                scene_id: scene.scene_id.clone(),
                duration_sec: estimate_duration(template, spoken_line),
                camera_framing: template.camera_framing,
                camera_movement: template.camera_movement,
                characters: draft
                    .characters
                    .iter()
                    .map(|id| CharacterInShot::new(id.as_str()))
                    .collect(),
                environment_notes: environment_notes.clone(),
                action_beat: draft.action_beat.clone(),
                audio_intent: AudioIntent {
                    vo_text,
                    vo_speaker_id,
                    sfx_tags: Vec::new(),
                    music_mood: scene_tag.clone(),
                },
                emotional_tag: draft.emotion.clone().or_else(|| scene_tag.clone()),
                shot_template_id: Some(template.template_id.to_string()),
            });
        }
    }
    shots
}
