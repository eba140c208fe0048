//! Stage 1: beat segmentation.
//!
//! Turns each scene into an ordered list of beats, each paired with the cast
//! on screen once that beat has played. Enter/exit beats are the only beats
//! that change the cast.

use world_contracts::{Beat, Scene, Script};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneIr<'a> {
    pub scene: &'a Scene,
    /// Cast when the scene opens.
    pub opening_cast: Vec<String>,
    pub beats: Vec<BeatIr<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeatIr<'a> {
    pub beat: &'a Beat,
    pub cast: Vec<String>,
}

pub fn segment(script: &Script) -> Vec<SceneIr<'_>> {
    script.scenes.iter().map(segment_scene).collect()
}

fn segment_scene(scene: &Scene) -> SceneIr<'_> {
    let mut cast: Vec<String> = Vec::new();
    for id in &scene.characters {
        if !cast.contains(id) {
            cast.push(id.clone());
        }
    }
    let opening_cast = cast.clone();

    let beats = scene
        .beats
        .iter()
        .map(|beat| {
            match beat {
                Beat::CharacterEnter { character } if !cast.contains(character) => {
                    cast.push(character.clone());
                }
                Beat::CharacterExit { character } => cast.retain(|id| id != character),
                _ => {}
            }
            BeatIr {
                beat,
                cast: cast.clone(),
            }
        })
        .collect();

    SceneIr {
        scene,
        opening_cast,
        beats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(beats: Vec<Beat>) -> Scene {
        Scene {
            scene_id: "sc1".to_string(),
            location: "Hall".to_string(),
            time_of_day: "DAY".to_string(),
            characters: vec!["alice".to_string(), "alice".to_string(), "bob".to_string()],
            beats,
            emotional_tags: Vec::new(),
        }
    }

    #[test]
    fn running_cast_tracks_entries_and_exits() {
        let scene = scene(vec![
            Beat::CharacterExit {
                character: "bob".to_string(),
            },
            Beat::CharacterEnter {
                character: "carol".to_string(),
            },
            Beat::Action {
                description: "Carol waves.".to_string(),
                characters: Vec::new(),
            },
            Beat::CharacterEnter {
                character: "carol".to_string(),
            },
        ]);
        let ir = segment_scene(&scene);
        assert_eq!(ir.opening_cast, vec!["alice", "bob"]);
        let casts: Vec<Vec<String>> = ir.beats.iter().map(|b| b.cast.clone()).collect();
        assert_eq!(
            casts,
            vec![
                vec!["alice".to_string()],
                vec!["alice".to_string(), "carol".to_string()],
                vec!["alice".to_string(), "carol".to_string()],
                vec!["alice".to_string(), "carol".to_string()],
            ]
        );
    }
}
