//! Stage 2: shot derivation. Beats become shot drafts, in beat order.

use crate::segment::SceneIr;
use crate::templates::ShotKind;
use world_contracts::{Beat, Scene};

/// A shot before ids, durations and scene metadata are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotDraft {
    pub kind: ShotKind,
    pub characters: Vec<String>,
    pub action_beat: String,
    /// `(speaker, line)` for dialogue shots.
    pub spoken: Option<(String, String)>,
    /// Beat-level emotion; scene tags fill in when absent.
    pub emotion: Option<String>,
}

impl ShotDraft {
    fn new(kind: ShotKind, characters: Vec<String>, action_beat: impl Into<String>) -> Self {
        Self {
            kind,
            characters,
            action_beat: action_beat.into(),
            spoken: None,
            emotion: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneDrafts<'a> {
    pub scene: &'a Scene,
    pub drafts: Vec<ShotDraft>,
}

pub fn derive<'a>(scenes: &[SceneIr<'a>]) -> Vec<SceneDrafts<'a>> {
    scenes.iter().map(derive_scene).collect()
}

fn derive_scene<'a>(ir: &SceneIr<'a>) -> SceneDrafts<'a> {
    let scene = ir.scene;
    let mut drafts = vec![ShotDraft::new(
        ShotKind::Establishing,
        ir.opening_cast.clone(),
        format!("Establishing shot of {}.", scene.location),
    )];

    for step in &ir.beats {
        match step.beat {
            Beat::Dialogue {
                speaker,
                line,
                emotion,
            } => {
                drafts.push(ShotDraft {
                    spoken: Some((speaker.clone(), line.clone())),
                    emotion: emotion.clone().filter(|e| !e.is_empty()),
                    ..ShotDraft::new(
                        ShotKind::Dialogue,
                        vec![speaker.clone()],
                        format!("{speaker} speaks."),
                    )
                });
                let listeners: Vec<String> = step
                    .cast
                    .iter()
                    .filter(|id| *id != speaker)
                    .cloned()
                    .collect();
                if !listeners.is_empty() {
                    drafts.push(ShotDraft::new(ShotKind::Reaction, listeners, "Reaction shot."));
                }
            }
            Beat::Action {
                description,
                characters,
            } => {
                let on_screen = if characters.is_empty() {
                    step.cast.clone()
                } else {
                    characters.clone()
                };
                drafts.push(ShotDraft::new(ShotKind::Action, on_screen, description.clone()));
            }
            Beat::CharacterEnter { character } => drafts.push(ShotDraft::new(
                ShotKind::Transition,
                vec![character.clone()],
                format!("{character} enters."),
            )),
            Beat::CharacterExit { character } => drafts.push(ShotDraft::new(
                ShotKind::Transition,
                vec![character.clone()],
                format!("{character} exits."),
            )),
        }
    }

    if ir.beats.is_empty() {
        drafts.push(ShotDraft::new(
            ShotKind::Cutaway,
            ir.opening_cast.clone(),
            "Cutaway detail.",
        ));
    }

    SceneDrafts { scene, drafts }
}
