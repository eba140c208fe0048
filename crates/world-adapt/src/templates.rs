//! Shot template library: camera parameters and duration bounds per shot kind.

use world_contracts::{CameraFraming, CameraMovement};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotTemplate {
    pub template_id: &'static str,
    pub camera_framing: CameraFraming,
    pub camera_movement: CameraMovement,
    pub base_duration_sec: f64,
    pub duration_min_sec: f64,
    pub duration_max_sec: f64,
}

/// What a derived shot is for. Each kind maps to exactly one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotKind {
    Establishing,
    Dialogue,
    Reaction,
    Action,
    Transition,
    Cutaway,
}

const ESTABLISHING: ShotTemplate = ShotTemplate {
    template_id: "tpl_establishing",
    camera_framing: CameraFraming::Wide,
    camera_movement: CameraMovement::Static,
    base_duration_sec: 3.0,
    duration_min_sec: 2.5,
    duration_max_sec: 5.0,
};

const DIALOGUE: ShotTemplate = ShotTemplate {
    template_id: "tpl_dialogue",
    camera_framing: CameraFraming::Medium,
    camera_movement: CameraMovement::Static,
    base_duration_sec: 3.0,
    duration_min_sec: 2.0,
    duration_max_sec: 8.0,
};

const REACTION: ShotTemplate = ShotTemplate {
    template_id: "tpl_reaction",
    camera_framing: CameraFraming::CloseUp,
    camera_movement: CameraMovement::Static,
    base_duration_sec: 2.0,
    duration_min_sec: 1.5,
    duration_max_sec: 3.0,
};

const ACTION: ShotTemplate = ShotTemplate {
    template_id: "tpl_action",
    camera_framing: CameraFraming::Wide,
    camera_movement: CameraMovement::PanLeft,
    base_duration_sec: 2.5,
    duration_min_sec: 1.5,
    duration_max_sec: 5.0,
};

const TRANSITION: ShotTemplate = ShotTemplate {
    template_id: "tpl_transition",
    camera_framing: CameraFraming::Medium,
    camera_movement: CameraMovement::Tracking,
    base_duration_sec: 2.0,
    duration_min_sec: 1.5,
    duration_max_sec: 3.0,
};

const CUTAWAY: ShotTemplate = ShotTemplate {
    template_id: "tpl_cutaway",
    camera_framing: CameraFraming::CloseUp,
    camera_movement: CameraMovement::SlowZoomIn,
    base_duration_sec: 2.0,
    duration_min_sec: 1.5,
    duration_max_sec: 3.0,
};

impl ShotKind {
    pub const ALL: [ShotKind; 6] = [
        ShotKind::Establishing,
        ShotKind::Dialogue,
        ShotKind::Reaction,
        ShotKind::Action,
        ShotKind::Transition,
        ShotKind::Cutaway,
    ];

    pub fn template(self) -> &'static ShotTemplate {
        match self {
            ShotKind::Establishing => &ESTABLISHING,
            ShotKind::Dialogue => &DIALOGUE,
            ShotKind::Reaction => &REACTION,
            ShotKind::Action => &ACTION,
            ShotKind::Transition => &TRANSITION,
            ShotKind::Cutaway => &CUTAWAY,
        }
    }
}
