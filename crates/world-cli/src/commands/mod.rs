pub mod canon_commit;
pub mod canon_decide;
pub mod canon_replay;
pub mod produce_shotlist;
pub mod validate_script;
pub mod validate_shotlist;
pub mod validate_story_draft;
pub mod verify;
