//! Integration tests: Script fixtures through the full adaptation pipeline.
//!
//! Each fixture in tests/fixtures/ has:
//! - <name>.json: the Script
//! - <name>.expect.json: expected shot ids, durations, totals and hashes
//!
//! `script_multi_scene` also carries its full canonical ShotList.

use serde_json::{Value, json};
use std::path::PathBuf;
use world_adapt::{AdaptError, adapt, adapt_value, adapt_with};
use world_contracts::{Script, canonical_json_pretty};

fn fixture_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(file)
}

fn read_text(file: &str) -> String {
    let path = fixture_path(file);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

fn read_json(file: &str) -> Value {
    serde_json::from_str(&read_text(file)).unwrap_or_else(|e| panic!("failed to parse {file}: {e}"))
}

fn run_fixture(name: &str) {
    let script = read_json(&format!("{name}.json"));
    let expected = read_json(&format!("{name}.expect.json"));

    let shotlist = adapt_value(&script).unwrap_or_else(|e| panic!("{name}: {e}"));
    let shot_ids: Vec<&str> = shotlist.shots.iter().map(|s| s.shot_id.as_str()).collect();
    let durations: Vec<f64> = shotlist.shots.iter().map(|s| s.duration_sec).collect();

    assert_eq!(json!(shot_ids), expected["shot_ids"], "{name}");
    assert_eq!(json!(durations), expected["durations"], "{name}");
    assert_eq!(json!(shotlist.total_duration_sec), expected["total_duration_sec"], "{name}");
    assert_eq!(json!(shotlist.timing_lock_hash), expected["timing_lock_hash"], "{name}");
    assert_eq!(json!(shotlist.shotlist_id), expected["shotlist_id"], "{name}");
}

#[test]
fn two_character_dialogue() {
    run_fixture("script_two_character_dialogue");
}

#[test]
fn multi_scene_with_entries_and_exits() {
    run_fixture("script_multi_scene");
}

#[test]
fn multi_scene_shotlist_is_byte_identical_to_golden() {
    let shotlist = adapt_value(&read_json("script_multi_scene.json")).expect("adapt");
    let rendered = canonical_json_pretty(&shotlist).expect("serialize");
    assert_eq!(rendered, read_text("script_multi_scene.shotlist.json"));
}

#[test]
fn adaptation_is_deterministic() {
    let script = Script::from_value(&read_json("script_multi_scene.json")).expect("script");
    let first = canonical_json_pretty(&adapt(&script).expect("adapt")).expect("serialize");
    let second = canonical_json_pretty(&adapt(&script).expect("adapt")).expect("serialize");
    assert_eq!(first, second);
}

#[test]
fn created_at_does_not_touch_the_timing_lock() {
    let script = Script::from_value(&read_json("script_two_character_dialogue.json")).expect("script");
    let default = adapt(&script).expect("adapt");
    let stamped = adapt_with(&script, "2026-01-01T12:00:00Z").expect("adapt");
    assert_eq!(default.created_at, "1970-01-01T00:00:00Z");
    assert_eq!(stamped.created_at, "2026-01-01T12:00:00Z");
    assert_eq!(default.timing_lock_hash, stamped.timing_lock_hash);
}

#[test]
fn beats_keep_narrative_order() {
    let shotlist = adapt_value(&read_json("script_multi_scene.json")).expect("adapt");
    let beats: Vec<&str> = shotlist.shots.iter().map(|s| s.action_beat.as_str()).collect();
    assert_eq!(
        beats,
        vec![
            "Establishing shot of Harbor.",
            "Fog rolls over the pier.",
            "char_marco enters.",
            "char_marco speaks.",
            "Reaction shot.",
            "char_lena speaks.",
            "Reaction shot.",
            "char_marco exits.",
            "Establishing shot of Market.",
            "Crowds surge between the stalls.",
        ]
    );
    let dialogue = &shotlist.shots[5];
    assert_eq!(dialogue.audio_intent.vo_speaker_id.as_deref(), Some("char_lena"));
    assert_eq!(dialogue.emotional_tag.as_deref(), Some("wry"));
    assert_eq!(shotlist.shots[9].audio_intent.music_mood, None);
}

#[test]
fn invalid_script_is_never_adapted() {
    let mut script = read_json("script_two_character_dialogue.json");
    script["scenes"] = json!([]);
    match adapt_value(&script) {
        Err(AdaptError::InvalidScript(err)) => assert!(err.to_string().starts_with("Script.v1")),
        other => panic!("expected invalid script, got {other:?}"),
    }
}
