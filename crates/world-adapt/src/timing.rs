//! Duration estimates and the timing lock.
//!
//! Only `shot_id` and `duration_sec` feed the timing lock hash, so creative
//! fields (camera, audio, emotion) can be revised without breaking it.

use crate::templates::ShotTemplate;
use serde_json::{Value, json};
use world_contracts::{Shot, sha256_hex, stable_hash};

/// Words per second of spoken dialogue (about 150 wpm).
const SPEECH_RATE_WPS: f64 = 2.5;
/// Hold after the last spoken word.
const DIALOGUE_BUFFER_SEC: f64 = 0.5;

/// Round half away from zero to 3 decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// `clamp(words / 2.5 + 0.5, min, max)` for spoken lines, else the template
/// base duration.
pub fn estimate_duration(template: &ShotTemplate, spoken: Option<&str>) -> f64 {
    let duration = match spoken {
        Some(text) => {
            let words = text.split_whitespace().count() as f64;
            let raw = words / SPEECH_RATE_WPS + DIALOGUE_BUFFER_SEC;
            raw.clamp(template.duration_min_sec, template.duration_max_sec)
        }
        None => template.base_duration_sec,
    };
    round3(duration)
}

/// SHA-256 over compact sorted-key JSON of `[{duration_sec, shot_id}, ...]`.
pub fn timing_lock_hash(shots: &[Shot]) -> String {
    let timing: Vec<Value> = shots
        .iter()
        .map(|shot| json!({"shot_id": shot.shot_id, "duration_sec": round3(shot.duration_sec)}))
        .collect();
    stable_hash(&Value::Array(timing))
}

/// `sl_` + first 16 hex chars of SHA-256(script_id).
pub fn shotlist_id(script_id: &str) -> String {
    let digest = sha256_hex(script_id.as_bytes());
    format!("sl_{}", &digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::ShotKind;

    #[test]
    fn dialogue_duration_follows_word_count_and_clamps() {
        let tpl = ShotKind::Dialogue.template();
        assert_eq!(estimate_duration(tpl, Some("One two three four")), 2.1);
        assert_eq!(estimate_duration(tpl, Some("Hi")), 2.0);
        let long = "word ".repeat(40);
        assert_eq!(estimate_duration(tpl, Some(&long)), 8.0);
        assert_eq!(estimate_duration(tpl, None), 3.0);
    }

    #[test]
    fn round3_is_stable() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round3(2.0), 2.0);
        assert_eq!(round3(0.1 + 0.2), 0.3);
    }

    #[test]
    fn shotlist_id_is_prefixed_digest() {
        let id = shotlist_id("script_001");
        assert_eq!(id.len(), 19);
        assert!(id.starts_with("sl_"));
        assert_eq!(id, shotlist_id("script_001"));
        assert_ne!(id, shotlist_id("script_002"));
    }
}
