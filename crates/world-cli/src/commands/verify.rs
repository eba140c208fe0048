//! Bundled golden-vector self-check.
//!
//! Every vector runs twice. The check passes only when both runs are
//! byte-identical and match the bundled expectations.

use serde_json::{Value, json};
use world_adapt::adapt_value;
use world_canon::{DecisionPolicy, evaluate_shotlist};
use world_contracts::{SchemaId, ShotList, canonical_json_pretty, validate};

struct ScriptVector {
    name: &'static str,
    script: &'static str,
    expect: &'static str,
}

struct DecisionVector {
    name: &'static str,
    shotlist: &'static str,
    golden: &'static str,
}

const SCRIPT_VECTORS: [ScriptVector; 3] = [
    ScriptVector {
        name: "script_empty_scene",
        script: include_str!("../../vectors/script_empty_scene.json"),
        expect: include_str!("../../vectors/script_empty_scene.expect.json"),
    },
    ScriptVector {
        name: "script_two_character_dialogue",
        script: include_str!("../../vectors/script_two_character_dialogue.json"),
        expect: include_str!("../../vectors/script_two_character_dialogue.expect.json"),
    },
    ScriptVector {
        name: "script_multi_scene",
        script: include_str!("../../vectors/script_multi_scene.json"),
        expect: include_str!("../../vectors/script_multi_scene.expect.json"),
    },
];

const DECISION_VECTORS: [DecisionVector; 2] = [
    DecisionVector {
        name: "decision_allow",
        shotlist: include_str!("../../vectors/shotlist_allow.json"),
        golden: include_str!("../../vectors/decision_allow.golden.json"),
    },
    DecisionVector {
        name: "decision_deny",
        shotlist: include_str!("../../vectors/shotlist_deny.json"),
        golden: include_str!("../../vectors/decision_deny.golden.json"),
    },
];

pub fn run() {
    let mut failures = Vec::new();
    for vector in &SCRIPT_VECTORS {
        if let Err(reason) = check_script_vector(vector) {
            failures.push(format!("{}: {reason}", vector.name));
        }
    }
    for vector in &DECISION_VECTORS {
        if let Err(reason) = check_decision_vector(vector) {
            failures.push(format!("{}: {reason}", vector.name));
        }
    }

    if failures.is_empty() {
        println!("OK: world-engine verified");
        return;
    }
    for failure in &failures {
        println!("  FAIL {failure}");
    }
    println!("ERROR: world-engine verification failed");
    std::process::exit(1);
}

fn parse(label: &str, text: &str) -> Result<Value, String> {
    serde_json::from_str(text).map_err(|e| format!("bundled {label} is not JSON: {e}"))
}

fn adapt_once(script: &Value) -> Result<(ShotList, String), String> {
    let shotlist = adapt_value(script).map_err(|e| e.to_string())?;
    let rendered = canonical_json_pretty(&shotlist).map_err(|e| e.to_string())?;
    Ok((shotlist, rendered))
}

fn check_script_vector(vector: &ScriptVector) -> Result<(), String> {
    let script = parse("script", vector.script)?;
    let expect = parse("expectation", vector.expect)?;

    let (shotlist, first) = adapt_once(&script)?;
    let (_, second) = adapt_once(&script)?;
    if first != second {
        return Err("adaptation is not byte-identical across runs".to_string());
    }

    let document = shotlist.to_value().map_err(|e| e.to_string())?;
    validate(&document, SchemaId::ShotListV1)
        .into_result()
        .map_err(|e| e.to_string())?;

    let shot_ids: Vec<&str> = shotlist.shots.iter().map(|s| s.shot_id.as_str()).collect();
    let durations: Vec<f64> = shotlist.shots.iter().map(|s| s.duration_sec).collect();
    let observed = [
        ("shot_ids", json!(shot_ids)),
        ("durations", json!(durations)),
        ("total_duration_sec", json!(shotlist.total_duration_sec)),
        ("timing_lock_hash", json!(shotlist.timing_lock_hash)),
        ("shotlist_id", json!(shotlist.shotlist_id)),
    ];
    for (key, actual) in observed {
        if expect[key] != actual {
            return Err(format!("{key} mismatch: expected {} got {actual}", expect[key]));
        }
    }
    Ok(())
}

fn decide_once(shotlist: &Value) -> Result<String, String> {
    let shotlist = ShotList::from_value(shotlist).map_err(|e| e.to_string())?;
    let decision = evaluate_shotlist(&shotlist, None, &DecisionPolicy::default())
        .map_err(|e| e.to_string())?;
    decision.to_canonical_json().map_err(|e| e.to_string())
}

fn check_decision_vector(vector: &DecisionVector) -> Result<(), String> {
    let shotlist = parse("shotlist", vector.shotlist)?;
    let first = decide_once(&shotlist)?;
    let second = decide_once(&shotlist)?;
    if first != second {
        return Err("decision is not byte-identical across runs".to_string());
    }
    if first != vector.golden {
        return Err("decision differs from bundled golden".to_string());
    }
    Ok(())
}
