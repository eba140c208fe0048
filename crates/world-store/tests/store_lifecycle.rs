//! Integration tests: a project's canon across several episodes.

use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use world_canon::{Canon, apply_canon_diff, validate_draft_value};
use world_store::{CommitOutcome, ProjectCanonStore, StoreError};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "world-store-it-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn episodes() -> Vec<(&'static str, u64, Value)> {
    vec![
        (
            "ep001",
            1,
            json!({
                "added_facts": {"characters": {
                    "alice": {"name": "Alice", "age": 30, "alive": true},
                    "bob": {"name": "Bob"}
                }},
                "episode_id": "ep001"
            }),
        ),
        (
            "ep002",
            2,
            json!({
                "modified_facts": {"characters": {"alice": {"location": "Harbor"}}},
                "justification": "Alice moves to the harbor."
            }),
        ),
        (
            "ep004",
            4,
            json!({
                "modified_facts": {"characters": {"bob": {"alive": false}}},
                "provenance": {"writer": "room-b"}
            }),
        ),
    ]
}

#[test]
fn replay_matches_every_live_snapshot() {
    let dir = TempDirGuard::new("replay");
    let store = ProjectCanonStore::new(&dir.path);

    let mut live_snapshots = Vec::new();
    for (episode_id, seq, diff) in episodes() {
        match store.commit("proj1", &diff, episode_id, seq).expect("commit") {
            CommitOutcome::Committed { canon, entry } => {
                assert_eq!(entry.sequence_number, seq);
                assert_eq!(entry.resulting_snapshot_sha256, canon.digest().expect("digest"));
            }
            CommitOutcome::Rejected(errors) => panic!("{episode_id} rejected: {errors:?}"),
        }
        live_snapshots.push((
            episode_id,
            fs::read_to_string(store.snapshot_path("proj1")).expect("snapshot"),
        ));
    }

    for (episode_id, snapshot) in &live_snapshots {
        let replayed = store.replay("proj1", episode_id).expect("replay");
        assert_eq!(&replayed.to_canonical_json().expect("serialize"), snapshot);
    }

    let history = store.history("proj1").expect("history");
    let files: Vec<&str> = history.iter().map(|r| r.entry_file.as_str()).collect();
    assert_eq!(
        files,
        vec![
            "0001_ep001.diff.json",
            "0002_ep002.diff.json",
            "0004_ep004.diff.json"
        ]
    );
    assert!(store.load("proj1").expect("load").is_dead("bob"));
}

#[test]
fn saving_the_same_canon_twice_is_byte_identical() {
    let dir = TempDirGuard::new("idempotent");
    let store = ProjectCanonStore::new(&dir.path);
    let diff = json!({"added_facts": {"characters": {"zed": {"name": "Zed", "mood": "calm"}}}});
    let canon = apply_canon_diff(&Canon::empty(), &diff).canon;

    store.save("a", &canon, &diff, "ep001", 1).expect("save a");
    store.save("b", &canon, &diff, "ep001", 1).expect("save b");
    let first = fs::read(store.snapshot_path("a")).expect("snapshot a");
    let second = fs::read(store.snapshot_path("b")).expect("snapshot b");
    assert_eq!(first, second);

    store.save("a", &canon, &json!({}), "ep002", 2).expect("resave");
    assert_eq!(fs::read(store.snapshot_path("a")).expect("snapshot a"), first);
    assert_eq!(
        String::from_utf8(first).expect("utf8"),
        "{\n  \"characters\": {\n    \"zed\": {\n      \"mood\": \"calm\",\n      \"name\": \"Zed\"\n    }\n  }\n}\n"
    );
}

#[test]
fn concurrent_projects_do_not_share_numbering() {
    let dir = TempDirGuard::new("projects");
    let store = ProjectCanonStore::new(&dir.path);
    let diff = json!({"added_facts": {"characters": {"alice": {"name": "Alice"}}}});

    store.commit("north", &diff, "ep010", 10).expect("north");
    store.commit("south", &diff, "ep001", 1).expect("south");
    assert!(matches!(
        store.commit("north", &json!({}), "ep002", 2),
        Err(StoreError::SequenceConflict { latest: 10, .. })
    ));
}

#[test]
fn violation_reports_are_kept_per_episode() {
    let dir = TempDirGuard::new("violations");
    let store = ProjectCanonStore::new(&dir.path);
    store
        .commit(
            "proj1",
            &json!({"added_facts": {"characters": {"alice": {"alive": false}}}}),
            "ep001",
            1,
        )
        .expect("commit");
    let canon = store.load("proj1").expect("load");

    let mut paths = Vec::new();
    for episode_id in ["ep002", "ep003"] {
        let draft = json!({
            "schema_id": "Script",
            "schema_version": "1.0.0",
            "script_id": format!("script_{episode_id}"),
            "title": "Ghost",
            "characters": [{"id": "alice"}],
            "scenes": [{"scene_id": "sc1", "location": "Crypt", "time_of_day": "NIGHT"}]
        });
        let outcome = validate_draft_value(&draft, &canon).expect("gate");
        let report = outcome.report().expect("dead alice must be reported");
        paths.push(
            store
                .save_violation_report("proj1", episode_id, report)
                .expect("save report"),
        );
    }

    assert_ne!(paths[0], paths[1]);
    for path in &paths {
        let value: Value =
            serde_json::from_str(&fs::read_to_string(path).expect("report")).expect("json");
        assert_eq!(value["violations"][0]["entity_id"], json!("alice"));
        assert_eq!(value["violations"][0]["field"], json!("alive"));
    }
    assert!(paths[0].ends_with("violations/ep002_CanonViolationReport.json"));
}
