//! CanonGate: allow/deny decisions over a ShotList.
//!
//! Each text field of each shot is classified by the first rule it trips:
//!
//! | priority | signal              | reason                                   |
//! |----------|---------------------|------------------------------------------|
//! | 1        | `APPEARS:<dead id>` | `CANON_CONTRADICTION`                    |
//! | 2        | policy token        | `FORBIDDEN_TOKEN`                        |
//! | 3        | word `FORBIDDEN`    | one verbose reason per offending text    |
//!
//! The decision reports only the highest-priority class seen anywhere in the
//! ShotList. Rule 1 needs a canon snapshot and is skipped without one.

use crate::canon::Canon;
use crate::error::DecisionError;
use crate::policy::DecisionPolicy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use world_contracts::{ContractError, Shot, ShotList, canonical_json_pretty};

pub const CANON_CONTRADICTION: &str = "CANON_CONTRADICTION";
pub const FORBIDDEN_TOKEN: &str = "FORBIDDEN_TOKEN";
pub const DECISION_SCHEMA_ID: &str = "CanonDecision";
pub const DECISION_SCHEMA_VERSION: &str = "0.0.1";

const REASON_TEXT_MAX: usize = 200;

fn appears_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"APPEARS:([A-Za-z0-9_-]+)").expect("appears marker regex must compile")
    })
}

fn forbidden_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bFORBIDDEN\b").expect("forbidden word regex must compile"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    pub repo: String,
    pub component: String,
}

impl Default for Producer {
    fn default() -> Self {
        Self {
            repo: "world-engine".to_string(),
            component: "CanonGate".to_string(),
        }
    }
}

/// Decision artifact. Built fresh per evaluation and never persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonDecision {
    pub schema_id: String,
    pub schema_version: String,
    pub producer: Producer,
    pub shotlist_id: String,
    pub timing_lock_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canon_digest: Option<String>,
    pub decision: Verdict,
    pub reasons: Vec<String>,
}

impl CanonDecision {
    pub fn is_allowed(&self) -> bool {
        self.decision == Verdict::Allow
    }

    pub fn to_canonical_json(&self) -> Result<String, ContractError> {
        canonical_json_pretty(self)
    }
}

/// One rule hit inside one text field of a shot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShotSignal {
    CanonContradiction { shot_id: String, character_id: String },
    ForbiddenToken { shot_id: String, token: String },
    ForbiddenWord { shot_id: String, text: String },
}

impl ShotSignal {
    /// Lower is stronger.
    pub fn priority(&self) -> u8 {
        match self {
            ShotSignal::CanonContradiction { .. } => 1,
            ShotSignal::ForbiddenToken { .. } => 2,
            ShotSignal::ForbiddenWord { .. } => 3,
        }
    }

    pub fn reason(&self) -> String {
        match self {
            ShotSignal::CanonContradiction { .. } => CANON_CONTRADICTION.to_string(),
            ShotSignal::ForbiddenToken { .. } => FORBIDDEN_TOKEN.to_string(),
            ShotSignal::ForbiddenWord { shot_id, text } => {
                let snippet: String = text.chars().take(REASON_TEXT_MAX).collect();
                format!("shot '{shot_id}' contains FORBIDDEN token: '{snippet}'")
            }
        }
    }
}

/// Classify every text field of `shot`; at most one signal per field.
pub fn scan_shot(shot: &Shot, canon: Option<&Canon>, policy: &DecisionPolicy) -> Vec<ShotSignal> {
    shot.text_fields()
        .into_iter()
        .filter_map(|text| classify_text(&shot.shot_id, text, canon, policy))
        .collect()
}

fn classify_text(
    shot_id: &str,
    text: &str,
    canon: Option<&Canon>,
    policy: &DecisionPolicy,
) -> Option<ShotSignal> {
    if let Some(canon) = canon {
        let dead = appears_re()
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .find(|id| canon.is_dead(id));
        if let Some(character_id) = dead {
            return Some(ShotSignal::CanonContradiction {
                shot_id: shot_id.to_string(),
                character_id: character_id.to_string(),
            });
        }
    }
    if let Some(token) = policy.matching_token(text) {
        return Some(ShotSignal::ForbiddenToken {
            shot_id: shot_id.to_string(),
            token: token.to_string(),
        });
    }
    forbidden_word_re()
        .is_match(text)
        .then(|| ShotSignal::ForbiddenWord {
            shot_id: shot_id.to_string(),
            text: text.to_string(),
        })
}

/// Evaluate `shotlist` against the optional canon snapshot and the policy.
pub fn evaluate_shotlist(
    shotlist: &ShotList,
    canon: Option<&Canon>,
    policy: &DecisionPolicy,
) -> Result<CanonDecision, DecisionError> {
    if shotlist.timing_lock_hash.is_empty() {
        return Err(DecisionError::MissingTimingLock);
    }
    if shotlist.schema_id.is_empty() || shotlist.schema_version.is_empty() {
        return Err(DecisionError::MissingSchemaMetadata);
    }

    let signals: Vec<ShotSignal> = shotlist
        .shots
        .iter()
        .flat_map(|shot| scan_shot(shot, canon, policy))
        .collect();
    let strongest = signals.iter().map(ShotSignal::priority).min();
    let reasons: Vec<String> = match strongest {
        None => Vec::new(),
        Some(3) => signals.iter().map(ShotSignal::reason).collect(),
        Some(priority) => signals
            .iter()
            .find(|signal| signal.priority() == priority)
            .map(ShotSignal::reason)
            .into_iter()
            .collect(),
    };

    let decision = if reasons.is_empty() {
        Verdict::Allow
    } else {
        Verdict::Deny
    };
    let canon_digest = canon.map(Canon::digest).transpose()?;
    tracing::debug!(
        shotlist_id = %shotlist.shotlist_id,
        shots = shotlist.shots.len(),
        signals = signals.len(),
        ?decision,
        "canon gate evaluated"
    );

    Ok(CanonDecision {
        schema_id: DECISION_SCHEMA_ID.to_string(),
        schema_version: DECISION_SCHEMA_VERSION.to_string(),
        producer: Producer::default(),
        shotlist_id: shotlist.shotlist_id.clone(),
        timing_lock_hash: shotlist.timing_lock_hash.clone(),
        canon_digest,
        decision,
        reasons,
    })
}

/// Like `evaluate_shotlist`, but a deny is an error.
pub fn assert_shotlist_canon(
    shotlist: &ShotList,
    canon: Option<&Canon>,
    policy: &DecisionPolicy,
) -> Result<CanonDecision, DecisionError> {
    let decision = evaluate_shotlist(shotlist, canon, policy)?;
    if decision.is_allowed() {
        Ok(decision)
    } else {
        Err(DecisionError::Denied {
            decision: Box::new(decision),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use world_contracts::{AudioIntent, CameraFraming, CameraMovement, SHOTLIST_SCHEMA_ID};

    fn shot(id: &str, action_beat: &str) -> Shot {
        Shot {
            shot_id: id.to_string(),
            scene_id: "s001".to_string(),
            duration_sec: 2.0,
            camera_framing: CameraFraming::Wide,
            camera_movement: CameraMovement::Static,
            characters: Vec::new(),
            environment_notes: "Hall, DAY".to_string(),
            action_beat: action_beat.to_string(),
            audio_intent: AudioIntent::default(),
            emotional_tag: None,
            shot_template_id: None,
        }
    }

    fn shotlist(shots: Vec<Shot>) -> ShotList {
        ShotList {
            schema_id: SHOTLIST_SCHEMA_ID.to_string(),
            schema_version: "1.0.0".to_string(),
            shotlist_id: "sl_test".to_string(),
            script_id: "s001".to_string(),
            episode_id: None,
            shots,
            total_duration_sec: 2.0,
            timing_lock_hash: "a".repeat(64),
            created_at: "1970-01-01T00:00:00Z".to_string(),
            metadata: Default::default(),
        }
    }

    fn dead_alex() -> Canon {
        Canon::from_value(&json!({"characters": {"alex": {"alive": false}, "mira": {"alive": true}}}))
            .expect("canon")
    }

    #[test]
    fn clean_shotlist_is_allowed() {
        let decision = evaluate_shotlist(
            &shotlist(vec![shot("a", "Mira opens the door.")]),
            None,
            &DecisionPolicy::default(),
        )
        .expect("evaluate");
        assert!(decision.is_allowed());
        assert!(decision.reasons.is_empty());
        assert_eq!(decision.canon_digest, None);
    }

    #[test]
    fn forbidden_word_gives_verbose_reason_per_text() {
        let mut second = shot("b", "fine");
        second.audio_intent.vo_text = Some("FORBIDDEN content here".to_string());
        let decision = evaluate_shotlist(
            &shotlist(vec![shot("a", "Character does FORBIDDEN action"), second]),
            None,
            &DecisionPolicy::default(),
        )
        .expect("evaluate");
        assert_eq!(decision.decision, Verdict::Deny);
        assert_eq!(
            decision.reasons,
            vec![
                "shot 'a' contains FORBIDDEN token: 'Character does FORBIDDEN action'".to_string(),
                "shot 'b' contains FORBIDDEN token: 'FORBIDDEN content here'".to_string(),
            ]
        );
    }

    #[test]
    fn forbidden_word_needs_word_boundaries() {
        let decision = evaluate_shotlist(
            &shotlist(vec![shot("a", "this is NOT_FORBIDDEN content"), shot("b", "FORBIDDENS")]),
            None,
            &DecisionPolicy::default(),
        )
        .expect("evaluate");
        assert!(decision.is_allowed());
    }

    #[test]
    fn verbose_reason_truncates_long_text() {
        let text = format!("FORBIDDEN {}", "x".repeat(400));
        let decision =
            evaluate_shotlist(&shotlist(vec![shot("a", &text)]), None, &DecisionPolicy::default())
                .expect("evaluate");
        let expected = format!("shot 'a' contains FORBIDDEN token: '{}'", &text[..200]);
        assert_eq!(decision.reasons, vec![expected]);
    }

    #[test]
    fn policy_token_suppresses_forbidden_word() {
        let decision = evaluate_shotlist(
            &shotlist(vec![shot("a", "FORBIDDEN move"), shot("b", "Mage performs __FORBIDDEN__ ritual")]),
            None,
            &DecisionPolicy::default(),
        )
        .expect("evaluate");
        assert_eq!(decision.reasons, vec![FORBIDDEN_TOKEN.to_string()]);
    }

    #[test]
    fn dead_character_outranks_everything() {
        let canon = dead_alex();
        let decision = evaluate_shotlist(
            &shotlist(vec![
                shot("a", "FORBIDDEN move"),
                shot("b", "APPEARS:alex __FORBIDDEN__"),
            ]),
            Some(&canon),
            &DecisionPolicy::default(),
        )
        .expect("evaluate");
        assert_eq!(decision.decision, Verdict::Deny);
        assert_eq!(decision.reasons, vec![CANON_CONTRADICTION.to_string()]);
        assert_eq!(decision.canon_digest, Some(canon.digest().expect("digest")));
    }

    #[test]
    fn appearance_of_living_or_unknown_character_is_fine() {
        let canon = dead_alex();
        let decision = evaluate_shotlist(
            &shotlist(vec![shot("a", "APPEARS:mira walks in"), shot("b", "APPEARS:zed waves")]),
            Some(&canon),
            &DecisionPolicy::default(),
        )
        .expect("evaluate");
        assert!(decision.is_allowed());
    }

    #[test]
    fn without_canon_the_appearance_rule_is_skipped() {
        let decision = evaluate_shotlist(
            &shotlist(vec![shot("a", "APPEARS:alex walks in")]),
            None,
            &DecisionPolicy::default(),
        )
        .expect("evaluate");
        assert!(decision.is_allowed());
    }

    #[test]
    fn custom_policy_tokens_apply() {
        let policy = DecisionPolicy::from_tokens(["[[BLOCK]]"]);
        let decision = evaluate_shotlist(
            &shotlist(vec![shot("a", "cut to [[BLOCK]]"), shot("b", "__FORBIDDEN__")]),
            None,
            &policy,
        )
        .expect("evaluate");
        assert_eq!(decision.reasons, vec![FORBIDDEN_TOKEN.to_string()]);
        let signals = scan_shot(&shot("b", "__FORBIDDEN__"), None, &policy);
        assert!(signals.is_empty());
    }

    #[test]
    fn missing_metadata_is_rejected_before_scanning() {
        let mut list = shotlist(vec![shot("a", "FORBIDDEN")]);
        list.timing_lock_hash.clear();
        assert!(matches!(
            evaluate_shotlist(&list, None, &DecisionPolicy::default()),
            Err(DecisionError::MissingTimingLock)
        ));

        let mut list = shotlist(vec![shot("a", "fine")]);
        list.schema_version.clear();
        assert!(matches!(
            evaluate_shotlist(&list, None, &DecisionPolicy::default()),
            Err(DecisionError::MissingSchemaMetadata)
        ));
    }

    #[test]
    fn assert_turns_deny_into_error() {
        let err = assert_shotlist_canon(
            &shotlist(vec![shot("a", "__FORBIDDEN__")]),
            None,
            &DecisionPolicy::default(),
        )
        .expect_err("deny must be an error");
        assert_eq!(err.to_string(), "CanonGate denied: FORBIDDEN_TOKEN");
    }

    #[test]
    fn deny_artifact_is_canonical() {
        let decision = evaluate_shotlist(
            &shotlist(vec![shot("a", "__FORBIDDEN__")]),
            None,
            &DecisionPolicy::default(),
        )
        .expect("evaluate");
        let rendered = decision.to_canonical_json().expect("serialize");
        insta::assert_snapshot!(rendered.trim_end(), @r#"
        {
          "decision": "deny",
          "producer": {
            "component": "CanonGate",
            "repo": "world-engine"
          },
          "reasons": [
            "FORBIDDEN_TOKEN"
          ],
          "schema_id": "CanonDecision",
          "schema_version": "0.0.1",
          "shotlist_id": "sl_test",
          "timing_lock_hash": "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        }
        "#);
    }
}
