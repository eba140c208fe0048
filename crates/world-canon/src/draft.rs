//! Story-draft gate: checks an incoming Script against canon before
//! adaptation and reports every contradiction.

use crate::canon::{Canon, EntityRecord, HardField};
use crate::diff::DiffError;
use crate::gate::contradictions;
use serde_json::Value;
use std::collections::BTreeSet;
use world_contracts::{
    CanonViolation, CanonViolationReport, ContractError, RosterEntry, Script, ViolationKind,
};

/// Gate result. Only a failing gate carries a report.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftGateOutcome {
    Consistent,
    Violations(CanonViolationReport),
}

impl DraftGateOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, DraftGateOutcome::Consistent)
    }

    pub fn report(&self) -> Option<&CanonViolationReport> {
        match self {
            DraftGateOutcome::Consistent => None,
            DraftGateOutcome::Violations(report) => Some(report),
        }
    }
}

/// Validate a raw draft against `Script.v1`, then against canon.
///
/// A malformed draft fails with `ContractError` and never reaches canon.
pub fn validate_draft_value(draft: &Value, canon: &Canon) -> Result<DraftGateOutcome, ContractError> {
    let script = Script::from_value(draft)?;
    validate_draft(&script, canon)
}

/// Check every character the draft references against canon.
///
/// Appearing in the draft implies `alive = true`; explicit roster facts are
/// compared field by field. A roster `alive` only stands for characters that
/// never appear in a scene. Characters canon does not know are not
/// violations.
pub fn validate_draft(script: &Script, canon: &Canon) -> Result<DraftGateOutcome, ContractError> {
    let on_screen = on_screen_characters(script);
    let mut violations = Vec::new();
    for id in script.referenced_characters() {
        let Some(known) = canon.entity(&id) else {
            continue;
        };
        let implied = implied_facts(script.roster_entry(&id), on_screen.contains(id.as_str()));
        for error in contradictions(&id, known, &implied) {
            if let Some(violation) = to_violation(error) {
                violations.push(violation);
            }
        }
    }

    if violations.is_empty() {
        tracing::debug!(script_id = %script.script_id, "story draft consistent with canon");
        return Ok(DraftGateOutcome::Consistent);
    }

    tracing::info!(
        script_id = %script.script_id,
        violations = violations.len(),
        "story draft contradicts canon"
    );
    let report = CanonViolationReport::new(
        script.project_id.clone(),
        script.script_id.clone(),
        script.episode_id.clone(),
        violations,
    )?;
    Ok(DraftGateOutcome::Violations(report))
}

/// Scene casts plus every character a beat names.
fn on_screen_characters(script: &Script) -> BTreeSet<&str> {
    script
        .scenes
        .iter()
        .flat_map(|scene| {
            scene
                .characters
                .iter()
                .map(String::as_str)
                .chain(scene.beats.iter().flat_map(|beat| beat.referenced_characters()))
        })
        .collect()
}

fn implied_facts(entry: Option<&RosterEntry>, on_screen: bool) -> EntityRecord {
    let mut facts = EntityRecord::new().with_alive(true);
    if let Some(entry) = entry {
        facts.overlay(&EntityRecord {
            name: entry.name.clone(),
            age: entry.age,
            alive: if on_screen { None } else { entry.alive },
            location: entry.location.clone(),
            extra: Default::default(),
        });
    }
    facts
}

fn to_violation(error: DiffError) -> Option<CanonViolation> {
    let message = error.to_string();
    let DiffError::Contradiction {
        entity_id,
        field,
        canon_value,
        diff_value,
    } = error
    else {
        return None;
    };
    let kind = if field == HardField::Alive
        && canon_value == Value::Bool(false)
        && diff_value == Value::Bool(true)
    {
        ViolationKind::DeadCharacterAppears
    } else {
        ViolationKind::FactMismatch
    };
    Some(CanonViolation {
        entity_id,
        field: field.as_str().to_string(),
        canon_value,
        draft_value: diff_value,
        kind,
        message,
    })
}
