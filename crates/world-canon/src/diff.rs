//! Canon diffs: proposed partial updates, and the apply pipeline.
//!
//! ```text
//! raw diff ── parse / structural check ── hard-contradiction check ── merge ──> new canon
//!                    │                              │
//!                    └──────── errors ──────────────┴──> caller's canon, untouched
//! ```
//!
//! Failure is always a value: `apply_canon_diff` never panics or returns
//! `Err`, and on any error the returned canon is the input allocation.

use crate::canon::{Canon, EntityRecord, HardField, is_valid_entity_id};
use crate::gate::check_hard_contradictions;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

pub const ADDED_FACTS: &str = "added_facts";
pub const MODIFIED_FACTS: &str = "modified_facts";
const CHARACTERS: &str = "characters";
const TOP_LEVEL_KEYS: [&str; 5] = [
    ADDED_FACTS,
    MODIFIED_FACTS,
    "episode_id",
    "justification",
    "provenance",
];

fn field_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("field key regex must compile"))
}

/// A diff rejection. `code()` is stable for machine consumers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiffError {
    #[error("INVALID_DIFF: {path}: {reason}")]
    InvalidDiff { path: String, reason: String },

    #[error(
        "CONTRADICTION: characters.{entity_id}.{field}: canon={canon_value} vs diff={diff_value}"
    )]
    Contradiction {
        entity_id: String,
        field: HardField,
        canon_value: Value,
        diff_value: Value,
    },
}

impl DiffError {
    pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDiff {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DiffError::InvalidDiff { .. } => "INVALID_DIFF",
            DiffError::Contradiction { .. } => "CONTRADICTION",
        }
    }
}

/// Result of `apply_canon_diff`: the canon to carry forward plus every error.
#[derive(Debug, Clone)]
pub struct DiffOutcome {
    pub canon: Canon,
    pub errors: Vec<DiffError>,
}

impl DiffOutcome {
    pub fn is_accepted(&self) -> bool {
        self.errors.is_empty()
    }

    fn rejected(canon: &Canon, errors: Vec<DiffError>) -> Self {
        tracing::warn!(
            errors = errors.len(),
            first = %errors.first().map(ToString::to_string).unwrap_or_default(),
            "canon diff rejected"
        );
        Self {
            canon: canon.clone(),
            errors,
        }
    }
}

/// A typed canon diff. Entity patches reuse `EntityRecord`: a `None` field is
/// "not touched by this diff".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonDiff {
    pub added: BTreeMap<String, EntityRecord>,
    pub modified: BTreeMap<String, EntityRecord>,
    pub episode_id: Option<String>,
    pub justification: Option<String>,
    pub provenance: Option<Value>,
}

impl CanonDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_added(mut self, entity_id: impl Into<String>, record: EntityRecord) -> Self {
        self.added.insert(entity_id.into(), record);
        self
    }

    pub fn with_modified(mut self, entity_id: impl Into<String>, patch: EntityRecord) -> Self {
        self.modified.insert(entity_id.into(), patch);
        self
    }

    pub fn with_episode(mut self, episode_id: impl Into<String>) -> Self {
        self.episode_id = Some(episode_id.into());
        self
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = Some(justification.into());
        self
    }

    /// Parse and structurally validate a raw diff document. Every problem is
    /// reported; none short-circuits the others.
    pub fn parse(value: &Value) -> Result<Self, Vec<DiffError>> {
        let Value::Object(root) = value else {
            return Err(vec![DiffError::invalid("$", "diff must be a JSON object")]);
        };

        let mut errors = Vec::new();
        for key in root.keys() {
            if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
                errors.push(DiffError::invalid(key.as_str(), "unknown top-level key"));
            }
        }

        let added = parse_facts(root, ADDED_FACTS, &mut errors);
        let modified = parse_facts(root, MODIFIED_FACTS, &mut errors);
        let episode_id = optional_string(root, "episode_id", &mut errors);
        let justification = optional_string(root, "justification", &mut errors);
        let provenance = match root.get("provenance") {
            None => None,
            Some(value @ Value::Object(_)) => Some(value.clone()),
            Some(_) => {
                errors.push(DiffError::invalid("provenance", "must be an object"));
                None
            }
        };

        if errors.is_empty() {
            Ok(Self {
                added,
                modified,
                episode_id,
                justification,
                provenance,
            })
        } else {
            Err(errors)
        }
    }

    /// Structural errors of an already-typed diff (ids, string emptiness,
    /// soft-field keys and nulls). `parse` output is always clean.
    pub fn structural_errors(&self) -> Vec<DiffError> {
        let mut errors = Vec::new();
        for (section, entities) in [(ADDED_FACTS, &self.added), (MODIFIED_FACTS, &self.modified)] {
            for (id, record) in entities {
                let base = format!("{section}.{CHARACTERS}.{id}");
                if !is_valid_entity_id(id) {
                    errors.push(DiffError::invalid(&base, "invalid entity id"));
                }
                for (field, text) in [
                    (HardField::Name, &record.name),
                    (HardField::Location, &record.location),
                ] {
                    if text.as_deref().is_some_and(|t| t.trim().is_empty()) {
                        errors.push(DiffError::invalid(
                            format!("{base}.{field}"),
                            "must be a non-empty string",
                        ));
                    }
                }
                for (key, value) in &record.extra {
                    if let Some(reason) = soft_field_problem(key, value) {
                        errors.push(DiffError::invalid(format!("{base}.{key}"), reason));
                    }
                }
            }
        }
        errors
    }

    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        for (section, entities) in [(ADDED_FACTS, &self.added), (MODIFIED_FACTS, &self.modified)] {
            if entities.is_empty() {
                continue;
            }
            let records: Map<String, Value> = entities
                .iter()
                .map(|(id, record)| (id.clone(), record.to_value()))
                .collect();
            let mut facts = Map::new();
            facts.insert(CHARACTERS.to_string(), Value::Object(records));
            root.insert(section.to_string(), Value::Object(facts));
        }
        if let Some(episode_id) = &self.episode_id {
            root.insert("episode_id".to_string(), Value::String(episode_id.clone()));
        }
        if let Some(justification) = &self.justification {
            root.insert(
                "justification".to_string(),
                Value::String(justification.clone()),
            );
        }
        if let Some(provenance) = &self.provenance {
            root.insert("provenance".to_string(), provenance.clone());
        }
        Value::Object(root)
    }
}

fn optional_string(root: &Map<String, Value>, key: &str, errors: &mut Vec<DiffError>) -> Option<String> {
    match root.get(key) {
        None => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            errors.push(DiffError::invalid(key, "must be a string"));
            None
        }
    }
}

fn parse_facts(
    root: &Map<String, Value>,
    section: &str,
    errors: &mut Vec<DiffError>,
) -> BTreeMap<String, EntityRecord> {
    let mut parsed = BTreeMap::new();
    let Some(raw) = root.get(section) else {
        return parsed;
    };
    let Value::Object(sections) = raw else {
        errors.push(DiffError::invalid(section, "must be an object"));
        return parsed;
    };
    for (name, entities) in sections {
        let path = format!("{section}.{name}");
        if name != CHARACTERS {
            errors.push(DiffError::invalid(path, "unknown section"));
            continue;
        }
        let Value::Object(entities) = entities else {
            errors.push(DiffError::invalid(path, "must be an object"));
            continue;
        };
        for (id, fields) in entities {
            let entity_path = format!("{path}.{id}");
            if !is_valid_entity_id(id) {
                errors.push(DiffError::invalid(&entity_path, "invalid entity id"));
                continue;
            }
            let Value::Object(fields) = fields else {
                errors.push(DiffError::invalid(&entity_path, "must be an object"));
                continue;
            };
            if let Some(record) = parse_record(&entity_path, fields, errors) {
                parsed.insert(id.clone(), record);
            }
        }
    }
    parsed
}

fn parse_record(
    path: &str,
    fields: &Map<String, Value>,
    errors: &mut Vec<DiffError>,
) -> Option<EntityRecord> {
    let before = errors.len();
    let mut record = EntityRecord::new();
    for (key, value) in fields {
        let field_path = format!("{path}.{key}");
        match HardField::from_key(key) {
            Some(HardField::Name) | Some(HardField::Location) => match value.as_str() {
                Some(text) if !text.trim().is_empty() => {
                    if key == "name" {
                        record.name = Some(text.to_string());
                    } else {
                        record.location = Some(text.to_string());
                    }
                }
                _ => errors.push(DiffError::invalid(field_path, "must be a non-empty string")),
            },
            Some(HardField::Age) => match value.as_u64() {
                Some(age) => record.age = Some(age),
                None => errors.push(DiffError::invalid(field_path, "must be a non-negative integer")),
            },
            Some(HardField::Alive) => match value.as_bool() {
                Some(alive) => record.alive = Some(alive),
                None => errors.push(DiffError::invalid(field_path, "must be a boolean")),
            },
            None => match soft_field_problem(key, value) {
                Some(reason) => errors.push(DiffError::invalid(field_path, reason)),
                None => {
                    record.extra.insert(key.clone(), value.clone());
                }
            },
        }
    }
    (errors.len() == before).then_some(record)
}

fn soft_field_problem(key: &str, value: &Value) -> Option<&'static str> {
    if !field_key_re().is_match(key) {
        Some("field key must be snake_case")
    } else if value.is_null() {
        Some("null values are not allowed")
    } else {
        None
    }
}

/// Apply a raw diff document to `canon`.
///
/// Structural validation, then the hard-contradiction check, then a pure
/// merge. Any error returns `canon` itself (`ptr_eq`) with the full list.
pub fn apply_canon_diff(canon: &Canon, diff: &Value) -> DiffOutcome {
    match CanonDiff::parse(diff) {
        Ok(parsed) => apply_diff(canon, &parsed),
        Err(errors) => DiffOutcome::rejected(canon, errors),
    }
}

/// Apply an already-typed diff. Same guarantees as `apply_canon_diff`.
pub fn apply_diff(canon: &Canon, diff: &CanonDiff) -> DiffOutcome {
    let errors = diff.structural_errors();
    if !errors.is_empty() {
        return DiffOutcome::rejected(canon, errors);
    }
    let errors = check_hard_contradictions(canon, diff);
    if !errors.is_empty() {
        return DiffOutcome::rejected(canon, errors);
    }

    let merged = merge(canon, diff);
    tracing::debug!(
        added = diff.added.len(),
        modified = diff.modified.len(),
        entities = merged.len(),
        "canon diff applied"
    );
    DiffOutcome {
        canon: merged,
        errors: Vec::new(),
    }
}

fn merge(canon: &Canon, diff: &CanonDiff) -> Canon {
    // Cloning the map clones Arcs only; untouched records stay shared.
    let mut characters = canon.characters_map().clone();
    for (id, record) in &diff.added {
        characters.insert(id.clone(), Arc::new(record.clone()));
    }
    for (id, patch) in &diff.modified {
        let mut record = characters
            .get(id)
            .map(|existing| EntityRecord::clone(existing))
            .unwrap_or_default();
        record.overlay(patch);
        characters.insert(id.clone(), Arc::new(record));
    }
    Canon::from_characters(characters)
}
