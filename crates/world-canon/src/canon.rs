//! Canon model: an immutable, structurally shared map of entity records.
//!
//! A `Canon` is never mutated in place. Applying a diff builds a new value;
//! entity records untouched by the diff are shared (`Arc`) with the previous
//! canon, and a rejected diff hands back the caller's canon unchanged.

use crate::error::CanonError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use world_contracts::{canonical_json_pretty, sha256_hex};

/// Entity ids: ASCII letters, digits, `_` and `-`.
pub fn is_valid_entity_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Fields protected from silent overwrite once canon knows a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HardField {
    Name,
    Age,
    Alive,
    Location,
}

impl HardField {
    pub const ALL: [HardField; 4] = [
        HardField::Name,
        HardField::Age,
        HardField::Alive,
        HardField::Location,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HardField::Name => "name",
            HardField::Age => "age",
            HardField::Alive => "alive",
            HardField::Location => "location",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == key)
    }

    /// The JSON value `record` holds for this field, if known.
    pub fn value_of(self, record: &EntityRecord) -> Option<Value> {
        match self {
            HardField::Name => record.name.clone().map(Value::String),
            HardField::Age => record.age.map(Value::from),
            HardField::Alive => record.alive.map(Value::Bool),
            HardField::Location => record.location.clone().map(Value::String),
        }
    }
}

impl fmt::Display for HardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known facts about one entity. Every field is optional so the same shape
/// serves as a full canon record and as a partial diff patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Open-ended soft fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl EntityRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_age(mut self, age: u64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_alive(mut self, alive: bool) -> Self {
        self.alive = Some(alive);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Value of any field, hard or soft.
    pub fn get(&self, key: &str) -> Option<Value> {
        match HardField::from_key(key) {
            Some(field) => field.value_of(self),
            None => self.extra.get(key).cloned(),
        }
    }

    /// Keys this record carries a value for, hard fields first.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = HardField::ALL
            .into_iter()
            .filter(|field| field.value_of(self).is_some())
            .map(HardField::as_str)
            .collect();
        keys.extend(self.extra.keys().map(String::as_str));
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Overwrite every field `patch` carries; leave the rest alone.
    pub fn overlay(&mut self, patch: &EntityRecord) {
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(age) = patch.age {
            self.age = Some(age);
        }
        if let Some(alive) = patch.alive {
            self.alive = Some(alive);
        }
        if let Some(location) = &patch.location {
            self.location = Some(location.clone());
        }
        for (key, value) in &patch.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for field in HardField::ALL {
            if let Some(value) = field.value_of(self) {
                map.insert(field.as_str().to_string(), value);
            }
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

#[derive(Debug, Default, PartialEq)]
struct CanonState {
    characters: BTreeMap<String, Arc<EntityRecord>>,
}

/// Accumulated story facts, keyed by entity id.
///
/// Cloning is cheap and preserves identity: `a.clone().ptr_eq(&a)`.
#[derive(Debug, Clone, Default)]
pub struct Canon {
    inner: Arc<CanonState>,
}

impl PartialEq for Canon {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner == other.inner
    }
}

impl Canon {
    /// The defined empty state: no entities.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_characters(characters: BTreeMap<String, Arc<EntityRecord>>) -> Self {
        Self {
            inner: Arc::new(CanonState { characters }),
        }
    }

    pub(crate) fn characters_map(&self) -> &BTreeMap<String, Arc<EntityRecord>> {
        &self.inner.characters
    }

    /// Whether both values are the same allocation, not merely equal.
    pub fn ptr_eq(&self, other: &Canon) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn len(&self) -> usize {
        self.inner.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.characters.is_empty()
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.inner.characters.contains_key(entity_id)
    }

    pub fn entity(&self, entity_id: &str) -> Option<&EntityRecord> {
        self.inner.characters.get(entity_id).map(Arc::as_ref)
    }

    /// Shared handle to a record, for identity checks across canon versions.
    pub fn entity_arc(&self, entity_id: &str) -> Option<&Arc<EntityRecord>> {
        self.inner.characters.get(entity_id)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&str, &EntityRecord)> {
        self.inner
            .characters
            .iter()
            .map(|(id, record)| (id.as_str(), record.as_ref()))
    }

    /// Canon marks the entity as not alive. Unknown aliveness is not death.
    pub fn is_dead(&self, entity_id: &str) -> bool {
        self.entity(entity_id)
            .is_some_and(|record| record.alive == Some(false))
    }

    /// Load a snapshot document: `{"characters": {id: record}}`.
    pub fn from_value(value: &Value) -> Result<Self, CanonError> {
        let Value::Object(root) = value else {
            return Err(CanonError::InvalidSnapshot(
                "snapshot must be a JSON object".to_string(),
            ));
        };
        if let Some(key) = root.keys().find(|key| key.as_str() != "characters") {
            return Err(CanonError::InvalidSnapshot(format!(
                "unknown snapshot key '{key}'"
            )));
        }

        let mut characters = BTreeMap::new();
        match root.get("characters") {
            None => {}
            Some(Value::Object(entities)) => {
                for (id, raw) in entities {
                    if !is_valid_entity_id(id) {
                        return Err(CanonError::InvalidSnapshot(format!(
                            "invalid entity id '{id}'"
                        )));
                    }
                    if !raw.is_object() {
                        return Err(CanonError::InvalidSnapshot(format!(
                            "characters.{id}: record must be an object"
                        )));
                    }
                    let record: EntityRecord = serde_json::from_value(raw.clone())
                        .map_err(|e| CanonError::InvalidSnapshot(format!("characters.{id}: {e}")))?;
                    characters.insert(id.clone(), Arc::new(record));
                }
            }
            Some(_) => {
                return Err(CanonError::InvalidSnapshot(
                    "'characters' must be an object".to_string(),
                ));
            }
        }
        Ok(Self::from_characters(characters))
    }

    pub fn to_value(&self) -> Value {
        let characters: Map<String, Value> = self
            .entities()
            .map(|(id, record)| (id.to_string(), record.to_value()))
            .collect();
        let mut root = Map::new();
        root.insert("characters".to_string(), Value::Object(characters));
        Value::Object(root)
    }

    /// Canonical snapshot bytes: sorted keys, 2-space indent, trailing newline.
    pub fn to_canonical_json(&self) -> Result<String, CanonError> {
        Ok(canonical_json_pretty(&self.to_value())?)
    }

    /// SHA-256 hex of the canonical snapshot bytes.
    pub fn digest(&self) -> Result<String, CanonError> {
        Ok(sha256_hex(self.to_canonical_json()?.as_bytes()))
    }
}

impl Serialize for Canon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Canon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Canon::from_value(&value).map_err(D::Error::custom)
    }
}
