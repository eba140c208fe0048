//! Forbidden-token policy for the decision gate.

use crate::error::PolicyError;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Reserved delimiter-wrapped policy marker shipped as the default policy.
pub const DEFAULT_FORBIDDEN_TOKEN: &str = "__FORBIDDEN__";

/// Exact substrings that block a ShotList with the `FORBIDDEN_TOKEN` code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionPolicy {
    forbidden_tokens: BTreeSet<String>,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::from_tokens([DEFAULT_FORBIDDEN_TOKEN])
    }
}

impl DecisionPolicy {
    /// Empty tokens are dropped: they would match every text.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            forbidden_tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|token: &String| !token.is_empty())
                .collect(),
        }
    }

    /// Accepts a JSON list of tokens or `{"forbidden_tokens": [...]}`.
    /// Non-string entries are ignored.
    pub fn from_json_value(value: &Value) -> Result<Self, PolicyError> {
        let tokens = match value {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("forbidden_tokens") {
                None => return Ok(Self::from_tokens(Vec::<String>::new())),
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(PolicyError::InvalidFormat(
                        "'forbidden_tokens' must be a list".to_string(),
                    ));
                }
            },
            _ => {
                return Err(PolicyError::InvalidFormat(
                    "expected a list or an object with 'forbidden_tokens'".to_string(),
                ));
            }
        };
        Ok(Self::from_tokens(
            tokens.iter().filter_map(Value::as_str).map(str::to_string),
        ))
    }

    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PolicyError::Missing(path.display().to_string()),
            _ => PolicyError::Unreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        })?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| PolicyError::InvalidFormat(format!("{}: {e}", path.display())))?;
        let policy = Self::from_json_value(&value)?;
        tracing::debug!(
            path = %path.display(),
            tokens = policy.forbidden_tokens.len(),
            "loaded decision policy"
        );
        Ok(policy)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.forbidden_tokens.iter().map(String::as_str)
    }

    /// First policy token (in sorted order) contained in `text`.
    pub fn matching_token(&self, text: &str) -> Option<&str> {
        self.tokens().find(|token| text.contains(token))
    }
}
