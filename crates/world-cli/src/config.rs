//! Optional TOML configuration for the `world-engine` binary.
//!
//! ```toml
//! [store]
//! root = ".world-engine/projects"
//!
//! [policy]
//! forbidden_tokens = ["__FORBIDDEN__"]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use world_canon::{DEFAULT_FORBIDDEN_TOKEN, DecisionPolicy};

pub const DEFAULT_STORE_ROOT: &str = ".world-engine/projects";

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub store: StoreConfig,
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_STORE_ROOT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub forbidden_tokens: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            forbidden_tokens: vec![DEFAULT_FORBIDDEN_TOKEN.to_string()],
        }
    }
}

impl PolicyConfig {
    pub fn to_policy(&self) -> DecisionPolicy {
        DecisionPolicy::from_tokens(self.forbidden_tokens.iter().map(String::as_str))
    }
}

impl EngineConfig {
    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("invalid config: {e}"))
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
        Self::parse(&text)
    }
}
