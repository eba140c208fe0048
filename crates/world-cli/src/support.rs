use crate::config::EngineConfig;
use serde_json::Value;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt};
use world_canon::{Canon, DecisionPolicy};
use world_store::write_atomic;

pub const LOG_ENV: &str = "WORLD_ENGINE_LOG";

/// Structured logs go to stderr; stdout carries only status lines and artifacts.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Print `ERROR: <reason>` and exit 1.
pub fn fail(reason: impl Display) -> ! {
    println!("ERROR: {reason}");
    std::process::exit(1);
}

pub fn load_config_or_exit(path: Option<&str>) -> EngineConfig {
    match path {
        Some(path) => EngineConfig::load(Path::new(path)).unwrap_or_else(|e| fail(e)),
        None => EngineConfig::default(),
    }
}

pub fn read_json_or_exit(path: &str) -> Value {
    let text = fs::read_to_string(path).unwrap_or_else(|e| fail(format!("failed to read {path}: {e}")));
    serde_json::from_str(&text).unwrap_or_else(|e| fail(format!("invalid JSON in {path}: {e}")))
}

pub fn load_canon_or_exit(path: &str) -> Canon {
    Canon::from_value(&read_json_or_exit(path))
        .unwrap_or_else(|e| fail(format!("invalid canon snapshot {path}: {e}")))
}

/// `--policy` wins over the config file's `[policy]` section.
pub fn policy_or_exit(config: &EngineConfig, policy: Option<&str>) -> DecisionPolicy {
    match policy {
        Some(path) => DecisionPolicy::load(Path::new(path)).unwrap_or_else(|e| fail(e)),
        None => config.policy.to_policy(),
    }
}

pub fn write_text_or_exit(path: &str, text: &str) {
    write_atomic(Path::new(path), text.as_bytes())
        .unwrap_or_else(|e| fail(format!("failed to write {path}: {e}")));
}
