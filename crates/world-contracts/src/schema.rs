//! Schema validator for the fixed set of contract documents.
//!
//! Contracts are JSON Schema (draft 2020-12) documents embedded at build time.
//! Each is compiled once per process. Validation is side-effect-free and stops
//! at the first violated constraint; no partial recovery is attempted.

use crate::error::ContractError;
use jsonschema::{Draft, Validator};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const SCRIPT_V1: &str = include_str!("../schemas/Script.v1.json");
const SHOTLIST_V1: &str = include_str!("../schemas/ShotList.v1.json");
const CANON_VIOLATION_REPORT_V1: &str = include_str!("../schemas/CanonViolationReport.v1.json");

static SCRIPT_VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();
static SHOTLIST_VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();
static REPORT_VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();

/// Identifier of one contract schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaId {
    ScriptV1,
    ShotListV1,
    CanonViolationReportV1,
}

impl SchemaId {
    pub const ALL: [SchemaId; 3] = [
        SchemaId::ScriptV1,
        SchemaId::ShotListV1,
        SchemaId::CanonViolationReportV1,
    ];

    /// Contract name, e.g. `Script.v1`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScriptV1 => "Script.v1",
            Self::ShotListV1 => "ShotList.v1",
            Self::CanonViolationReportV1 => "CanonViolationReport.v1",
        }
    }

    /// File name of the contract document, e.g. `Script.v1.json`.
    pub fn file_name(self) -> String {
        format!("{}.json", self.as_str())
    }

    /// Raw JSON text of the embedded contract.
    pub fn source(self) -> &'static str {
        match self {
            Self::ScriptV1 => SCRIPT_V1,
            Self::ShotListV1 => SHOTLIST_V1,
            Self::CanonViolationReportV1 => CANON_VIOLATION_REPORT_V1,
        }
    }

    fn cell(self) -> &'static OnceLock<Result<Validator, String>> {
        match self {
            Self::ScriptV1 => &SCRIPT_VALIDATOR,
            Self::ShotListV1 => &SHOTLIST_VALIDATOR,
            Self::CanonViolationReportV1 => &REPORT_VALIDATOR,
        }
    }

    fn validator(self) -> Result<&'static Validator, ContractError> {
        self.cell()
            .get_or_init(|| compile(self.source()))
            .as_ref()
            .map_err(|reason| ContractError::SchemaCompile {
                schema: self,
                reason: reason.clone(),
            })
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_suffix(".json").unwrap_or(s);
        SchemaId::ALL
            .into_iter()
            .find(|id| id.as_str() == name)
            .ok_or_else(|| format!("unknown contract schema `{s}`"))
    }
}

fn compile(source: &str) -> Result<Validator, String> {
    let schema: Value = serde_json::from_str(source).map_err(|e| e.to_string())?;
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|e| e.to_string())
}

/// Outcome of validating one document against one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub schema: SchemaId,
    pub ok: bool,
    /// First violated constraint; `None` when `ok`.
    pub reason: Option<String>,
}

impl ValidationResult {
    fn passed(schema: SchemaId) -> Self {
        Self {
            schema,
            ok: true,
            reason: None,
        }
    }

    fn failed(schema: SchemaId, reason: impl Into<String>) -> Self {
        Self {
            schema,
            ok: false,
            reason: Some(reason.into()),
        }
    }

    /// Convert into a `Result`, carrying the failure reason.
    pub fn into_result(self) -> Result<(), ContractError> {
        if self.ok {
            return Ok(());
        }
        Err(ContractError::SchemaViolation {
            schema: self.schema,
            reason: self.reason.unwrap_or_default(),
        })
    }
}

/// Validate `document` against the contract named by `schema`.
pub fn validate(document: &Value, schema: SchemaId) -> ValidationResult {
    let validator = match schema.validator() {
        Ok(validator) => validator,
        Err(err) => return ValidationResult::failed(schema, err.to_string()),
    };
    match validator.iter_errors(document).next() {
        None => ValidationResult::passed(schema),
        Some(first) => {
            let reason = first.to_string();
            tracing::debug!(schema = %schema, %reason, "contract validation failed");
            ValidationResult::failed(schema, reason)
        }
    }
}
