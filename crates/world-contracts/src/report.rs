//! CanonViolationReport contract: every contradiction between a Script
//! draft and a canon snapshot.

use crate::error::ContractError;
use crate::schema::{SchemaId, validate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CANON_VIOLATION_REPORT_SCHEMA_ID: &str = "CanonViolationReport";
pub const CANON_VIOLATION_REPORT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A character canon records as dead appears in the draft.
    DeadCharacterAppears,
    /// An explicit roster fact disagrees with a known canon hard fact.
    FactMismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonViolation {
    pub entity_id: String,
    pub field: String,
    pub canon_value: Value,
    pub draft_value: Value,
    pub kind: ViolationKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonViolationReport {
    pub schema_id: String,
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub script_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<String>,
    pub violations: Vec<CanonViolation>,
}

impl CanonViolationReport {
    /// Build a report and check it against `CanonViolationReport.v1`.
    ///
    /// A report with zero violations does not conform; callers only build
    /// one on gate failure.
    pub fn new(
        project_id: Option<String>,
        script_id: impl Into<String>,
        episode_id: Option<String>,
        violations: Vec<CanonViolation>,
    ) -> Result<Self, ContractError> {
        let report = Self {
            schema_id: CANON_VIOLATION_REPORT_SCHEMA_ID.to_string(),
            schema_version: CANON_VIOLATION_REPORT_SCHEMA_VERSION.to_string(),
            project_id,
            script_id: script_id.into(),
            episode_id,
            violations,
        };
        report.validate_contract()?;
        Ok(report)
    }

    pub fn validate_contract(&self) -> Result<(), ContractError> {
        let value =
            serde_json::to_value(self).map_err(|e| ContractError::Serialize(e.to_string()))?;
        validate(&value, SchemaId::CanonViolationReportV1).into_result()
    }

    /// Whether any violation concerns `entity_id` and `field`.
    pub fn mentions(&self, entity_id: &str, field: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.entity_id == entity_id && v.field == field)
    }
}
