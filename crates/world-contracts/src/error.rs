//! Error types for contract loading and validation.

use crate::schema::SchemaId;

/// Errors raised while parsing, validating or serializing contract documents.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// The document does not conform to its contract schema.
    #[error("{schema}: {reason}")]
    SchemaViolation { schema: SchemaId, reason: String },

    /// An embedded contract schema could not be compiled.
    #[error("{schema}: contract schema failed to compile: {reason}")]
    SchemaCompile { schema: SchemaId, reason: String },

    /// The document passed schema validation but could not be decoded.
    #[error("{schema}: decode error: {reason}")]
    Decode { schema: SchemaId, reason: String },

    /// Serialization to canonical JSON failed.
    #[error("serialization error: {0}")]
    Serialize(String),
}
