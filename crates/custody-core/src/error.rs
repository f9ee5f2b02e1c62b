//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by the foundational custody types. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.

use thiserror::Error;

/// Top-level error type for the foundational custody types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An identifier was constructed from an empty string.
    #[error("identifier field {field:?} must be non-empty")]
    EmptyIdentifier {
        /// Which identifier field was empty (e.g., "case_id").
        field: &'static str,
    },

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A timestamp string could not be parsed or violated the UTC-only rule.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The offending input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Identifiers and labels must be strings or integers.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
