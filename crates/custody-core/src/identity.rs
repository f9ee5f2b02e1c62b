//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers that flow through the custody
//! ledger. These prevent accidental identifier confusion — you cannot pass
//! a `CaseId` where an `EvidenceId` is expected, and a caller principal can
//! never be mistaken for an artifact reference.
//!
//! ## Security Invariant
//!
//! Every constructor rejects empty strings. An empty case or evidence
//! identifier would collapse distinct custody records onto one resource
//! key namespace, and an empty principal would make authorization checks
//! vacuous.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Identifier of the investigative case an evidence item belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseId(String);

/// Identifier of a single evidence item within a case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvidenceId(String);

/// Verified caller identity supplied by the authenticating transport.
///
/// Opaque to the ledger — the transport is responsible for authentication;
/// the ledger only compares principals for equality. Serializes as its
/// inner string, so it can key JSON maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrincipalId(String);

/// Content-addressed pointer to the raw evidence artifact held in an
/// external store (e.g., an IPFS content hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef(String);

impl CaseId {
    /// Construct a case identifier, rejecting empty input.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        non_empty(id.into(), "case_id").map(Self)
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl EvidenceId {
    /// Construct an evidence identifier, rejecting empty input.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        non_empty(id.into(), "evidence_id").map(Self)
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PrincipalId {
    /// Construct a principal identity, rejecting empty input.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        non_empty(id.into(), "principal").map(Self)
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ContentRef {
    /// Construct an artifact reference, rejecting empty input.
    pub fn new(reference: impl Into<String>) -> Result<Self, CoreError> {
        non_empty(reference.into(), "content_ref").map(Self)
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn non_empty(value: String, field: &'static str) -> Result<String, CoreError> {
    if value.is_empty() {
        return Err(CoreError::EmptyIdentifier { field });
    }
    Ok(value)
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "case:{}", self.0)
    }
}

impl std::fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evidence:{}", self.0)
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
