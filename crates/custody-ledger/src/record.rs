//! # Evidence Records
//!
//! One `EvidenceRecord` exists per `(case, evidence)` identity pair. The
//! record owns its custody history and the soft-deletion flag.
//!
//! ## Invariants
//!
//! - `case_id` and `evidence_id` are immutable after creation.
//! - `deleted` transitions false→true exactly once, never back.
//! - `current_holder` changes only through an authorized transfer.
//! - `history` is append-only; past entries are never mutated or removed.

use serde::{Deserialize, Serialize};

use custody_core::{CaseId, ContentRef, EvidenceId, PrincipalId};

use crate::event::CustodyEvent;

/// A custody record for a single evidence item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// The case this evidence belongs to.
    pub case_id: CaseId,
    /// The evidence item identifier within the case.
    pub evidence_id: EvidenceId,
    /// The principal currently in custody of the evidence.
    pub current_holder: PrincipalId,
    /// Display label of the current holder.
    pub current_holder_name: String,
    /// Free-form description of the evidence.
    pub description: String,
    /// Content-addressed pointer to the raw artifact in external storage.
    pub content_ref: ContentRef,
    /// Soft-deletion flag; terminal once set.
    pub deleted: bool,
    /// Append-only custody history.
    pub history: Vec<CustodyEvent>,
}

impl EvidenceRecord {
    /// Whether the record has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Immutable snapshot of the current fields, excluding history.
    pub fn summary(&self) -> EvidenceSummary {
        EvidenceSummary {
            case_id: self.case_id.clone(),
            evidence_id: self.evidence_id.clone(),
            current_holder: self.current_holder.clone(),
            current_holder_name: self.current_holder_name.clone(),
            description: self.description.clone(),
            content_ref: self.content_ref.clone(),
            deleted: self.deleted,
        }
    }
}

/// Snapshot of an evidence record's current fields.
///
/// Returned by view operations; owned data, never a live reference into
/// ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSummary {
    /// The case this evidence belongs to.
    pub case_id: CaseId,
    /// The evidence item identifier within the case.
    pub evidence_id: EvidenceId,
    /// The principal currently in custody of the evidence.
    pub current_holder: PrincipalId,
    /// Display label of the current holder.
    pub current_holder_name: String,
    /// Free-form description of the evidence.
    pub description: String,
    /// Content-addressed pointer to the raw artifact in external storage.
    pub content_ref: ContentRef,
    /// Soft-deletion flag.
    pub deleted: bool,
}

impl std::fmt::Display for EvidenceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} held by {} ({}){}: {} [{}]",
            self.case_id,
            self.evidence_id,
            self.current_holder,
            self.current_holder_name,
            if self.deleted { " [deleted]" } else { "" },
            self.description,
            self.content_ref,
        )
    }
}
