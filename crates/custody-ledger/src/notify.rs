//! # Notifications
//!
//! One-way, ordered, append-style signals consumed by external indexing
//! and audit collaborators. A notification is emitted exactly once per
//! successful mutation, after the state change is applied; rejected calls
//! emit nothing.
//!
//! Both the ledger and the capability table buffer their notifications in
//! an outbox drained by `take_notifications()` — consumers pull in emission
//! order, and draining never reorders or drops entries.

use serde::{Deserialize, Serialize};

use custody_core::{CaseId, ContentRef, EvidenceId, PrincipalId, ResourceKey, Timestamp};

// ─── Ledger Notifications ────────────────────────────────────────────

/// Signal emitted by the evidence ledger for every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerNotification {
    /// A new evidence record was created.
    EvidenceRegistered {
        /// Case of the new record.
        case_id: CaseId,
        /// Evidence item of the new record.
        evidence_id: EvidenceId,
        /// The registering principal, now the holder.
        holder: PrincipalId,
        /// Display label of the holder.
        holder_name: String,
        /// Artifact pointer supplied at registration.
        content_ref: ContentRef,
        /// When the registration was applied.
        timestamp: Timestamp,
    },
    /// Custody moved to a new holder.
    EvidenceTransferred {
        /// Case of the transferred record.
        case_id: CaseId,
        /// Evidence item of the transferred record.
        evidence_id: EvidenceId,
        /// Outgoing holder.
        from: PrincipalId,
        /// Incoming holder.
        to: PrincipalId,
        /// Display label of the incoming holder.
        to_name: String,
        /// When the transfer was applied.
        timestamp: Timestamp,
    },
    /// A record was soft-deleted.
    EvidenceDeleted {
        /// Case of the deleted record.
        case_id: CaseId,
        /// Evidence item of the deleted record.
        evidence_id: EvidenceId,
        /// The principal that performed the deletion.
        by: PrincipalId,
        /// When the deletion was applied.
        timestamp: Timestamp,
    },
    /// A read capability was granted through the ledger.
    AccessGranted {
        /// Case of the affected record.
        case_id: CaseId,
        /// Evidence item of the affected record.
        evidence_id: EvidenceId,
        /// The grantee.
        principal: PrincipalId,
        /// When the grant was applied.
        timestamp: Timestamp,
    },
    /// A read capability was revoked through the ledger.
    AccessRevoked {
        /// Case of the affected record.
        case_id: CaseId,
        /// Evidence item of the affected record.
        evidence_id: EvidenceId,
        /// The principal losing access.
        principal: PrincipalId,
        /// When the revocation was applied.
        timestamp: Timestamp,
    },
}

// ─── Capability Notifications ────────────────────────────────────────

/// Signal emitted by the capability table for every successful
/// grant/revoke, including state-wise no-op repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessNotification {
    /// A grant boolean was set true.
    AccessAssigned {
        /// Resource the grant applies to.
        key: ResourceKey,
        /// The grantee.
        principal: PrincipalId,
        /// When the assignment was applied.
        timestamp: Timestamp,
    },
    /// A grant boolean was set false.
    AccessRevoked {
        /// Resource the revocation applies to.
        key: ResourceKey,
        /// The principal losing access.
        principal: PrincipalId,
        /// When the revocation was applied.
        timestamp: Timestamp,
    },
}
