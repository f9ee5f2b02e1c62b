//! # Error Taxonomy
//!
//! Every rejected call surfaces a specific error kind so calling layers
//! can distinguish "doesn't exist" from "not authorized" from "already in
//! terminal state". All rejections are local, synchronous, and
//! non-retryable: a failed operation changes no state and emits no
//! notification.

use thiserror::Error;

use custody_core::{CaseId, EvidenceId, PrincipalId};

/// Errors raised by evidence ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A record already exists for this identity pair.
    #[error("evidence already registered for {case_id} / {evidence_id}")]
    AlreadyExists {
        /// Case of the conflicting pair.
        case_id: CaseId,
        /// Evidence item of the conflicting pair.
        evidence_id: EvidenceId,
    },

    /// No record exists for this identity pair.
    #[error("no evidence registered for {case_id} / {evidence_id}")]
    NotFound {
        /// Case of the missing pair.
        case_id: CaseId,
        /// Evidence item of the missing pair.
        evidence_id: EvidenceId,
    },

    /// The record is soft-deleted; its lifecycle is terminal.
    #[error("evidence {case_id} / {evidence_id} is deleted")]
    AlreadyDeleted {
        /// Case of the deleted record.
        case_id: CaseId,
        /// Evidence item of the deleted record.
        evidence_id: EvidenceId,
    },

    /// Caller is not the current holder.
    #[error("caller {caller} is not the current holder")]
    NotHolder {
        /// The rejected caller.
        caller: PrincipalId,
    },

    /// Caller is neither administrator, holder, nor an active grantee.
    #[error("caller {caller} is not authorized")]
    NotAuthorized {
        /// The rejected caller.
        caller: PrincipalId,
    },

    /// Transfer target equals the current holder.
    #[error("cannot transfer evidence to its current holder")]
    SelfTransfer,

    /// Enumeration index beyond the number of registered records.
    #[error("index {index} out of range for {len} registered records")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// Number of ever-registered records.
        len: usize,
    },

    /// Capability table rejected the delegated operation.
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// Errors raised by capability table operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// Caller is not the table administrator.
    #[error("caller {caller} is not the capability administrator")]
    NotAdmin {
        /// The rejected caller.
        caller: PrincipalId,
    },
}
