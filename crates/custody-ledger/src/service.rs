//! # Custody Service — Serialized Shared Access
//!
//! The ledger's reference semantics serialize every mutating call into a
//! single global order: one call fully completes, internal reads, writes,
//! and notifications included, before the next begins. `CustodyService`
//! makes that explicit for multi-threaded callers by wrapping the ledger
//! in a reader-writer lock.
//!
//! Mutating operations hold the write lock for their whole duration, so
//! two interleaved transfers, or a transfer racing a delete, cannot
//! produce a record with inconsistent holder/deletion/capability state.
//! Reads hold the read lock and observe a consistent snapshot; they may
//! run concurrently with each other. Lock order is always ledger →
//! capability table, and lock poisoning is recovered via `into_inner`
//! rather than propagated as a panic.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use custody_core::{CaseId, EvidenceId, PrincipalId};

use crate::error::LedgerError;
use crate::event::CustodyEvent;
use crate::ledger::{CapabilityHandle, CustodyHandoff, EvidenceIntake, EvidenceLedger};
use crate::notify::LedgerNotification;
use crate::record::EvidenceSummary;

/// Thread-safe, cloneable facade over a shared [`EvidenceLedger`].
#[derive(Debug, Clone)]
pub struct CustodyService {
    inner: Arc<RwLock<EvidenceLedger>>,
}

impl CustodyService {
    /// Wrap a ledger for shared access.
    pub fn new(ledger: EvidenceLedger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Register new evidence; the caller becomes the holder.
    pub fn register(
        &self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
        intake: EvidenceIntake,
    ) -> Result<(), LedgerError> {
        self.write().register(caller, case_id, evidence_id, intake)
    }

    /// Transfer custody to `handoff.to`.
    pub fn transfer(
        &self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
        handoff: CustodyHandoff,
    ) -> Result<(), LedgerError> {
        self.write().transfer(caller, case_id, evidence_id, handoff)
    }

    /// Soft-delete a record.
    pub fn soft_delete(
        &self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
    ) -> Result<(), LedgerError> {
        self.write().soft_delete(caller, case_id, evidence_id)
    }

    /// Grant `principal` read access.
    pub fn grant_access(
        &self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
        principal: PrincipalId,
    ) -> Result<(), LedgerError> {
        self.write().grant_access(caller, case_id, evidence_id, principal)
    }

    /// Revoke `principal`'s read access.
    pub fn revoke_access(
        &self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
        principal: PrincipalId,
    ) -> Result<(), LedgerError> {
        self.write().revoke_access(caller, case_id, evidence_id, principal)
    }

    /// Snapshot of the record's current fields.
    pub fn view(
        &self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
    ) -> Result<EvidenceSummary, LedgerError> {
        self.read().view(caller, case_id, evidence_id)
    }

    /// The full custody history in append order.
    pub fn history(
        &self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
    ) -> Result<Vec<CustodyEvent>, LedgerError> {
        self.read().history(caller, case_id, evidence_id)
    }

    /// Number of ever-registered records.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no records have been registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// The `(case, evidence)` pair at `index` in registration order.
    pub fn id_at(&self, index: usize) -> Result<(CaseId, EvidenceId), LedgerError> {
        self.read().id_at(index)
    }

    /// Registered `(case, evidence)` pairs in registration order.
    pub fn ids(&self) -> Vec<(CaseId, EvidenceId)> {
        self.read()
            .ids()
            .map(|(c, e)| (c.clone(), e.clone()))
            .collect()
    }

    /// Drain buffered notifications in emission order.
    pub fn take_notifications(&self) -> Vec<LedgerNotification> {
        self.write().take_notifications()
    }

    /// Shared handle to the capability table backing read authorization.
    pub fn capability_table(&self) -> CapabilityHandle {
        self.read().capability_table()
    }

    fn read(&self) -> RwLockReadGuard<'_, EvidenceLedger> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EvidenceLedger> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
