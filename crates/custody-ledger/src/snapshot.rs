//! # Snapshots — Persistence Across Restarts
//!
//! The ledger's persistence format is a serde snapshot: records in
//! registration order plus the capability table state. A snapshot
//! round-trips through any serde format (JSON in the tests) and restores
//! a ledger that upholds the same invariants and lifecycle.
//!
//! Undrained notification outboxes are deliberately not part of a
//! snapshot — notifications describe mutations already applied, and a
//! restart is expected to happen after consumers have drained them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use custody_core::{PrincipalId, ResourceKey};

use crate::capability::CapabilityTable;
use crate::ledger::EvidenceLedger;
use crate::policy::LedgerPolicy;
use crate::record::EvidenceRecord;

/// Serializable state of an [`EvidenceLedger`] and its capability table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// The forensic administrator.
    pub administrator: PrincipalId,
    /// The ledger's service identity.
    pub identity: PrincipalId,
    /// The active policy.
    pub policy: LedgerPolicy,
    /// Every record, in registration order. Resource keys are re-derived
    /// on restore.
    pub records: Vec<EvidenceRecord>,
    /// Capability table state (administrator + grant relation).
    pub capabilities: CapabilityTable,
}

impl EvidenceLedger {
    /// Capture the full ledger state for persistence.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let records = self
            .ordered_keys()
            .iter()
            .filter_map(|key| self.record_by_key(key).cloned())
            .collect();
        LedgerSnapshot {
            administrator: self.administrator().clone(),
            identity: self.identity().clone(),
            policy: self.policy(),
            records,
            capabilities: self.capability_table_state(),
        }
    }

    /// Rebuild a ledger from a snapshot.
    ///
    /// Keys are re-derived from each record's identity pair, so a
    /// snapshot edited to contain duplicate pairs collapses to the last
    /// occurrence rather than corrupting enumeration.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let mut records = HashMap::with_capacity(snapshot.records.len());
        let mut order = Vec::with_capacity(snapshot.records.len());
        for record in snapshot.records {
            let key = ResourceKey::derive(&record.case_id, &record.evidence_id);
            if records.insert(key, record).is_none() {
                order.push(key);
            }
        }
        Self::from_parts(
            snapshot.administrator,
            snapshot.identity,
            snapshot.policy,
            records,
            order,
            Arc::new(RwLock::new(snapshot.capabilities)),
        )
    }
}
