//! # Evidence Ledger
//!
//! Authoritative owner of evidence identity, holder assignment, and the
//! custody audit trail; gatekeeper for every mutating operation.
//!
//! ## State Machine
//!
//! ```text
//! Unregistered ──register()──▶ Active ──transfer()──▶ Active
//!                                │
//!                                ├── grant_access() / revoke_access()
//!                                │
//!                          soft_delete()
//!                                │
//!                                ▼
//!                            Deleted (terminal)
//! ```
//!
//! Grant/revoke remain available from `Deleted` when
//! `LedgerPolicy::allow_access_changes_after_delete` is set; holder and
//! deletion state never change again.
//!
//! ## Authorization
//!
//! Every operation takes the verified caller identity as an explicit
//! parameter — there is no ambient "current caller". Reads are authorized
//! for the administrator, the current holder, and principals with an
//! active grant in the capability table. All checks precede the first
//! state change, so a rejected call has zero observable side effects.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use custody_core::{CaseId, ContentRef, EvidenceId, PrincipalId, ResourceKey, Timestamp};

use crate::capability::CapabilityTable;
use crate::error::LedgerError;
use crate::event::{CustodyAction, CustodyEvent};
use crate::notify::LedgerNotification;
use crate::policy::LedgerPolicy;
use crate::record::{EvidenceRecord, EvidenceSummary};

/// Shared handle to a capability table.
///
/// The ledger holds one; external callers may hold clones of the same
/// handle to query or administer the table directly.
pub type CapabilityHandle = Arc<RwLock<CapabilityTable>>;

// ─── Operation Payloads ──────────────────────────────────────────────

/// Intake details supplied at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceIntake {
    /// Display label of the registering holder.
    pub holder_name: String,
    /// Free-form description of the evidence.
    pub description: String,
    /// Content-addressed pointer to the raw artifact.
    pub content_ref: ContentRef,
    /// Recorded action; [`CustodyAction::Collected`] when `None`.
    pub action: Option<CustodyAction>,
}

/// Details of a custody handoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyHandoff {
    /// The incoming holder.
    pub to: PrincipalId,
    /// Display label of the incoming holder.
    pub to_name: String,
    /// Recorded action; [`CustodyAction::Transferred`] when `None`.
    pub action: Option<CustodyAction>,
    /// Free-form description of the handoff.
    pub description: String,
}

// ─── Evidence Ledger ─────────────────────────────────────────────────

/// The evidence custody ledger.
///
/// Owns one record per `(case, evidence)` identity pair, joined to the
/// capability table by the derived [`ResourceKey`]. Mutating methods take
/// `&mut self`, so a single ledger value is inherently serialized; see
/// [`CustodyService`](crate::service::CustodyService) for the shared,
/// thread-safe facade.
#[derive(Debug)]
pub struct EvidenceLedger {
    administrator: PrincipalId,
    identity: PrincipalId,
    policy: LedgerPolicy,
    records: HashMap<ResourceKey, EvidenceRecord>,
    /// Every registered key, in registration order.
    order: Vec<ResourceKey>,
    capabilities: CapabilityHandle,
    outbox: Vec<LedgerNotification>,
}

impl EvidenceLedger {
    /// Create a ledger administered by `administrator`, with a fresh
    /// capability table whose administrator is the ledger's own service
    /// identity — the bootstrap delegation that lets transfers provision
    /// read grants without a separate admin action.
    pub fn new(administrator: PrincipalId) -> Self {
        let identity = PrincipalId::new(format!("ledger:{}", Uuid::new_v4()))
            .unwrap_or_else(|_| unreachable!("generated identity is non-empty"));
        let capabilities = Arc::new(RwLock::new(CapabilityTable::new(identity.clone())));
        Self {
            administrator,
            identity,
            policy: LedgerPolicy::default(),
            records: HashMap::new(),
            order: Vec::new(),
            capabilities,
            outbox: Vec::new(),
        }
    }

    /// Replace the default policy.
    pub fn with_policy(mut self, policy: LedgerPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Inject an existing capability table handle.
    ///
    /// The table's administrator must be (or be reassigned to) the
    /// ledger's [`identity()`](Self::identity) for capability delegation
    /// to work; tests use this to wire isolated instances.
    pub fn with_capability_table(mut self, capabilities: CapabilityHandle) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// The forensic administrator principal.
    pub fn administrator(&self) -> &PrincipalId {
        &self.administrator
    }

    /// The ledger's own service identity, administrator of its
    /// capability table.
    pub fn identity(&self) -> &PrincipalId {
        &self.identity
    }

    /// The active policy.
    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    /// Shared handle to the capability table backing read authorization.
    pub fn capability_table(&self) -> CapabilityHandle {
        Arc::clone(&self.capabilities)
    }

    // ─── Mutating Operations ─────────────────────────────────────────

    /// Register new evidence; the caller becomes the holder.
    ///
    /// Appends one custody event and emits
    /// [`LedgerNotification::EvidenceRegistered`].
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the derived key already has a record.
    pub fn register(
        &mut self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
        intake: EvidenceIntake,
    ) -> Result<(), LedgerError> {
        let key = ResourceKey::derive(case_id, evidence_id);
        if self.records.contains_key(&key) {
            return Err(LedgerError::AlreadyExists {
                case_id: case_id.clone(),
                evidence_id: evidence_id.clone(),
            });
        }

        let timestamp = Timestamp::now();
        let record = EvidenceRecord {
            case_id: case_id.clone(),
            evidence_id: evidence_id.clone(),
            current_holder: caller.clone(),
            current_holder_name: intake.holder_name.clone(),
            description: intake.description.clone(),
            content_ref: intake.content_ref.clone(),
            deleted: false,
            history: vec![CustodyEvent {
                holder: caller.clone(),
                holder_name: intake.holder_name.clone(),
                action: intake.action.unwrap_or(CustodyAction::Collected),
                description: intake.description,
                timestamp,
            }],
        };
        self.records.insert(key, record);
        self.order.push(key);

        info!(case = %case_id, evidence = %evidence_id, holder = %caller, "evidence registered");
        self.outbox.push(LedgerNotification::EvidenceRegistered {
            case_id: case_id.clone(),
            evidence_id: evidence_id.clone(),
            holder: caller.clone(),
            holder_name: intake.holder_name,
            content_ref: intake.content_ref,
            timestamp,
        });
        Ok(())
    }

    /// Transfer custody to `handoff.to`. Caller must be the current
    /// holder.
    ///
    /// With [`LedgerPolicy::auto_grant_on_transfer`] set, the incoming
    /// holder's read grant is assigned through the capability table
    /// before the record changes hands.
    ///
    /// # Errors
    ///
    /// `NotFound`, `AlreadyDeleted`, `NotHolder`, `SelfTransfer`
    /// (policy-gated), or a capability error if the table administrator
    /// is not the ledger identity.
    pub fn transfer(
        &mut self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
        handoff: CustodyHandoff,
    ) -> Result<(), LedgerError> {
        let key = ResourceKey::derive(case_id, evidence_id);
        {
            let record = self.existing(&key, case_id, evidence_id)?;
            Self::require_live(record, case_id, evidence_id)?;
            if record.current_holder != *caller {
                return Err(LedgerError::NotHolder {
                    caller: caller.clone(),
                });
            }
            if self.policy.forbid_self_transfer && record.current_holder == handoff.to {
                return Err(LedgerError::SelfTransfer);
            }
        }

        if self.policy.auto_grant_on_transfer {
            let identity = self.identity.clone();
            self.table_mut().assign(&identity, key, handoff.to.clone())?;
        }

        let timestamp = Timestamp::now();
        let record = self.existing_mut(&key, case_id, evidence_id)?;
        record.current_holder = handoff.to.clone();
        record.current_holder_name = handoff.to_name.clone();
        record.history.push(CustodyEvent {
            holder: handoff.to.clone(),
            holder_name: handoff.to_name.clone(),
            action: handoff.action.unwrap_or(CustodyAction::Transferred),
            description: handoff.description,
            timestamp,
        });

        info!(case = %case_id, evidence = %evidence_id, from = %caller, to = %handoff.to, "custody transferred");
        self.outbox.push(LedgerNotification::EvidenceTransferred {
            case_id: case_id.clone(),
            evidence_id: evidence_id.clone(),
            from: caller.clone(),
            to: handoff.to,
            to_name: handoff.to_name,
            timestamp,
        });
        Ok(())
    }

    /// Soft-delete a record. Caller must be the current holder or the
    /// administrator. Terminal: holder and deletion state never change
    /// again.
    ///
    /// # Errors
    ///
    /// `NotFound`, `AlreadyDeleted`, `NotAuthorized`.
    pub fn soft_delete(
        &mut self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
    ) -> Result<(), LedgerError> {
        let key = ResourceKey::derive(case_id, evidence_id);
        let administrator = self.administrator.clone();
        let record = self.existing(&key, case_id, evidence_id)?;
        Self::require_live(record, case_id, evidence_id)?;
        if record.current_holder != *caller && *caller != administrator {
            return Err(LedgerError::NotAuthorized {
                caller: caller.clone(),
            });
        }

        let timestamp = Timestamp::now();
        let holder_name = Self::actor_name(record, caller);
        let record = self.existing_mut(&key, case_id, evidence_id)?;
        record.deleted = true;
        record.history.push(CustodyEvent {
            holder: caller.clone(),
            holder_name,
            action: CustodyAction::Deleted,
            description: String::new(),
            timestamp,
        });

        info!(case = %case_id, evidence = %evidence_id, by = %caller, "evidence deleted");
        self.outbox.push(LedgerNotification::EvidenceDeleted {
            case_id: case_id.clone(),
            evidence_id: evidence_id.clone(),
            by: caller.clone(),
            timestamp,
        });
        Ok(())
    }

    /// Grant `principal` read access. Caller must be the current holder
    /// or the administrator.
    ///
    /// Delegates to the capability table under the ledger's identity,
    /// then appends an audit event whether or not the grant boolean
    /// actually changed.
    pub fn grant_access(
        &mut self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
        principal: PrincipalId,
    ) -> Result<(), LedgerError> {
        self.change_access(caller, case_id, evidence_id, principal, true)
    }

    /// Revoke `principal`'s read access. Caller must be the current
    /// holder or the administrator.
    ///
    /// The principal stays on the table's ever-granted roster; only the
    /// boolean flips. An audit event is appended regardless of prior
    /// state.
    pub fn revoke_access(
        &mut self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
        principal: PrincipalId,
    ) -> Result<(), LedgerError> {
        self.change_access(caller, case_id, evidence_id, principal, false)
    }

    fn change_access(
        &mut self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
        principal: PrincipalId,
        grant: bool,
    ) -> Result<(), LedgerError> {
        let key = ResourceKey::derive(case_id, evidence_id);
        let administrator = self.administrator.clone();
        let allow_after_delete = self.policy.allow_access_changes_after_delete;
        let record = self.existing(&key, case_id, evidence_id)?;
        if !allow_after_delete {
            Self::require_live(record, case_id, evidence_id)?;
        }
        if record.current_holder != *caller && *caller != administrator {
            return Err(LedgerError::NotAuthorized {
                caller: caller.clone(),
            });
        }
        let holder_name = Self::actor_name(record, caller);

        let identity = self.identity.clone();
        if grant {
            self.table_mut().assign(&identity, key, principal.clone())?;
        } else {
            self.table_mut().revoke(&identity, key, principal.clone())?;
        }

        let timestamp = Timestamp::now();
        let (action, verb) = if grant {
            (CustodyAction::AccessGranted, "granted read access to")
        } else {
            (CustodyAction::AccessRevoked, "revoked read access from")
        };
        let record = self.existing_mut(&key, case_id, evidence_id)?;
        record.history.push(CustodyEvent {
            holder: caller.clone(),
            holder_name,
            action,
            description: format!("{verb} {principal}"),
            timestamp,
        });

        info!(case = %case_id, evidence = %evidence_id, principal = %principal, grant, "access changed");
        self.outbox.push(if grant {
            LedgerNotification::AccessGranted {
                case_id: case_id.clone(),
                evidence_id: evidence_id.clone(),
                principal,
                timestamp,
            }
        } else {
            LedgerNotification::AccessRevoked {
                case_id: case_id.clone(),
                evidence_id: evidence_id.clone(),
                principal,
                timestamp,
            }
        });
        Ok(())
    }

    // ─── Read Operations ─────────────────────────────────────────────

    /// Snapshot of the record's current fields, excluding history.
    ///
    /// Authorized for the administrator, the current holder, and
    /// principals with an active grant.
    pub fn view(
        &self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
    ) -> Result<EvidenceSummary, LedgerError> {
        let key = ResourceKey::derive(case_id, evidence_id);
        let record = self.existing(&key, case_id, evidence_id)?;
        self.authorize_read(caller, &key, record)?;
        Ok(record.summary())
    }

    /// The full custody history in append order. Same authorization as
    /// [`view()`](Self::view).
    pub fn history(
        &self,
        caller: &PrincipalId,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
    ) -> Result<Vec<CustodyEvent>, LedgerError> {
        let key = ResourceKey::derive(case_id, evidence_id);
        let record = self.existing(&key, case_id, evidence_id)?;
        self.authorize_read(caller, &key, record)?;
        Ok(record.history.clone())
    }

    /// Number of ever-registered records.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no records have been registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The `(case, evidence)` pair at `index` in registration order.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `index >= len()`.
    pub fn id_at(&self, index: usize) -> Result<(CaseId, EvidenceId), LedgerError> {
        let out_of_range = || LedgerError::OutOfRange {
            index,
            len: self.order.len(),
        };
        let key = self.order.get(index).ok_or_else(out_of_range)?;
        let record = self.records.get(key).ok_or_else(out_of_range)?;
        Ok((record.case_id.clone(), record.evidence_id.clone()))
    }

    /// Registered `(case, evidence)` pairs in registration order.
    pub fn ids(&self) -> impl Iterator<Item = (&CaseId, &EvidenceId)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.records.get(key))
            .map(|record| (&record.case_id, &record.evidence_id))
    }

    /// Drain buffered notifications in emission order.
    pub fn take_notifications(&mut self) -> Vec<LedgerNotification> {
        std::mem::take(&mut self.outbox)
    }

    // ─── Internal Helpers ────────────────────────────────────────────

    fn existing(
        &self,
        key: &ResourceKey,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
    ) -> Result<&EvidenceRecord, LedgerError> {
        self.records.get(key).ok_or_else(|| LedgerError::NotFound {
            case_id: case_id.clone(),
            evidence_id: evidence_id.clone(),
        })
    }

    fn existing_mut(
        &mut self,
        key: &ResourceKey,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
    ) -> Result<&mut EvidenceRecord, LedgerError> {
        self.records
            .get_mut(key)
            .ok_or_else(|| LedgerError::NotFound {
                case_id: case_id.clone(),
                evidence_id: evidence_id.clone(),
            })
    }

    fn require_live(
        record: &EvidenceRecord,
        case_id: &CaseId,
        evidence_id: &EvidenceId,
    ) -> Result<(), LedgerError> {
        if record.is_deleted() {
            return Err(LedgerError::AlreadyDeleted {
                case_id: case_id.clone(),
                evidence_id: evidence_id.clone(),
            });
        }
        Ok(())
    }

    fn authorize_read(
        &self,
        caller: &PrincipalId,
        key: &ResourceKey,
        record: &EvidenceRecord,
    ) -> Result<(), LedgerError> {
        if *caller == self.administrator || *caller == record.current_holder {
            return Ok(());
        }
        if self.table().query(key, caller) {
            return Ok(());
        }
        Err(LedgerError::NotAuthorized {
            caller: caller.clone(),
        })
    }

    /// Display name for the acting principal: the record's holder name
    /// when the actor is the holder, empty otherwise (the ledger tracks
    /// no names for other principals).
    fn actor_name(record: &EvidenceRecord, caller: &PrincipalId) -> String {
        if record.current_holder == *caller {
            record.current_holder_name.clone()
        } else {
            String::new()
        }
    }

    /// Reassemble a ledger from persisted parts (snapshot restore path).
    pub(crate) fn from_parts(
        administrator: PrincipalId,
        identity: PrincipalId,
        policy: LedgerPolicy,
        records: HashMap<ResourceKey, EvidenceRecord>,
        order: Vec<ResourceKey>,
        capabilities: CapabilityHandle,
    ) -> Self {
        Self {
            administrator,
            identity,
            policy,
            records,
            order,
            capabilities,
            outbox: Vec::new(),
        }
    }

    pub(crate) fn ordered_keys(&self) -> &[ResourceKey] {
        &self.order
    }

    pub(crate) fn record_by_key(&self, key: &ResourceKey) -> Option<&EvidenceRecord> {
        self.records.get(key)
    }

    /// Clone of the capability table state with its outbox cleared —
    /// notifications describe mutations already applied and are not part
    /// of persisted state.
    pub(crate) fn capability_table_state(&self) -> CapabilityTable {
        let mut table = self.table().clone();
        let _ = table.take_notifications();
        table
    }

    fn table(&self) -> RwLockReadGuard<'_, CapabilityTable> {
        self.capabilities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn table_mut(&self) -> RwLockWriteGuard<'_, CapabilityTable> {
        self.capabilities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(name: &str) -> PrincipalId {
        PrincipalId::new(name).unwrap()
    }

    fn case(id: &str) -> CaseId {
        CaseId::new(id).unwrap()
    }

    fn evidence(id: &str) -> EvidenceId {
        EvidenceId::new(id).unwrap()
    }

    fn intake(holder_name: &str) -> EvidenceIntake {
        EvidenceIntake {
            holder_name: holder_name.to_string(),
            description: "Hard drive".to_string(),
            content_ref: ContentRef::new("QmHash001").unwrap(),
            action: None,
        }
    }

    fn handoff_to(name: &str, display: &str) -> CustodyHandoff {
        CustodyHandoff {
            to: principal(name),
            to_name: display.to_string(),
            action: None,
            description: String::new(),
        }
    }

    fn ledger() -> EvidenceLedger {
        EvidenceLedger::new(principal("admin"))
    }

    fn register_c1e1(ledger: &mut EvidenceLedger, holder: &str, name: &str) {
        ledger
            .register(&principal(holder), &case("C1"), &evidence("E1"), intake(name))
            .unwrap();
    }

    // ── Registration ─────────────────────────────────────────────────

    #[test]
    fn test_register_caller_becomes_holder() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        let summary = l.view(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        assert_eq!(summary.current_holder, principal("alice"));
        assert_eq!(summary.current_holder_name, "Alice");
        assert!(!summary.deleted);
    }

    #[test]
    fn test_register_appends_collected_event() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        let history = l.history(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, CustodyAction::Collected);
        assert_eq!(history[0].holder, principal("alice"));
    }

    #[test]
    fn test_register_custom_initial_action() {
        let mut l = ledger();
        l.register(
            &principal("alice"),
            &case("C1"),
            &evidence("E1"),
            EvidenceIntake {
                action: Some(CustodyAction::Other("seized".into())),
                ..intake("Alice")
            },
        )
        .unwrap();
        let history = l.history(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        assert_eq!(history[0].action.as_str(), "seized");
    }

    #[test]
    fn test_duplicate_register_rejected_first_unchanged() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        let err = l
            .register(
                &principal("bob"),
                &case("C1"),
                &evidence("E1"),
                EvidenceIntake {
                    content_ref: ContentRef::new("QmOther").unwrap(),
                    ..intake("Bob")
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyExists { .. }));
        let summary = l.view(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        assert_eq!(summary.current_holder, principal("alice"));
        assert_eq!(summary.content_ref.as_str(), "QmHash001");
        assert_eq!(l.len(), 1);
    }

    // ── Transfer ─────────────────────────────────────────────────────

    #[test]
    fn test_transfer_updates_holder() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.transfer(
            &principal("alice"),
            &case("C1"),
            &evidence("E1"),
            handoff_to("bob", "Bob"),
        )
        .unwrap();
        let summary = l.view(&principal("bob"), &case("C1"), &evidence("E1")).unwrap();
        assert_eq!(summary.current_holder, principal("bob"));
        assert_eq!(summary.current_holder_name, "Bob");
    }

    #[test]
    fn test_previous_holder_loses_access_after_transfer() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.transfer(
            &principal("alice"),
            &case("C1"),
            &evidence("E1"),
            handoff_to("bob", "Bob"),
        )
        .unwrap();
        // Alice was never granted a capability; holder identity no longer matches.
        let err = l.view(&principal("alice"), &case("C1"), &evidence("E1")).unwrap_err();
        assert!(matches!(err, LedgerError::NotAuthorized { .. }));
    }

    #[test]
    fn test_transfer_auto_grants_incoming_holder() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.transfer(
            &principal("alice"),
            &case("C1"),
            &evidence("E1"),
            handoff_to("bob", "Bob"),
        )
        .unwrap();
        let key = ResourceKey::derive(&case("C1"), &evidence("E1"));
        assert!(l.table().query(&key, &principal("bob")));
    }

    #[test]
    fn test_transfer_without_auto_grant_holder_still_reads() {
        let mut l = ledger().with_policy(LedgerPolicy {
            auto_grant_on_transfer: false,
            ..LedgerPolicy::default()
        });
        register_c1e1(&mut l, "alice", "Alice");
        l.transfer(
            &principal("alice"),
            &case("C1"),
            &evidence("E1"),
            handoff_to("bob", "Bob"),
        )
        .unwrap();
        let key = ResourceKey::derive(&case("C1"), &evidence("E1"));
        assert!(!l.table().query(&key, &principal("bob")));
        // Holder identity alone authorizes the read.
        assert!(l.view(&principal("bob"), &case("C1"), &evidence("E1")).is_ok());
    }

    #[test]
    fn test_transfer_by_non_holder_rejected() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        let err = l
            .transfer(
                &principal("bob"),
                &case("C1"),
                &evidence("E1"),
                handoff_to("bob", "Bob"),
            )
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::NotHolder {
                caller: principal("bob")
            }
        );
    }

    #[test]
    fn test_transfer_unknown_record_not_found() {
        let mut l = ledger();
        let err = l
            .transfer(
                &principal("alice"),
                &case("C1"),
                &evidence("E1"),
                handoff_to("bob", "Bob"),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    #[test]
    fn test_self_transfer_rejected_by_default() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        let err = l
            .transfer(
                &principal("alice"),
                &case("C1"),
                &evidence("E1"),
                handoff_to("alice", "Alice"),
            )
            .unwrap_err();
        assert_eq!(err, LedgerError::SelfTransfer);
    }

    #[test]
    fn test_self_transfer_allowed_when_policy_off() {
        let mut l = ledger().with_policy(LedgerPolicy {
            forbid_self_transfer: false,
            ..LedgerPolicy::default()
        });
        register_c1e1(&mut l, "alice", "Alice");
        assert!(l
            .transfer(
                &principal("alice"),
                &case("C1"),
                &evidence("E1"),
                handoff_to("alice", "Alice"),
            )
            .is_ok());
    }

    // ── Soft Deletion ────────────────────────────────────────────────

    #[test]
    fn test_soft_delete_by_holder() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.soft_delete(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        let summary = l.view(&principal("admin"), &case("C1"), &evidence("E1")).unwrap();
        assert!(summary.deleted);
    }

    #[test]
    fn test_soft_delete_by_administrator() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        assert!(l.soft_delete(&principal("admin"), &case("C1"), &evidence("E1")).is_ok());
    }

    #[test]
    fn test_soft_delete_by_stranger_rejected() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        let err = l
            .soft_delete(&principal("mallory"), &case("C1"), &evidence("E1"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotAuthorized { .. }));
    }

    #[test]
    fn test_second_delete_rejected() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.soft_delete(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        let err = l
            .soft_delete(&principal("alice"), &case("C1"), &evidence("E1"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyDeleted { .. }));
    }

    #[test]
    fn test_transfer_after_delete_rejected() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.soft_delete(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        let err = l
            .transfer(
                &principal("alice"),
                &case("C1"),
                &evidence("E1"),
                handoff_to("bob", "Bob"),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyDeleted { .. }));
    }

    // ── Grant / Revoke ───────────────────────────────────────────────

    #[test]
    fn test_grant_lets_principal_view_revoke_removes() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.grant_access(&principal("alice"), &case("C1"), &evidence("E1"), principal("carol"))
            .unwrap();
        assert!(l.view(&principal("carol"), &case("C1"), &evidence("E1")).is_ok());
        assert!(l.history(&principal("carol"), &case("C1"), &evidence("E1")).is_ok());

        l.revoke_access(&principal("alice"), &case("C1"), &evidence("E1"), principal("carol"))
            .unwrap();
        let err = l.view(&principal("carol"), &case("C1"), &evidence("E1")).unwrap_err();
        assert!(matches!(err, LedgerError::NotAuthorized { .. }));
    }

    #[test]
    fn test_grant_by_administrator() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        assert!(l
            .grant_access(&principal("admin"), &case("C1"), &evidence("E1"), principal("carol"))
            .is_ok());
    }

    #[test]
    fn test_grant_by_stranger_rejected() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        let err = l
            .grant_access(&principal("mallory"), &case("C1"), &evidence("E1"), principal("mallory"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotAuthorized { .. }));
    }

    #[test]
    fn test_repeat_grant_logs_audit_without_roster_duplicate() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.grant_access(&principal("alice"), &case("C1"), &evidence("E1"), principal("carol"))
            .unwrap();
        l.grant_access(&principal("alice"), &case("C1"), &evidence("E1"), principal("carol"))
            .unwrap();
        let history = l.history(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        let grants = history
            .iter()
            .filter(|e| e.action == CustodyAction::AccessGranted)
            .count();
        assert_eq!(grants, 2);
        let key = ResourceKey::derive(&case("C1"), &evidence("E1"));
        assert_eq!(l.table().grantees(&key).len(), 1);
    }

    #[test]
    fn test_post_delete_grant_allowed_by_default() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.soft_delete(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        assert!(l
            .grant_access(&principal("alice"), &case("C1"), &evidence("E1"), principal("carol"))
            .is_ok());
        assert!(l.view(&principal("carol"), &case("C1"), &evidence("E1")).is_ok());
    }

    #[test]
    fn test_post_delete_grant_blocked_by_strict_policy() {
        let mut l = ledger().with_policy(LedgerPolicy {
            allow_access_changes_after_delete: false,
            ..LedgerPolicy::default()
        });
        register_c1e1(&mut l, "alice", "Alice");
        l.soft_delete(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        let err = l
            .grant_access(&principal("alice"), &case("C1"), &evidence("E1"), principal("carol"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyDeleted { .. }));
    }

    // ── Read Authorization ───────────────────────────────────────────

    #[test]
    fn test_stranger_cannot_view_or_read_history() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        assert!(matches!(
            l.view(&principal("mallory"), &case("C1"), &evidence("E1")).unwrap_err(),
            LedgerError::NotAuthorized { .. }
        ));
        assert!(matches!(
            l.history(&principal("mallory"), &case("C1"), &evidence("E1")).unwrap_err(),
            LedgerError::NotAuthorized { .. }
        ));
    }

    #[test]
    fn test_administrator_views_everything() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        assert!(l.view(&principal("admin"), &case("C1"), &evidence("E1")).is_ok());
        assert!(l.history(&principal("admin"), &case("C1"), &evidence("E1")).is_ok());
    }

    #[test]
    fn test_view_unknown_record_not_found() {
        let l = ledger();
        assert!(matches!(
            l.view(&principal("admin"), &case("C1"), &evidence("E1")).unwrap_err(),
            LedgerError::NotFound { .. }
        ));
    }

    // ── Audit Completeness ───────────────────────────────────────────

    #[test]
    fn test_history_matches_successful_mutations_in_order() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.transfer(
            &principal("alice"),
            &case("C1"),
            &evidence("E1"),
            handoff_to("bob", "Bob"),
        )
        .unwrap();
        l.grant_access(&principal("bob"), &case("C1"), &evidence("E1"), principal("carol"))
            .unwrap();
        l.revoke_access(&principal("bob"), &case("C1"), &evidence("E1"), principal("carol"))
            .unwrap();
        // A rejected call must not append.
        let _ = l.transfer(
            &principal("alice"),
            &case("C1"),
            &evidence("E1"),
            handoff_to("alice", "Alice"),
        );
        l.soft_delete(&principal("bob"), &case("C1"), &evidence("E1")).unwrap();

        let history = l.history(&principal("admin"), &case("C1"), &evidence("E1")).unwrap();
        let actions: Vec<&str> = history.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(
            actions,
            vec!["collected", "transferred", "grant", "revoke", "deleted"]
        );
    }

    // ── Enumeration ──────────────────────────────────────────────────

    #[test]
    fn test_enumeration_in_registration_order() {
        let mut l = ledger();
        for (c, e) in [("C1", "E1"), ("C1", "E2"), ("C2", "E1")] {
            l.register(&principal("alice"), &case(c), &evidence(e), intake("Alice"))
                .unwrap();
        }
        assert_eq!(l.len(), 3);
        assert!(!l.is_empty());
        assert_eq!(l.id_at(0).unwrap(), (case("C1"), evidence("E1")));
        assert_eq!(l.id_at(2).unwrap(), (case("C2"), evidence("E1")));
        let ids: Vec<_> = l.ids().map(|(c, e)| (c.clone(), e.clone())).collect();
        assert_eq!(ids[1], (case("C1"), evidence("E2")));
    }

    #[test]
    fn test_id_at_out_of_range() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        assert_eq!(
            l.id_at(1).unwrap_err(),
            LedgerError::OutOfRange { index: 1, len: 1 }
        );
    }

    #[test]
    fn test_deleted_records_stay_enumerable() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.soft_delete(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        assert_eq!(l.len(), 1);
        assert!(l.id_at(0).is_ok());
    }

    // ── Notifications ────────────────────────────────────────────────

    #[test]
    fn test_notifications_emitted_once_in_order() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.transfer(
            &principal("alice"),
            &case("C1"),
            &evidence("E1"),
            handoff_to("bob", "Bob"),
        )
        .unwrap();
        l.soft_delete(&principal("bob"), &case("C1"), &evidence("E1")).unwrap();

        let notes = l.take_notifications();
        assert_eq!(notes.len(), 3);
        assert!(matches!(notes[0], LedgerNotification::EvidenceRegistered { .. }));
        assert!(matches!(notes[1], LedgerNotification::EvidenceTransferred { .. }));
        assert!(matches!(notes[2], LedgerNotification::EvidenceDeleted { .. }));
        assert!(l.take_notifications().is_empty());
    }

    #[test]
    fn test_rejected_calls_emit_no_notifications() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        let _ = l.take_notifications();
        let _ = l.soft_delete(&principal("mallory"), &case("C1"), &evidence("E1"));
        let _ = l.view(&principal("mallory"), &case("C1"), &evidence("E1"));
        assert!(l.take_notifications().is_empty());
    }

    // ── Capability Table Wiring ──────────────────────────────────────

    #[test]
    fn test_table_administrator_is_ledger_identity() {
        let l = ledger();
        assert_eq!(l.table().administrator(), l.identity());
    }

    #[test]
    fn test_injected_table_with_foreign_admin_fails_atomically() {
        let foreign = Arc::new(RwLock::new(CapabilityTable::new(principal("someone-else"))));
        let mut l = ledger().with_capability_table(foreign);
        register_c1e1(&mut l, "alice", "Alice");
        let _ = l.take_notifications();
        let err = l
            .transfer(
                &principal("alice"),
                &case("C1"),
                &evidence("E1"),
                handoff_to("bob", "Bob"),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::Capability(_)));
        // Rejected auto-grant left the record untouched.
        let summary = l.view(&principal("alice"), &case("C1"), &evidence("E1")).unwrap();
        assert_eq!(summary.current_holder, principal("alice"));
        assert_eq!(
            l.history(&principal("alice"), &case("C1"), &evidence("E1")).unwrap().len(),
            1
        );
        assert!(l.take_notifications().is_empty());
    }

    #[test]
    fn test_external_handle_sees_ledger_grants() {
        let mut l = ledger();
        register_c1e1(&mut l, "alice", "Alice");
        l.grant_access(&principal("alice"), &case("C1"), &evidence("E1"), principal("carol"))
            .unwrap();
        let handle = l.capability_table();
        let key = ResourceKey::derive(&case("C1"), &evidence("E1"));
        let table = handle.read().unwrap();
        assert!(table.query(&key, &principal("carol")));
    }
}
