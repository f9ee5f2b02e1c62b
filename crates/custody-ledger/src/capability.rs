//! # Capability Table
//!
//! Sole owner of the read-grant relation `(resource key, principal) →
//! granted`. All writes are gated by a single administrator principal,
//! which can itself be reassigned; reads are unrestricted.
//!
//! The relation is a flat table keyed by resource key. Each entry keeps
//! the boolean flags alongside an ordered roster of every principal ever
//! granted, because a boolean map alone cannot be enumerated. Revocation
//! flips the flag false but never removes the principal from the roster.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use custody_core::{PrincipalId, ResourceKey, Timestamp};

use crate::error::CapabilityError;
use crate::notify::AccessNotification;

// ─── Grant Storage ───────────────────────────────────────────────────

/// Grant state for one resource key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGrants {
    /// Current grant flag per principal.
    flags: HashMap<PrincipalId, bool>,
    /// Every principal ever granted, in first-grant order.
    roster: Vec<PrincipalId>,
}

impl ResourceGrants {
    /// Current grant state for a principal (false when never granted).
    pub fn is_granted(&self, principal: &PrincipalId) -> bool {
        self.flags.get(principal).copied().unwrap_or(false)
    }

    /// Ordered enumeration of every principal ever granted.
    pub fn roster(&self) -> &[PrincipalId] {
        &self.roster
    }
}

// ─── Capability Table ────────────────────────────────────────────────

/// Administrator-gated table of read grants, queried by the evidence
/// ledger (and by external callers) to authorize views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityTable {
    administrator: PrincipalId,
    grants: HashMap<ResourceKey, ResourceGrants>,
    #[serde(skip, default)]
    outbox: Vec<AccessNotification>,
}

impl CapabilityTable {
    /// Create an empty table owned by `administrator`.
    pub fn new(administrator: PrincipalId) -> Self {
        Self {
            administrator,
            grants: HashMap::new(),
            outbox: Vec::new(),
        }
    }

    /// The current administrator.
    pub fn administrator(&self) -> &PrincipalId {
        &self.administrator
    }

    /// Replace the administrator. Current-admin-only; atomic.
    ///
    /// Used once at bootstrap to delegate administration to the evidence
    /// ledger's own identity, so custody transfers can provision grants
    /// without a separate admin action.
    pub fn set_administrator(
        &mut self,
        caller: &PrincipalId,
        new_admin: PrincipalId,
    ) -> Result<(), CapabilityError> {
        self.require_admin(caller)?;
        info!(old = %self.administrator, new = %new_admin, "capability administrator replaced");
        self.administrator = new_admin;
        Ok(())
    }

    /// Set the grant `(key, principal) → true`. Administrator-only.
    ///
    /// Idempotent state-wise: assigning an already-granted principal
    /// changes nothing but still emits an `AccessAssigned` notification.
    /// The roster never gains duplicates.
    pub fn assign(
        &mut self,
        caller: &PrincipalId,
        key: ResourceKey,
        principal: PrincipalId,
    ) -> Result<(), CapabilityError> {
        self.require_admin(caller)?;
        let entry = self.grants.entry(key).or_default();
        if !entry.flags.contains_key(&principal) {
            entry.roster.push(principal.clone());
        }
        entry.flags.insert(principal.clone(), true);
        info!(key = %key, principal = %principal, "access assigned");
        self.outbox.push(AccessNotification::AccessAssigned {
            key,
            principal,
            timestamp: Timestamp::now(),
        });
        Ok(())
    }

    /// Set the grant `(key, principal) → false`. Administrator-only.
    ///
    /// The principal stays on the roster: "who was ever granted" is
    /// preserved. Revoking a never-granted principal records a false flag
    /// without touching the roster.
    pub fn revoke(
        &mut self,
        caller: &PrincipalId,
        key: ResourceKey,
        principal: PrincipalId,
    ) -> Result<(), CapabilityError> {
        self.require_admin(caller)?;
        self.grants
            .entry(key)
            .or_default()
            .flags
            .insert(principal.clone(), false);
        info!(key = %key, principal = %principal, "access revoked");
        self.outbox.push(AccessNotification::AccessRevoked {
            key,
            principal,
            timestamp: Timestamp::now(),
        });
        Ok(())
    }

    /// Current grant state for `(key, principal)`. Unrestricted read;
    /// false for unknown pairs.
    pub fn query(&self, key: &ResourceKey, principal: &PrincipalId) -> bool {
        self.grants
            .get(key)
            .map(|entry| entry.is_granted(principal))
            .unwrap_or(false)
    }

    /// Ordered enumeration of every principal ever granted for `key`.
    pub fn grantees(&self, key: &ResourceKey) -> &[PrincipalId] {
        self.grants
            .get(key)
            .map(|entry| entry.roster())
            .unwrap_or(&[])
    }

    /// Drain buffered notifications in emission order.
    pub fn take_notifications(&mut self) -> Vec<AccessNotification> {
        std::mem::take(&mut self.outbox)
    }

    fn require_admin(&self, caller: &PrincipalId) -> Result<(), CapabilityError> {
        if caller != &self.administrator {
            return Err(CapabilityError::NotAdmin {
                caller: caller.clone(),
            });
        }
        Ok(())
    }
}
