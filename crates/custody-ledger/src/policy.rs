//! # Ledger Policy
//!
//! The custody lifecycle has a few behaviors that differ between
//! deployments. They are explicit configuration on the ledger rather than
//! hard-coded choices, so a deployment states what it runs with and tests
//! can exercise both sides.

use serde::{Deserialize, Serialize};

/// Configurable behaviors of the evidence ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPolicy {
    /// Assign the incoming holder's read capability as part of every
    /// transfer, so the current holder always has read access without a
    /// separate admin action.
    pub auto_grant_on_transfer: bool,
    /// Reject transfers whose target is the current holder.
    pub forbid_self_transfer: bool,
    /// Permit grant/revoke on a soft-deleted record. The record itself
    /// stays immutable either way; this only controls whether the access
    /// audit trail remains appendable after deletion.
    pub allow_access_changes_after_delete: bool,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            auto_grant_on_transfer: true,
            forbid_self_transfer: true,
            allow_access_changes_after_delete: true,
        }
    }
}
