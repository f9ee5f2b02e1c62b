//! # Custody Events — Append-Only Audit Entries
//!
//! Every successful mutation of an evidence record appends exactly one
//! `CustodyEvent` to that record's history. Entries are immutable once
//! appended; their order is append order. Timestamps are informational —
//! consumers must not assume strict timestamp monotonicity across entries.

use serde::{Deserialize, Serialize};

use custody_core::{PrincipalId, Timestamp};

// ─── Custody Action ──────────────────────────────────────────────────

/// The action recorded by a custody event.
///
/// A small open vocabulary: the closed variants cover the ledger's own
/// lifecycle, and `Other` carries operator-supplied labels (e.g.
/// "sealed", "analyzed") without widening the enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustodyAction {
    /// Evidence taken into custody at registration.
    Collected,
    /// Custody handed to a new holder.
    Transferred,
    /// Record soft-deleted.
    Deleted,
    /// Read capability granted to a principal.
    AccessGranted,
    /// Read capability revoked from a principal.
    AccessRevoked,
    /// Operator-supplied action label.
    Other(String),
}

impl CustodyAction {
    /// The wire label for this action.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Collected => "collected",
            Self::Transferred => "transferred",
            Self::Deleted => "deleted",
            Self::AccessGranted => "grant",
            Self::AccessRevoked => "revoke",
            Self::Other(label) => label,
        }
    }
}

impl std::fmt::Display for CustodyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Custody Event ───────────────────────────────────────────────────

/// One immutable audit entry describing an action taken on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyEvent {
    /// The holder at the time the event was appended. For transfers this
    /// is the incoming holder.
    pub holder: PrincipalId,
    /// Display label of the holder.
    pub holder_name: String,
    /// What happened.
    pub action: CustodyAction,
    /// Free-form description supplied by the caller.
    pub description: String,
    /// When the event was appended.
    pub timestamp: Timestamp,
}

impl std::fmt::Display for CustodyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} by {} ({}): {}",
            self.timestamp, self.action, self.holder, self.holder_name, self.description
        )
    }
}
