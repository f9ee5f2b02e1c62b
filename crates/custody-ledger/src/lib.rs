//! # custody-ledger — Evidence Chain-of-Custody Ledger
//!
//! Tracks custody of discrete evidence records through their lifecycle —
//! registration, transfer between holders, soft deletion — while enforcing
//! a capability-based access-control model: only the current holder, the
//! administrator, or an explicitly granted principal may view a record or
//! its history.
//!
//! ## Components
//!
//! - **[`EvidenceLedger`]** (`ledger.rs`): owns evidence records and their
//!   append-only custody history; validates holder identity on every
//!   mutating call; consults the capability table to authorize reads.
//!
//! - **[`CapabilityTable`]** (`capability.rs`): owns the grant relation
//!   `(resource key, principal) → bool`, gated by an administrator
//!   principal. The ledger's constructor wires the table's administrator
//!   to the ledger's own service identity so transfers can provision the
//!   incoming holder's read grant automatically.
//!
//! - **[`CustodyService`]** (`service.rs`): thread-safe facade that
//!   serializes mutations the way the reference execution environment
//!   does.
//!
//! ## Design
//!
//! The two components are loosely coupled through [`ResourceKey`]
//! (re-exported from `custody-core`), the SHA-256 derivation of the
//! `(case, evidence)` identity pair. Records and grants live in two flat
//! tables joined only by that key. Caller identity is an explicit
//! parameter of every operation — there is no ambient "current caller" —
//! and every rejected call surfaces a specific [`LedgerError`] kind with
//! zero observable side effects.

pub mod capability;
pub mod error;
pub mod event;
pub mod ledger;
pub mod notify;
pub mod policy;
pub mod record;
pub mod service;
pub mod snapshot;

// ─── Ledger re-exports ──────────────────────────────────────────────

pub use ledger::{CapabilityHandle, CustodyHandoff, EvidenceIntake, EvidenceLedger};

// ─── Capability re-exports ──────────────────────────────────────────

pub use capability::{CapabilityTable, ResourceGrants};

// ─── Event and record re-exports ────────────────────────────────────

pub use event::{CustodyAction, CustodyEvent};
pub use record::{EvidenceRecord, EvidenceSummary};

// ─── Policy, notifications, errors ──────────────────────────────────

pub use error::{CapabilityError, LedgerError};
pub use notify::{AccessNotification, LedgerNotification};
pub use policy::LedgerPolicy;

// ─── Service and persistence re-exports ─────────────────────────────

pub use service::CustodyService;
pub use snapshot::LedgerSnapshot;

// Re-export the join key for callers that query the capability table
// directly.
pub use custody_core::ResourceKey;
