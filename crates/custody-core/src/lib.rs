//! # custody-core — Foundational Types for the Custody Stack
//!
//! This crate is the bedrock of the Custody Stack. It defines the
//! type-system primitives the evidence ledger is built on; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `CaseId`, `EvidenceId`,
//!    `PrincipalId`, `ContentRef` — all newtypes with validated
//!    constructors. No bare strings for identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** ALL key derivation flows through
//!    `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for digests.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision.
//!
//! 4. **`ResourceKey::derive()` accepts only validated identifiers.**
//!    The join key between ledger and capability state cannot be computed
//!    from unvalidated input.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `custody-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod canonical;
pub mod error;
pub mod identity;
pub mod resource;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use error::{CanonicalizationError, CoreError};
pub use identity::{CaseId, ContentRef, EvidenceId, PrincipalId};
pub use resource::ResourceKey;
pub use temporal::Timestamp;
