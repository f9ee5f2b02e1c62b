//! # Resource Keys — Deterministic Custody Join Keys
//!
//! Defines `ResourceKey`, the fixed-width identifier that joins the
//! evidence ledger and the capability table. A key is the SHA-256 digest
//! of the canonicalized `(case_id, evidence_id)` pair.
//!
//! ## Security Invariant
//!
//! Keys can only be derived through [`ResourceKey::derive()`], which feeds
//! `CanonicalBytes` into SHA-256. The pair is encoded as a canonical JSON
//! array, so field boundaries survive: `("ab", "c")` and `("a", "bc")`
//! hash different byte sequences even though their raw concatenations
//! collide.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::identity::{CaseId, EvidenceId};

/// A 32-byte key joining evidence records and capability grants.
///
/// Serializes as a lowercase hex string, so it can key JSON maps directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey([u8; 32]);

impl ResourceKey {
    /// Derive the key for a `(case, evidence)` identity pair.
    ///
    /// Deterministic: identical pairs always yield the same key. The
    /// canonicalization of two validated non-empty strings cannot fail,
    /// so this is infallible.
    pub fn derive(case_id: &CaseId, evidence_id: &EvidenceId) -> Self {
        let pair = (case_id.as_str(), evidence_id.as_str());
        let canonical = CanonicalBytes::new(&pair)
            .unwrap_or_else(|_| unreachable!("string pairs always canonicalize"));
        let hash = Sha256::digest(canonical.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    /// Construct a key from raw digest bytes.
    ///
    /// Prefer [`ResourceKey::derive()`]; this exists for callers
    /// reconstructing a key they already hold in digest form.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Access the raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a key from a 64-character lowercase hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != 64 {
            return None;
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hi = (chunk[0] as char).to_digit(16)?;
            let lo = (chunk[1] as char).to_digit(16)?;
            bytes[i] = ((hi << 4) | lo) as u8;
        }
        Some(Self::from_bytes(bytes))
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "key:{}", self.to_hex())
    }
}

impl Serialize for ResourceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ResourceKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ResourceKey::from_hex(&s)
            .ok_or_else(|| D::Error::custom(format!("invalid resource key hex: {s:?}")))
    }
}
