//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers of the registry stack. These
//! prevent accidental identifier confusion — you cannot pass a
//! `ReprintId` where an `ObjectionId` is expected, or a registration
//! code where an opaque document reference is expected.
//!
//! Registrable records use store-assigned `i64` surrogate keys
//! ([`RecordId`]) because administrator queues are ordered by ascending
//! identity. Reprint requests and objections are never ordered by id and
//! use random UUIDs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RegistryError;

/// Store-assigned surrogate key of a registrable record.
///
/// Assigned by the storage backend on insert; `RecordId(0)` is the
/// conventional "not yet persisted" placeholder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct RecordId(pub i64);

/// Unique identifier for a reprint request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReprintId(pub Uuid);

/// Unique identifier for an objection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectionId(pub Uuid);

impl ReprintId {
    /// Generate a new random reprint identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReprintId {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectionId {
    /// Generate a new random objection identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for ReprintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "reprint:{}", self.0)
    }
}

impl std::fmt::Display for ObjectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "objection:{}", self.0)
    }
}

// ─── Registration Code ───────────────────────────────────────────────

/// Externally visible, human-meaningful registration code.
///
/// Format: two to four uppercase ASCII letters (the per-kind prefix)
/// followed by at least six ASCII digits, e.g. `BH2026000123` or
/// `TRN0000099`. Uniqueness among non-deleted records of the same kind is
/// enforced by the storage backend at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationCode(String);

impl RegistrationCode {
    /// Validate and wrap a registration code.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the code does not match the
    /// prefix-then-digits convention.
    pub fn new(code: impl Into<String>) -> Result<Self, RegistryError> {
        let code = code.into();
        let prefix_len = code.chars().take_while(|c| c.is_ascii_uppercase()).count();
        let digit_len = code[prefix_len..].len();
        let all_digits = code[prefix_len..].chars().all(|c| c.is_ascii_digit());
        if !(2..=4).contains(&prefix_len) || digit_len < 6 || !all_digits {
            return Err(RegistryError::validation(
                "registration_code",
                format!("{code:?} does not match <PREFIX><digits> convention"),
            ));
        }
        Ok(Self(code))
    }

    /// Compose a code from a kind prefix, year, and zero-padded sequence,
    /// e.g. `compose("BH", 2026, 123)` → `BH2026000123`.
    pub fn compose(prefix: &str, year: i32, sequence: u32) -> Result<Self, RegistryError> {
        Self::new(format!("{prefix}{year}{sequence:06}"))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegistrationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Document Reference ──────────────────────────────────────────────

/// Opaque reference to a stored document, owned by the external document
/// storage collaborator. The engine stores and forwards it, never
/// inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef(String);

impl DocumentRef {
    /// Wrap a non-empty document reference.
    pub fn new(reference: impl Into<String>) -> Result<Self, RegistryError> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(RegistryError::validation(
                "document_ref",
                "must not be empty",
            ));
        }
        Ok(Self(reference))
    }

    /// The reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
