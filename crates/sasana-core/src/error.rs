//! # Error Types — Shared Registry Taxonomy
//!
//! One error enum covers every caller-correctable failure of the workflow,
//! reprint, and objection engines, plus a `Storage` variant for backend
//! faults. All variants use `thiserror` for derive-based `Display`.
//!
//! ## Design
//!
//! - `StaleVersion` is distinct from `InvalidTransition` so callers can
//!   re-read and retry contention without treating it as a logic error.
//! - `ObjectionBlocked` carries the objection's type, reason, and requester
//!   so the caller can present the block instead of a generic failure.
//! - Transitions never fail silently; an illegal transition is always an
//!   explicit error, never a no-op success.

use thiserror::Error;

/// Top-level error type for the Sasana Registry Stack.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Malformed input or violated structural invariant.
    #[error("validation error on `{field}`: {message}")]
    Validation {
        /// The field or input that failed validation.
        field: String,
        /// Human-readable description of the violation.
        message: String,
    },

    /// Requested transition is not legal from the current state.
    #[error("invalid transition for {entity}: {from} -> {to}")]
    InvalidTransition {
        /// The record the transition was attempted on.
        entity: String,
        /// Current state name.
        from: String,
        /// Attempted target state name.
        to: String,
    },

    /// Optimistic-concurrency conflict: the caller's version token is stale.
    #[error("stale version: caller read {expected}, store holds {actual}")]
    StaleVersion {
        /// The version the caller presented.
        expected: u64,
        /// The version currently stored.
        actual: u64,
    },

    /// Transition is structurally legal but a required prior field is
    /// missing or inconsistent.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// Transition vetoed by an in-force objection.
    #[error("blocked by objection {objection_type}: {reason} (raised by {requester})")]
    ObjectionBlocked {
        /// Catalogue code of the objection type.
        objection_type: String,
        /// The objection's stated grounds.
        reason: String,
        /// Free-text identity of the objecting party.
        requester: String,
    },

    /// A referenced entity handle does not resolve to a live record.
    #[error("referential integrity error: {0}")]
    ReferentialIntegrity(String),

    /// Backend fault (store unavailability, corrupt row). Not part of the
    /// caller-correctable contract; maps to a 5xx at the API boundary.
    #[error("storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Shorthand for a field-level validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error is correctable by the caller (4xx-class).
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}
