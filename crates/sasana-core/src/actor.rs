//! # Actor Context
//!
//! Every engine operation receives the acting administrator explicitly —
//! there is no ambient "current user". The identity/role collaborator
//! authenticates the actor; the engine records the identifier it is
//! given and trusts role-to-operation authorization as an input
//! precondition.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::temporal::Timestamp;

/// Authenticated actor identifier, as supplied by the identity
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    /// Wrap a non-empty actor identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, RegistryError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RegistryError::validation("actor", "must not be empty"));
        }
        Ok(Self(id))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The acting administrator plus the administrative jurisdiction they
/// operate from (used for visibility scoping at creation time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// Who is acting.
    pub actor: ActorId,
    /// The creating actor's administrative jurisdiction, if known.
    pub location: Option<String>,
}

impl ActorContext {
    /// Context with no jurisdiction attached.
    pub fn new(actor: ActorId) -> Self {
        Self {
            actor,
            location: None,
        }
    }

    /// Attach an administrative jurisdiction.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// A who/when pair recorded for each terminal workflow action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorStamp {
    /// The actor who performed the action.
    pub by: ActorId,
    /// When the action was performed (UTC).
    pub at: Timestamp,
}

impl ActorStamp {
    /// Stamp an action by `actor` at `at`.
    pub fn new(by: ActorId, at: Timestamp) -> Self {
        Self { by, at }
    }
}
