//! # Entity Kinds, Handles, and Discriminated References
//!
//! The seven registrable kinds are defined once, here. Everything that is
//! per-kind data — registration-code prefix, whether the credential is
//! scanned before completion, whether the kind is personnel — lives on
//! [`EntityKind`], so the workflow machine itself stays kind-agnostic.
//!
//! [`EntityHandle`] is the uniform `(kind, id)` reference used by reprint
//! requests and objections. [`ReprintSubject`] is the four-kind personnel
//! subset eligible for credential reprints; the "exactly one reference"
//! invariant of the storage layer is a non-issue in-process because the
//! sum type cannot express anything else.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::identity::RecordId;

// ─── Entity Kind ─────────────────────────────────────────────────────

/// The registrable entity kinds administered by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Temple (vihara).
    Temple,
    /// Communal monastic residence (arama).
    Arama,
    /// Shrine (devala).
    Devala,
    /// Ordained monk (bhikkhu).
    Monk,
    /// Ordained nun.
    Nun,
    /// High-ordination (upasampada) record.
    HighOrdinationMonk,
    /// Combined direct-high-ordination record.
    CombinedHighOrdinationMonk,
}

/// How a record of a given kind reaches `Completed` after printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionRoute {
    /// The printed credential is scanned back before completion.
    ViaScan,
    /// Completion follows printing directly; there is no scan step.
    DirectFromPrint,
}

impl EntityKind {
    /// All seven kinds, in queue-listing order.
    pub const ALL: [EntityKind; 7] = [
        Self::Temple,
        Self::Arama,
        Self::Devala,
        Self::Monk,
        Self::Nun,
        Self::HighOrdinationMonk,
        Self::CombinedHighOrdinationMonk,
    ];

    /// The registration-code prefix for this kind.
    pub fn code_prefix(&self) -> &'static str {
        match self {
            Self::Temple => "TRN",
            Self::Arama => "ARN",
            Self::Devala => "DVN",
            Self::Monk => "BH",
            Self::Nun => "BHN",
            Self::HighOrdinationMonk => "UPS",
            Self::CombinedHighOrdinationMonk => "UPC",
        }
    }

    /// How records of this kind reach `Completed`.
    ///
    /// High-ordination certificates are issued directly from the print
    /// run; every other credential is scanned back first.
    pub fn completion_route(&self) -> CompletionRoute {
        match self {
            Self::HighOrdinationMonk | Self::CombinedHighOrdinationMonk => {
                CompletionRoute::DirectFromPrint
            }
            Self::Temple | Self::Arama | Self::Devala | Self::Monk | Self::Nun => {
                CompletionRoute::ViaScan
            }
        }
    }

    /// Whether this kind is a person (identity-card holder) rather than
    /// an institution. Only personnel credentials can be reprinted.
    pub fn is_personnel(&self) -> bool {
        matches!(
            self,
            Self::Monk | Self::Nun | Self::HighOrdinationMonk | Self::CombinedHighOrdinationMonk
        )
    }

    /// The canonical snake_case name, used for table names and wire
    /// representations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temple => "temple",
            Self::Arama => "arama",
            Self::Devala => "devala",
            Self::Monk => "monk",
            Self::Nun => "nun",
            Self::HighOrdinationMonk => "high_ordination_monk",
            Self::CombinedHighOrdinationMonk => "combined_high_ordination_monk",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temple" => Ok(Self::Temple),
            "arama" => Ok(Self::Arama),
            "devala" => Ok(Self::Devala),
            "monk" => Ok(Self::Monk),
            "nun" => Ok(Self::Nun),
            "high_ordination_monk" => Ok(Self::HighOrdinationMonk),
            "combined_high_ordination_monk" => Ok(Self::CombinedHighOrdinationMonk),
            other => Err(RegistryError::validation(
                "entity_kind",
                format!("unknown entity kind {other:?}"),
            )),
        }
    }
}

// ─── Entity Handle ───────────────────────────────────────────────────

/// Uniform reference to one record of one kind.
///
/// A handle is only a name; whether it resolves to a live (non-deleted)
/// record is the registry's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    /// The referenced record's kind.
    pub kind: EntityKind,
    /// The referenced record's surrogate key.
    pub id: RecordId,
}

impl EntityHandle {
    /// Build a handle from its parts.
    pub fn new(kind: EntityKind, id: RecordId) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

// ─── Reprint Subject ─────────────────────────────────────────────────

/// The credential holder a reprint request refers to.
///
/// Exactly one of the four personnel kinds — the storage layer's
/// "exactly one reference is non-null" check constraint is this type's
/// image in SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReprintSubject {
    /// An ordained monk's identity card.
    Monk(RecordId),
    /// An ordained nun's identity card.
    Nun(RecordId),
    /// A high-ordination certificate.
    HighOrdinationMonk(RecordId),
    /// A combined direct-high-ordination certificate.
    CombinedHighOrdinationMonk(RecordId),
}

impl ReprintSubject {
    /// The uniform handle for the referenced record.
    pub fn handle(&self) -> EntityHandle {
        match *self {
            Self::Monk(id) => EntityHandle::new(EntityKind::Monk, id),
            Self::Nun(id) => EntityHandle::new(EntityKind::Nun, id),
            Self::HighOrdinationMonk(id) => EntityHandle::new(EntityKind::HighOrdinationMonk, id),
            Self::CombinedHighOrdinationMonk(id) => {
                EntityHandle::new(EntityKind::CombinedHighOrdinationMonk, id)
            }
        }
    }

    /// Build a subject from a handle, rejecting non-personnel kinds.
    pub fn from_handle(handle: EntityHandle) -> Result<Self, RegistryError> {
        match handle.kind {
            EntityKind::Monk => Ok(Self::Monk(handle.id)),
            EntityKind::Nun => Ok(Self::Nun(handle.id)),
            EntityKind::HighOrdinationMonk => Ok(Self::HighOrdinationMonk(handle.id)),
            EntityKind::CombinedHighOrdinationMonk => {
                Ok(Self::CombinedHighOrdinationMonk(handle.id))
            }
            other => Err(RegistryError::validation(
                "subject",
                format!("{other} credentials cannot be reprinted"),
            )),
        }
    }

    /// Build a subject from the nullable-reference shape used by callers
    /// and by the storage layer, enforcing the exactly-one invariant.
    ///
    /// # Errors
    ///
    /// Returns a validation error if zero or more than one reference is
    /// set.
    pub fn from_options(
        monk: Option<RecordId>,
        nun: Option<RecordId>,
        high_ordination_monk: Option<RecordId>,
        combined_high_ordination_monk: Option<RecordId>,
    ) -> Result<Self, RegistryError> {
        let mut subjects = Vec::with_capacity(1);
        if let Some(id) = monk {
            subjects.push(Self::Monk(id));
        }
        if let Some(id) = nun {
            subjects.push(Self::Nun(id));
        }
        if let Some(id) = high_ordination_monk {
            subjects.push(Self::HighOrdinationMonk(id));
        }
        if let Some(id) = combined_high_ordination_monk {
            subjects.push(Self::CombinedHighOrdinationMonk(id));
        }
        match subjects.as_slice() {
            [single] => Ok(*single),
            [] => Err(RegistryError::validation(
                "subject",
                "exactly one entity reference must be set, got none",
            )),
            many => Err(RegistryError::validation(
                "subject",
                format!(
                    "exactly one entity reference must be set, got {}",
                    many.len()
                ),
            )),
        }
    }
}

impl std::fmt::Display for ReprintSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_roundtrips_through_str() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(EntityKind::from_str("pagoda").is_err());
    }

    #[test]
    fn test_code_prefixes_are_distinct() {
        let mut prefixes: Vec<_> = EntityKind::ALL.iter().map(|k| k.code_prefix()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), EntityKind::ALL.len());
    }

    #[test]
    fn test_high_ordination_kinds_skip_scan() {
        assert_eq!(
            EntityKind::HighOrdinationMonk.completion_route(),
            CompletionRoute::DirectFromPrint
        );
        assert_eq!(
            EntityKind::CombinedHighOrdinationMonk.completion_route(),
            CompletionRoute::DirectFromPrint
        );
        assert_eq!(
            EntityKind::Temple.completion_route(),
            CompletionRoute::ViaScan
        );
        assert_eq!(EntityKind::Monk.completion_route(), CompletionRoute::ViaScan);
    }

    #[test]
    fn test_handle_display() {
        let handle = EntityHandle::new(EntityKind::Monk, RecordId(42));
        assert_eq!(handle.to_string(), "monk:42");
    }

    #[test]
    fn test_subject_from_options_exactly_one() {
        let subject =
            ReprintSubject::from_options(Some(RecordId(7)), None, None, None).unwrap();
        assert_eq!(subject, ReprintSubject::Monk(RecordId(7)));
    }

    #[test]
    fn test_subject_from_options_none_set() {
        let err = ReprintSubject::from_options(None, None, None, None).unwrap_err();
        assert!(matches!(err, RegistryError::Validation { .. }));
    }

    #[test]
    fn test_subject_from_options_two_set() {
        let err = ReprintSubject::from_options(
            Some(RecordId(1)),
            Some(RecordId(2)),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Validation { .. }));
    }

    #[test]
    fn test_subject_from_handle_rejects_institutions() {
        let err =
            ReprintSubject::from_handle(EntityHandle::new(EntityKind::Temple, RecordId(1)));
        assert!(err.is_err());
        let ok =
            ReprintSubject::from_handle(EntityHandle::new(EntityKind::Nun, RecordId(1)));
        assert_eq!(ok.unwrap(), ReprintSubject::Nun(RecordId(1)));
    }

    #[test]
    fn test_subject_handle_roundtrip() {
        let subject = ReprintSubject::CombinedHighOrdinationMonk(RecordId(9));
        assert_eq!(
            ReprintSubject::from_handle(subject.handle()).unwrap(),
            subject
        );
    }
}
