//! # Objection Type Catalogue
//!
//! Maps objection-type codes to the operations they block and the entity
//! kinds they apply to. Adding a type is a data change — new catalogue
//! entry, no engine change.
//!
//! ## Unknown codes
//!
//! Filing an objection requires a catalogued, applicable type. At
//! *query* time, however, an unrecognized code blocks nothing: a code
//! can only become unknown through catalogue drift (a type retired after
//! objections were filed), and failing closed would freeze unrelated
//! workflows on a data migration. This fail-open-for-unknown default is
//! deliberate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use sasana_core::{BlockedOperation, EntityKind, RegistryError};

/// Catalogue code of the built-in reprint restriction.
pub const REPRINT_RESTRICTION: &str = "REPRINT_RESTRICTION";

/// Catalogue code of the built-in residency restriction.
pub const RESIDENCY_RESTRICTION: &str = "RESIDENCY_RESTRICTION";

/// One catalogue entry: an objection type and its enforcement semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectionTypeDef {
    /// Stable code referenced by objection rows.
    pub code: String,
    /// Human-readable label.
    pub label: String,
    /// The operations an in-force objection of this type vetoes.
    pub blocks: Vec<BlockedOperation>,
    /// The entity kinds this type may be filed against.
    pub applies_to: Vec<EntityKind>,
}

/// The loaded catalogue, keyed by type code.
#[derive(Debug, Clone, Default)]
pub struct ObjectionCatalogue {
    types: HashMap<String, ObjectionTypeDef>,
}

impl ObjectionCatalogue {
    /// An empty catalogue. Nothing can be filed, nothing blocks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The catalogue shipped with the system: reprint restrictions on
    /// personnel credentials and residency restrictions on communal
    /// residences.
    pub fn builtin() -> Self {
        let mut catalogue = Self::empty();
        catalogue.register(ObjectionTypeDef {
            code: REPRINT_RESTRICTION.to_string(),
            label: "Restriction on credential reprints".to_string(),
            blocks: vec![BlockedOperation::ReprintApproval],
            applies_to: EntityKind::ALL
                .into_iter()
                .filter(EntityKind::is_personnel)
                .collect(),
        });
        catalogue.register(ObjectionTypeDef {
            code: RESIDENCY_RESTRICTION.to_string(),
            label: "Restriction on adding residents".to_string(),
            blocks: vec![BlockedOperation::AddResident],
            applies_to: vec![EntityKind::Arama],
        });
        catalogue
    }

    /// Register (or replace) a catalogue entry.
    pub fn register(&mut self, def: ObjectionTypeDef) {
        self.types.insert(def.code.clone(), def);
    }

    /// Look up an entry by code.
    pub fn get(&self, code: &str) -> Option<&ObjectionTypeDef> {
        self.types.get(code)
    }

    /// Whether an objection of type `code` blocks `operation`.
    ///
    /// Unknown codes block nothing (see module docs).
    pub fn blocks(&self, code: &str, operation: BlockedOperation) -> bool {
        self.types
            .get(code)
            .is_some_and(|def| def.blocks.contains(&operation))
    }

    /// Validate a filing: the type must be catalogued and must apply to
    /// the subject's kind.
    pub fn validate_filing(&self, code: &str, kind: EntityKind) -> Result<(), RegistryError> {
        let def = self.get(code).ok_or_else(|| {
            RegistryError::validation(
                "objection_type",
                format!("unknown objection type {code:?}"),
            )
        })?;
        if !def.applies_to.contains(&kind) {
            return Err(RegistryError::validation(
                "objection_type",
                format!("{code} does not apply to {kind} records"),
            ));
        }
        Ok(())
    }
}
