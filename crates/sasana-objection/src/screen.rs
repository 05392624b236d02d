//! # Objection Screen
//!
//! The pure query the workflow engines consult before a blockable
//! transition: given the catalogue and the objections on file for an
//! entity, is anything in force against this operation right now?

use sasana_core::{
    BlockedOperation, EntityHandle, ObjectionGate, ObjectionNotice, Timestamp,
};

use crate::catalogue::ObjectionCatalogue;
use crate::objection::Objection;

/// An [`ObjectionGate`] over a set of objections.
///
/// Borrowed views only — the registry service loads the objections for
/// the entity under transition and screens them in the same unit of
/// work.
#[derive(Debug, Clone, Copy)]
pub struct ObjectionScreen<'a> {
    catalogue: &'a ObjectionCatalogue,
    objections: &'a [Objection],
}

impl<'a> ObjectionScreen<'a> {
    /// Build a screen over `objections` using `catalogue` semantics.
    pub fn new(catalogue: &'a ObjectionCatalogue, objections: &'a [Objection]) -> Self {
        Self {
            catalogue,
            objections,
        }
    }
}

impl ObjectionGate for ObjectionScreen<'_> {
    fn blocking(
        &self,
        subject: EntityHandle,
        operation: BlockedOperation,
        at: Timestamp,
    ) -> Option<ObjectionNotice> {
        self.objections
            .iter()
            .filter(|o| o.subject == subject)
            .filter(|o| self.catalogue.blocks(&o.objection_type, operation))
            .find(|o| o.in_force_at(at))
            .map(|o| ObjectionNotice {
                objection_type: o.objection_type.clone(),
                reason: o.grounds.clone(),
                requester: o.requester_name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{ObjectionCatalogue, REPRINT_RESTRICTION, RESIDENCY_RESTRICTION};
    use sasana_core::{ActorContext, ActorId, EntityKind, RecordId};

    fn actor(name: &str) -> ActorId {
        ActorId::new(name).unwrap()
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn approved_objection(subject: EntityHandle, code: &str) -> Objection {
        let mut obj = Objection::file(
            subject,
            code,
            "ownership dispute pending",
            "W. Silva",
            None,
            Some(ts("2026-01-01T00:00:00Z")),
            None,
            ActorContext::new(actor("clerk")),
            ts("2025-12-20T00:00:00Z"),
        )
        .unwrap();
        obj.approve(actor("U1"), ts("2025-12-21T00:00:00Z")).unwrap();
        obj
    }

    #[test]
    fn test_blocks_matching_subject_and_operation() {
        let catalogue = ObjectionCatalogue::builtin();
        let monk = EntityHandle::new(EntityKind::Monk, RecordId(7));
        let objections = vec![approved_objection(monk, REPRINT_RESTRICTION)];
        let screen = ObjectionScreen::new(&catalogue, &objections);

        let notice = screen
            .blocking(monk, BlockedOperation::ReprintApproval, ts("2026-02-01T00:00:00Z"))
            .expect("should block");
        assert_eq!(notice.objection_type, REPRINT_RESTRICTION);
        assert_eq!(notice.reason, "ownership dispute pending");
        assert_eq!(notice.requester, "W. Silva");
    }

    #[test]
    fn test_no_cross_entity_leakage() {
        let catalogue = ObjectionCatalogue::builtin();
        let monk = EntityHandle::new(EntityKind::Monk, RecordId(7));
        let other_monk = EntityHandle::new(EntityKind::Monk, RecordId(8));
        let objections = vec![approved_objection(monk, REPRINT_RESTRICTION)];
        let screen = ObjectionScreen::new(&catalogue, &objections);

        assert!(screen
            .blocking(
                other_monk,
                BlockedOperation::ReprintApproval,
                ts("2026-02-01T00:00:00Z")
            )
            .is_none());
    }

    #[test]
    fn test_operation_must_match_catalogue_entry() {
        let catalogue = ObjectionCatalogue::builtin();
        let arama = EntityHandle::new(EntityKind::Arama, RecordId(3));
        let objections = vec![approved_objection(arama, RESIDENCY_RESTRICTION)];
        let screen = ObjectionScreen::new(&catalogue, &objections);

        assert!(screen
            .blocking(arama, BlockedOperation::AddResident, ts("2026-02-01T00:00:00Z"))
            .is_some());
        assert!(screen
            .blocking(
                arama,
                BlockedOperation::ReprintApproval,
                ts("2026-02-01T00:00:00Z")
            )
            .is_none());
    }

    #[test]
    fn test_expired_objection_does_not_block() {
        let catalogue = ObjectionCatalogue::builtin();
        let monk = EntityHandle::new(EntityKind::Monk, RecordId(7));
        let mut obj = approved_objection(monk, REPRINT_RESTRICTION);
        obj.valid_until = Some(ts("2026-03-01T00:00:00Z"));
        let objections = vec![obj];
        let screen = ObjectionScreen::new(&catalogue, &objections);

        assert!(screen
            .blocking(monk, BlockedOperation::ReprintApproval, ts("2026-02-28T23:59:59Z"))
            .is_some());
        assert!(screen
            .blocking(monk, BlockedOperation::ReprintApproval, ts("2026-03-01T00:00:00Z"))
            .is_none());
    }

    #[test]
    fn test_unknown_code_on_file_blocks_nothing() {
        let catalogue = ObjectionCatalogue::builtin();
        let monk = EntityHandle::new(EntityKind::Monk, RecordId(7));
        // a type retired from the catalogue after this objection was filed
        let objections = vec![approved_objection(monk, "ORDINATION_FREEZE")];
        let screen = ObjectionScreen::new(&catalogue, &objections);

        assert!(screen
            .blocking(monk, BlockedOperation::ReprintApproval, ts("2026-02-01T00:00:00Z"))
            .is_none());
    }
}
