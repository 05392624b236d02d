//! # Objection Gate — The Seam Between Workflows and Objections
//!
//! The workflow engines never inspect objection records; before a
//! blockable transition they ask an [`ObjectionGate`] whether anything
//! in force vetoes the operation. The objection engine implements the
//! gate; the workflow crates only consume it. Keeping the trait here in
//! the leaf crate keeps the dependency DAG acyclic.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::kind::EntityHandle;
use crate::temporal::Timestamp;

/// The operations an objection type can declare it blocks.
///
/// The catalogue maps objection-type codes to sets of these identifiers;
/// the mapping is data, this enum is only the closed vocabulary it draws
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockedOperation {
    /// Approval of a credential reprint request.
    ReprintApproval,
    /// Adding a resident to a communal residence record.
    AddResident,
}

impl std::fmt::Display for BlockedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ReprintApproval => "REPRINT_APPROVAL",
            Self::AddResident => "ADD_RESIDENT",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for BlockedOperation {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REPRINT_APPROVAL" => Ok(Self::ReprintApproval),
            "ADD_RESIDENT" => Ok(Self::AddResident),
            other => Err(RegistryError::validation(
                "operation",
                format!("unknown blockable operation {other:?}"),
            )),
        }
    }
}

/// What an in-force objection tells the blocked caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectionNotice {
    /// Catalogue code of the objection type.
    pub objection_type: String,
    /// The objection's stated grounds.
    pub reason: String,
    /// Free-text identity of the objecting party.
    pub requester: String,
}

impl ObjectionNotice {
    /// The error surfaced to the caller whose transition was vetoed.
    pub fn into_error(self) -> RegistryError {
        RegistryError::ObjectionBlocked {
            objection_type: self.objection_type,
            reason: self.reason,
            requester: self.requester,
        }
    }
}

/// Answers "is there an in-force objection vetoing `operation` against
/// `subject` at `at`?".
///
/// Object-safe so workflow transitions can take `&dyn ObjectionGate`.
pub trait ObjectionGate {
    /// The first matching in-force objection, or `None` if the operation
    /// may proceed.
    fn blocking(
        &self,
        subject: EntityHandle,
        operation: BlockedOperation,
        at: Timestamp,
    ) -> Option<ObjectionNotice>;
}

/// A gate with nothing on file. Lets every operation proceed.
///
/// Used by workflows with no blockable semantics and by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObjections;

impl ObjectionGate for NoObjections {
    fn blocking(
        &self,
        _subject: EntityHandle,
        _operation: BlockedOperation,
        _at: Timestamp,
    ) -> Option<ObjectionNotice> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::RecordId;
    use crate::kind::EntityKind;

    #[test]
    fn test_no_objections_never_blocks() {
        let gate = NoObjections;
        let handle = EntityHandle::new(EntityKind::Monk, RecordId(1));
        assert!(gate
            .blocking(handle, BlockedOperation::ReprintApproval, Timestamp::now())
            .is_none());
    }

    #[test]
    fn test_operation_roundtrips_through_str() {
        for op in [BlockedOperation::ReprintApproval, BlockedOperation::AddResident] {
            assert_eq!(op.to_string().parse::<BlockedOperation>().unwrap(), op);
        }
        assert!("REPAINT".parse::<BlockedOperation>().is_err());
    }

    #[test]
    fn test_notice_into_error() {
        let notice = ObjectionNotice {
            objection_type: "REPRINT_RESTRICTION".into(),
            reason: "identity dispute".into(),
            requester: "W. Silva".into(),
        };
        match notice.into_error() {
            RegistryError::ObjectionBlocked {
                objection_type,
                reason,
                requester,
            } => {
                assert_eq!(objection_type, "REPRINT_RESTRICTION");
                assert_eq!(reason, "identity dispute");
                assert_eq!(requester, "W. Silva");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
