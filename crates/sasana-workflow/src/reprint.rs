//! # Reprint Sub-Workflow
//!
//! A structurally independent state machine for reissuing a credential
//! that has already been issued. Same pattern as the primary machine —
//! versioned, journaled, explicit errors — scoped to "reprint" instead
//! of first issuance.
//!
//! ```text
//! Pending ──approve()──▶ Approved ──mark_printed()──▶ Printed
//!    │                                                   │
//! reject()                                          complete()
//!    ▼                                                   ▼
//! Rejected (terminal, retained)                  Completed (terminal)
//! ```
//!
//! The distinguishing rule: `approve` consults the
//! [`ObjectionGate`] for an in-force REPRINT_RESTRICTION against the
//! referenced credential holder before committing, and fails
//! `ObjectionBlocked` — carrying the objection's grounds and requester —
//! if one exists.

use serde::{Deserialize, Serialize};

use sasana_core::{
    ActorContext, ActorId, ActorStamp, BlockedOperation, ObjectionGate, RegistryError, ReprintId,
    ReprintSubject, Timestamp,
};

use crate::record::validate_reason;

// ─── Status ──────────────────────────────────────────────────────────

/// The flow status of a reprint request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReprintStatus {
    /// Requested, awaiting a decision.
    Pending,
    /// Approved; awaiting the print run.
    Approved,
    /// Rejected (terminal; the request is retained, never hard-deleted).
    Rejected,
    /// Reprinted credential produced.
    Printed,
    /// Reprint handed over; flow finished (terminal).
    Completed,
}

impl ReprintStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// The canonical string name, used in storage and wire forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Printed => "PRINTED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for ReprintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReprintStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "PRINTED" => Ok(Self::Printed),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(RegistryError::validation(
                "flow_status",
                format!("unknown reprint status {other:?}"),
            )),
        }
    }
}

// ─── Journal ─────────────────────────────────────────────────────────

/// One entry in a reprint request's transition journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReprintTransitionRecord {
    /// Status before the transition.
    pub from_status: ReprintStatus,
    /// Status after the transition.
    pub to_status: ReprintStatus,
    /// When the transition occurred (UTC).
    pub at: Timestamp,
    /// Who performed the transition.
    pub actor: ActorId,
    /// Optional context (rejection reason, …).
    pub note: Option<String>,
}

// ─── Reprint Request ─────────────────────────────────────────────────

/// A request to reissue an already-issued credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReprintRequest {
    /// Unique request identifier.
    pub id: ReprintId,
    /// The credential holder (exactly one personnel reference).
    pub subject: ReprintSubject,
    /// Flow status.
    pub status: ReprintStatus,
    /// Fee charged for the reprint, in rupee cents. Integer by policy —
    /// no floats in money fields.
    pub amount_cents: i64,
    /// Free-text remarks from the requester or counter clerk.
    pub remarks: Option<String>,
    /// Who recorded the request, and when.
    pub requested: ActorStamp,
    /// Approval stamp.
    pub approved: Option<ActorStamp>,
    /// Rejection stamp.
    pub rejected: Option<ActorStamp>,
    /// Reason recorded with the rejection.
    pub rejection_reason: Option<String>,
    /// Print stamp.
    pub printed: Option<ActorStamp>,
    /// Completion stamp.
    pub completed: Option<ActorStamp>,
    /// Optimistic-concurrency counter; starts at 1, +1 per transition.
    pub version: u64,
    /// Append-only journal of every transition.
    pub transitions: Vec<ReprintTransitionRecord>,
}

impl ReprintRequest {
    /// Create a new request in `Pending` at version 1.
    ///
    /// That the referenced credential was actually issued (record
    /// `Completed`) is the registry service's check — this type does not
    /// see other records.
    pub fn new(
        subject: ReprintSubject,
        amount_cents: i64,
        remarks: Option<String>,
        ctx: ActorContext,
        now: Timestamp,
    ) -> Result<Self, RegistryError> {
        if amount_cents < 0 {
            return Err(RegistryError::validation(
                "amount",
                "must not be negative",
            ));
        }
        Ok(Self {
            id: ReprintId::new(),
            subject,
            status: ReprintStatus::Pending,
            amount_cents,
            remarks,
            requested: ActorStamp::new(ctx.actor, now),
            approved: None,
            rejected: None,
            rejection_reason: None,
            printed: None,
            completed: None,
            version: 1,
            transitions: Vec::new(),
        })
    }

    /// Approve the reprint (PENDING → APPROVED).
    ///
    /// Fails `ObjectionBlocked` if the gate reports an in-force
    /// objection against the credential holder at `now`.
    pub fn approve(
        &mut self,
        actor: ActorId,
        gate: &dyn ObjectionGate,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.require_status(ReprintStatus::Pending, ReprintStatus::Approved)?;
        if let Some(notice) =
            gate.blocking(self.subject.handle(), BlockedOperation::ReprintApproval, now)
        {
            return Err(notice.into_error());
        }
        self.approved = Some(ActorStamp::new(actor.clone(), now));
        self.apply(ReprintStatus::Approved, actor, now, None);
        Ok(())
    }

    /// Reject the reprint (PENDING → REJECTED) with a mandatory reason.
    pub fn reject(
        &mut self,
        actor: ActorId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        let reason = validate_reason(reason)?;
        self.require_status(ReprintStatus::Pending, ReprintStatus::Rejected)?;
        self.rejected = Some(ActorStamp::new(actor.clone(), now));
        self.rejection_reason = Some(reason.clone());
        self.apply(ReprintStatus::Rejected, actor, now, Some(reason));
        Ok(())
    }

    /// Record the reprint run (APPROVED → PRINTED).
    pub fn mark_printed(&mut self, actor: ActorId, now: Timestamp) -> Result<(), RegistryError> {
        self.require_status(ReprintStatus::Approved, ReprintStatus::Printed)?;
        self.printed = Some(ActorStamp::new(actor.clone(), now));
        self.apply(ReprintStatus::Printed, actor, now, None);
        Ok(())
    }

    /// Finish the flow (PRINTED → COMPLETED).
    pub fn complete(&mut self, actor: ActorId, now: Timestamp) -> Result<(), RegistryError> {
        self.require_status(ReprintStatus::Printed, ReprintStatus::Completed)?;
        self.completed = Some(ActorStamp::new(actor.clone(), now));
        self.apply(ReprintStatus::Completed, actor, now, None);
        Ok(())
    }

    fn require_status(
        &self,
        expected: ReprintStatus,
        target: ReprintStatus,
    ) -> Result<(), RegistryError> {
        if self.status != expected {
            return Err(RegistryError::InvalidTransition {
                entity: self.id.to_string(),
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }

    fn apply(&mut self, to: ReprintStatus, actor: ActorId, at: Timestamp, note: Option<String>) {
        self.transitions.push(ReprintTransitionRecord {
            from_status: self.status,
            to_status: to,
            at,
            actor,
            note,
        });
        self.status = to;
        self.version += 1;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sasana_core::{EntityHandle, NoObjections, ObjectionNotice, RecordId};

    fn actor(name: &str) -> ActorId {
        ActorId::new(name).unwrap()
    }

    fn now() -> Timestamp {
        Timestamp::parse("2026-03-01T10:00:00Z").unwrap()
    }

    fn make_request() -> ReprintRequest {
        ReprintRequest::new(
            ReprintSubject::Monk(RecordId(7)),
            50_00,
            Some("card lost in flood".to_string()),
            ActorContext::new(actor("counter")),
            now(),
        )
        .unwrap()
    }

    /// Gate that blocks reprint approval for exactly one handle.
    struct BlockOne(EntityHandle);

    impl ObjectionGate for BlockOne {
        fn blocking(
            &self,
            subject: EntityHandle,
            operation: BlockedOperation,
            _at: Timestamp,
        ) -> Option<ObjectionNotice> {
            (subject == self.0 && operation == BlockedOperation::ReprintApproval).then(|| {
                ObjectionNotice {
                    objection_type: "REPRINT_RESTRICTION".into(),
                    reason: "identity dispute pending".into(),
                    requester: "D. Perera".into(),
                }
            })
        }
    }

    #[test]
    fn test_new_request_rejects_negative_amount() {
        let err = ReprintRequest::new(
            ReprintSubject::Nun(RecordId(1)),
            -1,
            None,
            ActorContext::new(actor("counter")),
            now(),
        );
        assert!(matches!(err, Err(RegistryError::Validation { .. })));
    }

    #[test]
    fn test_full_flow_unblocked() {
        let mut req = make_request();
        req.approve(actor("U1"), &NoObjections, now()).unwrap();
        req.mark_printed(actor("printer"), now()).unwrap();
        req.complete(actor("counter"), now()).unwrap();
        assert_eq!(req.status, ReprintStatus::Completed);
        assert!(req.status.is_terminal());
        assert_eq!(req.version, 4);
        assert_eq!(req.transitions.len(), 3);
    }

    #[test]
    fn test_objection_blocks_approval_for_matching_subject_only() {
        let gate = BlockOne(ReprintSubject::Monk(RecordId(7)).handle());

        let mut blocked = make_request();
        let err = blocked.approve(actor("U1"), &gate, now()).unwrap_err();
        match err {
            RegistryError::ObjectionBlocked {
                objection_type,
                reason,
                requester,
            } => {
                assert_eq!(objection_type, "REPRINT_RESTRICTION");
                assert_eq!(reason, "identity dispute pending");
                assert_eq!(requester, "D. Perera");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // block must not mutate the request
        assert_eq!(blocked.status, ReprintStatus::Pending);
        assert_eq!(blocked.version, 1);

        // a different credential holder sails through
        let mut other = ReprintRequest::new(
            ReprintSubject::Monk(RecordId(8)),
            50_00,
            None,
            ActorContext::new(actor("counter")),
            now(),
        )
        .unwrap();
        other.approve(actor("U1"), &gate, now()).unwrap();
        assert_eq!(other.status, ReprintStatus::Approved);
    }

    #[test]
    fn test_reject_is_terminal_but_retained() {
        let mut req = make_request();
        req.reject(actor("U1"), "no payment received", now()).unwrap();
        assert_eq!(req.status, ReprintStatus::Rejected);
        assert_eq!(req.rejection_reason.as_deref(), Some("no payment received"));
        // terminal: nothing else is legal
        assert!(req.approve(actor("U1"), &NoObjections, now()).is_err());
        assert!(req.mark_printed(actor("p"), now()).is_err());
        assert!(req.complete(actor("c"), now()).is_err());
    }

    #[test]
    fn test_reject_requires_reason() {
        let mut req = make_request();
        assert!(req.reject(actor("U1"), "  ", now()).is_err());
        assert_eq!(req.status, ReprintStatus::Pending);
    }

    #[test]
    fn test_cannot_print_before_approval() {
        let mut req = make_request();
        let err = req.mark_printed(actor("p"), now()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidTransition { .. }));
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut req = make_request();
        req.approve(actor("U1"), &NoObjections, now()).unwrap();
        let json = serde_json::to_string(&req).unwrap();
        let parsed: ReprintRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, req);
    }
}
