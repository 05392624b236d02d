//! # Registration Record State Machine
//!
//! One generic record type covers all seven entity kinds: the workflow
//! fields are identical, per-kind variation is data on
//! [`EntityKind`], and kind-specific payload rides in [`KindExtension`].
//!
//! ## States
//!
//! ```text
//! Pending ──submit()──▶ PendingApproval ──approve()──▶ Approved
//!    ▲                        │                           │
//!    │                     reject()                 mark_printed()
//!    │                        ▼                           ▼
//!    └────resubmit()────── Rejected                    Printed
//!                                                  ┌──────┴──────┐
//!                                           mark_scanned()  mark_completed()
//!                                            (ViaScan)     (DirectFromPrint)
//!                                                  │            │
//!                                                  ▼            │
//!                                               Scanned         │
//!                                                  │            │
//!                                          mark_completed()     │
//!                                                  ▼            ▼
//!                                                  Completed (terminal)
//! ```
//!
//! ## Invariants
//!
//! - `status == Printed | Scanned | Completed` implies a recorded
//!   `ApprovalOutcome::Approved`; the print transition checks the
//!   approval sub-status before the status itself, so an inconsistent
//!   record always fails `PreconditionFailed`.
//! - Every successful transition increments `version` by exactly one and
//!   appends one journal entry.
//! - Soft-deleted records refuse every transition.

use serde::{Deserialize, Serialize};

use sasana_core::{
    ActorContext, ActorId, ActorStamp, DocumentRef, EntityHandle, EntityKind, CompletionRoute,
    RecordId, RegistrationCode, RegistryError, Timestamp,
};

use crate::status::{ApprovalOutcome, WorkflowStatus};

/// Longest accepted rejection reason, in characters.
pub const MAX_REASON_LEN: usize = 500;

/// Validate a human-supplied decision reason: non-empty after trimming,
/// at most [`MAX_REASON_LEN`] characters.
pub(crate) fn validate_reason(reason: &str) -> Result<String, RegistryError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::validation("reason", "must not be empty"));
    }
    if trimmed.chars().count() > MAX_REASON_LEN {
        return Err(RegistryError::validation(
            "reason",
            format!("must be at most {MAX_REASON_LEN} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

// ─── Journal ─────────────────────────────────────────────────────────

/// One entry in a record's append-only transition journal.
///
/// Non-status mutations (resident changes, soft deletion) journal with
/// `from_status == to_status` and an explanatory note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Status before the mutation.
    pub from_status: WorkflowStatus,
    /// Status after the mutation.
    pub to_status: WorkflowStatus,
    /// When the mutation occurred (UTC).
    pub at: Timestamp,
    /// Who performed the mutation.
    pub actor: ActorId,
    /// Optional context (rejection reason, resident added, …).
    pub note: Option<String>,
}

// ─── Kind Extension ──────────────────────────────────────────────────

/// Kind-specific payload carried alongside the generic workflow fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KindExtension {
    /// Kinds with no extra workflow-relevant fields.
    #[default]
    None,
    /// Communal residences track their registered residents.
    Residence {
        /// Handles of the personnel registered as residents.
        residents: Vec<EntityHandle>,
    },
}

impl KindExtension {
    /// The empty extension appropriate for `kind`.
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Arama => Self::Residence {
                residents: Vec::new(),
            },
            _ => Self::None,
        }
    }
}

// ─── Registration Record ─────────────────────────────────────────────

/// A registrable record of any kind, with its workflow state, audit
/// stamps, version counter, and transition journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    /// Store-assigned surrogate key (`RecordId(0)` until persisted).
    pub id: RecordId,
    /// The entity kind this record registers.
    pub kind: EntityKind,
    /// Externally visible registration code, unique per kind among
    /// non-deleted records.
    pub code: RegistrationCode,
    /// Primary workflow status.
    pub status: WorkflowStatus,
    /// Approval sub-status, recorded independently of `status`.
    pub approval: Option<ApprovalOutcome>,
    /// Who created the record, and when.
    pub created: ActorStamp,
    /// Administrative jurisdiction of the creating actor.
    pub created_by_location: Option<String>,
    /// Submission stamp.
    pub submitted: Option<ActorStamp>,
    /// Approval stamp.
    pub approved: Option<ActorStamp>,
    /// Rejection stamp.
    pub rejected: Option<ActorStamp>,
    /// Reason recorded with the rejection.
    pub rejection_reason: Option<String>,
    /// Print stamp.
    pub printed: Option<ActorStamp>,
    /// Scan stamp.
    pub scanned: Option<ActorStamp>,
    /// Reference to the scanned credential held by the document store.
    pub scanned_document: Option<DocumentRef>,
    /// Completion stamp.
    pub completed: Option<ActorStamp>,
    /// Kind-specific payload.
    pub extension: KindExtension,
    /// Soft-delete flag; deleted records are retained for audit but
    /// excluded from active queries and refuse transitions.
    pub is_deleted: bool,
    /// Optimistic-concurrency counter; starts at 1, +1 per mutation.
    pub version: u64,
    /// Append-only journal of every mutation.
    pub transitions: Vec<TransitionRecord>,
}

impl RegistrationRecord {
    /// Create a new record in `Pending` at version 1.
    ///
    /// The registration code's prefix must match the kind's convention;
    /// uniqueness against the store is the registry's job at insert time.
    pub fn new(
        kind: EntityKind,
        code: RegistrationCode,
        ctx: ActorContext,
        now: Timestamp,
    ) -> Result<Self, RegistryError> {
        let prefix: String = code
            .as_str()
            .chars()
            .take_while(|c| c.is_ascii_uppercase())
            .collect();
        if prefix != kind.code_prefix() {
            return Err(RegistryError::validation(
                "registration_code",
                format!(
                    "prefix {prefix:?} does not match {:?} for kind {kind}",
                    kind.code_prefix()
                ),
            ));
        }
        Ok(Self {
            id: RecordId::default(),
            kind,
            code,
            status: WorkflowStatus::Pending,
            approval: None,
            created: ActorStamp::new(ctx.actor, now),
            created_by_location: ctx.location,
            submitted: None,
            approved: None,
            rejected: None,
            rejection_reason: None,
            printed: None,
            scanned: None,
            scanned_document: None,
            completed: None,
            extension: KindExtension::for_kind(kind),
            is_deleted: false,
            version: 1,
            transitions: Vec::new(),
        })
    }

    /// The uniform handle for this record.
    pub fn handle(&self) -> EntityHandle {
        EntityHandle::new(self.kind, self.id)
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Submit for approval (PENDING → PENDING_APPROVAL).
    pub fn submit(&mut self, actor: ActorId, now: Timestamp) -> Result<(), RegistryError> {
        self.require_live()?;
        self.require_status(WorkflowStatus::Pending, WorkflowStatus::PendingApproval)?;
        self.submitted = Some(ActorStamp::new(actor.clone(), now));
        self.apply(WorkflowStatus::PendingApproval, actor, now, None);
        Ok(())
    }

    /// Approve (PENDING_APPROVAL → APPROVED). Sets the approval
    /// sub-status and the approval stamp.
    pub fn approve(&mut self, actor: ActorId, now: Timestamp) -> Result<(), RegistryError> {
        self.require_live()?;
        self.require_status(WorkflowStatus::PendingApproval, WorkflowStatus::Approved)?;
        self.approval = Some(ApprovalOutcome::Approved);
        self.approved = Some(ActorStamp::new(actor.clone(), now));
        self.apply(WorkflowStatus::Approved, actor, now, None);
        Ok(())
    }

    /// Reject (PENDING_APPROVAL → REJECTED) with a mandatory reason.
    ///
    /// Leaves the approval-success stamp untouched.
    pub fn reject(
        &mut self,
        actor: ActorId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.require_live()?;
        let reason = validate_reason(reason)?;
        self.require_status(WorkflowStatus::PendingApproval, WorkflowStatus::Rejected)?;
        self.approval = Some(ApprovalOutcome::Rejected);
        self.rejected = Some(ActorStamp::new(actor.clone(), now));
        self.rejection_reason = Some(reason.clone());
        self.apply(WorkflowStatus::Rejected, actor, now, Some(reason));
        Ok(())
    }

    /// Resubmit a rejected record (REJECTED → PENDING).
    ///
    /// Clears the rejection stamp/reason and the approval sub-status.
    /// The journal and version counter continue across the gap — audit
    /// continuity is preserved.
    pub fn resubmit(&mut self, actor: ActorId, now: Timestamp) -> Result<(), RegistryError> {
        self.require_live()?;
        self.require_status(WorkflowStatus::Rejected, WorkflowStatus::Pending)?;
        self.approval = None;
        self.rejected = None;
        self.rejection_reason = None;
        self.apply(
            WorkflowStatus::Pending,
            actor,
            now,
            Some("resubmitted after rejection".to_string()),
        );
        Ok(())
    }

    /// Print the credential (APPROVED → PRINTED).
    ///
    /// The approval sub-status is checked before the status so a record
    /// without a recorded approval always fails `PreconditionFailed`,
    /// whatever its status.
    pub fn mark_printed(&mut self, actor: ActorId, now: Timestamp) -> Result<(), RegistryError> {
        self.require_live()?;
        if self.approval != Some(ApprovalOutcome::Approved) {
            return Err(RegistryError::PreconditionFailed(format!(
                "{} has no recorded approval; cannot print",
                self.handle()
            )));
        }
        self.require_status(WorkflowStatus::Approved, WorkflowStatus::Printed)?;
        self.printed = Some(ActorStamp::new(actor.clone(), now));
        self.apply(WorkflowStatus::Printed, actor, now, None);
        Ok(())
    }

    /// Record the scanned credential (PRINTED → SCANNED).
    ///
    /// Only kinds whose completion route includes the scan step accept
    /// this transition.
    pub fn mark_scanned(
        &mut self,
        actor: ActorId,
        document: DocumentRef,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.require_live()?;
        if self.kind.completion_route() != CompletionRoute::ViaScan {
            return Err(self.invalid_transition(WorkflowStatus::Scanned));
        }
        self.require_status(WorkflowStatus::Printed, WorkflowStatus::Scanned)?;
        self.scanned = Some(ActorStamp::new(actor.clone(), now));
        self.scanned_document = Some(document);
        self.apply(WorkflowStatus::Scanned, actor, now, None);
        Ok(())
    }

    /// Complete the workflow (SCANNED → COMPLETED, or PRINTED →
    /// COMPLETED for kinds without a scan step).
    pub fn mark_completed(&mut self, actor: ActorId, now: Timestamp) -> Result<(), RegistryError> {
        self.require_live()?;
        let required = match self.kind.completion_route() {
            CompletionRoute::ViaScan => WorkflowStatus::Scanned,
            CompletionRoute::DirectFromPrint => WorkflowStatus::Printed,
        };
        self.require_status(required, WorkflowStatus::Completed)?;
        self.completed = Some(ActorStamp::new(actor.clone(), now));
        self.apply(WorkflowStatus::Completed, actor, now, None);
        Ok(())
    }

    // ── Non-status mutations ─────────────────────────────────────────

    /// Register a resident on a communal residence record.
    ///
    /// Objection screening (RESIDENCY_RESTRICTION) happens in the
    /// registry service before this is called.
    pub fn add_resident(
        &mut self,
        resident: EntityHandle,
        actor: ActorId,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.require_live()?;
        let KindExtension::Residence { residents } = &mut self.extension else {
            return Err(RegistryError::PreconditionFailed(format!(
                "{} records do not track residents",
                self.kind
            )));
        };
        if residents.contains(&resident) {
            return Err(RegistryError::validation(
                "resident",
                format!("{resident} is already registered here"),
            ));
        }
        residents.push(resident);
        let status = self.status;
        self.version += 1;
        self.transitions.push(TransitionRecord {
            from_status: status,
            to_status: status,
            at: now,
            actor,
            note: Some(format!("resident {resident} added")),
        });
        Ok(())
    }

    /// Soft-delete the record. It is retained for audit but excluded
    /// from active queries and refuses further transitions.
    pub fn mark_deleted(&mut self, actor: ActorId, now: Timestamp) -> Result<(), RegistryError> {
        self.require_live()?;
        self.is_deleted = true;
        let status = self.status;
        self.version += 1;
        self.transitions.push(TransitionRecord {
            from_status: status,
            to_status: status,
            at: now,
            actor,
            note: Some("soft-deleted".to_string()),
        });
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    fn require_live(&self) -> Result<(), RegistryError> {
        if self.is_deleted {
            return Err(RegistryError::PreconditionFailed(format!(
                "{} is deleted",
                self.handle()
            )));
        }
        Ok(())
    }

    fn require_status(
        &self,
        expected: WorkflowStatus,
        target: WorkflowStatus,
    ) -> Result<(), RegistryError> {
        if self.status != expected {
            return Err(self.invalid_transition(target));
        }
        Ok(())
    }

    fn invalid_transition(&self, target: WorkflowStatus) -> RegistryError {
        RegistryError::InvalidTransition {
            entity: self.handle().to_string(),
            from: self.status.to_string(),
            to: target.to_string(),
        }
    }

    fn apply(&mut self, to: WorkflowStatus, actor: ActorId, at: Timestamp, note: Option<String>) {
        self.transitions.push(TransitionRecord {
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
    use proptest::prelude::*;

    fn actor(name: &str) -> ActorId {
        ActorId::new(name).unwrap()
    }

    fn now() -> Timestamp {
        Timestamp::parse("2026-02-01T09:00:00Z").unwrap()
    }

    fn make_temple() -> RegistrationRecord {
        RegistrationRecord::new(
            EntityKind::Temple,
            RegistrationCode::new("TRN0000099").unwrap(),
            ActorContext::new(actor("clerk")).with_location("Kandy"),
            now(),
        )
        .unwrap()
    }

    fn make_approved(kind: EntityKind, code: &str) -> RegistrationRecord {
        let mut rec = RegistrationRecord::new(
            kind,
            RegistrationCode::new(code).unwrap(),
            ActorContext::new(actor("clerk")),
            now(),
        )
        .unwrap();
        rec.submit(actor("clerk"), now()).unwrap();
        rec.approve(actor("commissioner"), now()).unwrap();
        rec
    }

    // ── Creation ─────────────────────────────────────────────────────

    #[test]
    fn test_new_record_starts_pending_at_version_one() {
        let rec = make_temple();
        assert_eq!(rec.status, WorkflowStatus::Pending);
        assert_eq!(rec.version, 1);
        assert!(rec.approval.is_none());
        assert_eq!(rec.created_by_location.as_deref(), Some("Kandy"));
        assert!(rec.transitions.is_empty());
    }

    #[test]
    fn test_new_record_rejects_mismatched_prefix() {
        let err = RegistrationRecord::new(
            EntityKind::Monk,
            RegistrationCode::new("TRN0000099").unwrap(),
            ActorContext::new(actor("clerk")),
            now(),
        );
        assert!(matches!(err, Err(RegistryError::Validation { .. })));
    }

    #[test]
    fn test_arama_gets_residence_extension() {
        let rec = RegistrationRecord::new(
            EntityKind::Arama,
            RegistrationCode::new("ARN2026000001").unwrap(),
            ActorContext::new(actor("clerk")),
            now(),
        )
        .unwrap();
        assert!(matches!(rec.extension, KindExtension::Residence { .. }));
        assert!(matches!(make_temple().extension, KindExtension::None));
    }

    // ── Happy path ───────────────────────────────────────────────────

    #[test]
    fn test_full_lifecycle_with_scan() {
        let mut rec = make_temple();
        rec.submit(actor("clerk"), now()).unwrap();
        rec.approve(actor("U1"), now()).unwrap();
        rec.mark_printed(actor("printer"), now()).unwrap();
        rec.mark_scanned(
            actor("scanner"),
            DocumentRef::new("scan/99.pdf").unwrap(),
            now(),
        )
        .unwrap();
        rec.mark_completed(actor("registrar"), now()).unwrap();

        assert_eq!(rec.status, WorkflowStatus::Completed);
        assert_eq!(rec.approval, Some(ApprovalOutcome::Approved));
        assert_eq!(rec.approved.as_ref().unwrap().by.as_str(), "U1");
        assert_eq!(
            rec.scanned_document.as_ref().unwrap().as_str(),
            "scan/99.pdf"
        );
        assert!(rec.submitted.is_some());
        assert!(rec.printed.is_some());
        assert!(rec.scanned.is_some());
        assert!(rec.completed.is_some());
        // five transitions after creation: version 1 + 5
        assert_eq!(rec.version, 6);
        assert_eq!(rec.transitions.len(), 5);
    }

    #[test]
    fn test_direct_from_print_kinds_complete_without_scan() {
        let mut rec = make_approved(EntityKind::HighOrdinationMonk, "UPS2026000007");
        rec.mark_printed(actor("printer"), now()).unwrap();
        rec.mark_completed(actor("registrar"), now()).unwrap();
        assert_eq!(rec.status, WorkflowStatus::Completed);
        assert!(rec.scanned.is_none());
    }

    #[test]
    fn test_scan_rejected_for_direct_from_print_kind() {
        let mut rec = make_approved(EntityKind::CombinedHighOrdinationMonk, "UPC2026000002");
        rec.mark_printed(actor("printer"), now()).unwrap();
        let err = rec
            .mark_scanned(actor("scanner"), DocumentRef::new("x.pdf").unwrap(), now())
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidTransition { .. }));
    }

    #[test]
    fn test_via_scan_kind_cannot_complete_straight_from_print() {
        let mut rec = make_approved(EntityKind::Temple, "TRN0000100");
        rec.mark_printed(actor("printer"), now()).unwrap();
        let err = rec.mark_completed(actor("registrar"), now()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidTransition { .. }));
    }

    // ── Rejection and resubmission ───────────────────────────────────

    #[test]
    fn test_reject_requires_reason() {
        let mut rec = make_temple();
        rec.submit(actor("clerk"), now()).unwrap();
        assert!(rec.reject(actor("U1"), "", now()).is_err());
        assert!(rec.reject(actor("U1"), "   ", now()).is_err());
        let long = "x".repeat(MAX_REASON_LEN + 1);
        assert!(rec.reject(actor("U1"), &long, now()).is_err());
        // the failed attempts must not have mutated anything
        assert_eq!(rec.status, WorkflowStatus::PendingApproval);
        assert_eq!(rec.version, 2);
    }

    #[test]
    fn test_reject_then_approve_is_invalid() {
        let mut rec = make_temple();
        rec.submit(actor("clerk"), now()).unwrap();
        rec.reject(actor("U1"), "incomplete documents", now()).unwrap();
        assert_eq!(rec.status, WorkflowStatus::Rejected);
        assert_eq!(rec.approval, Some(ApprovalOutcome::Rejected));
        assert_eq!(
            rec.rejection_reason.as_deref(),
            Some("incomplete documents")
        );
        let err = rec.approve(actor("U2"), now()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidTransition { .. }));
    }

    #[test]
    fn test_resubmit_clears_rejection_but_keeps_journal() {
        let mut rec = make_temple();
        rec.submit(actor("clerk"), now()).unwrap();
        rec.reject(actor("U1"), "blurry deed copy", now()).unwrap();
        let version_before = rec.version;
        let journal_before = rec.transitions.len();

        rec.resubmit(actor("clerk"), now()).unwrap();
        assert_eq!(rec.status, WorkflowStatus::Pending);
        assert!(rec.approval.is_none());
        assert!(rec.rejected.is_none());
        assert!(rec.rejection_reason.is_none());
        assert_eq!(rec.version, version_before + 1);
        assert_eq!(rec.transitions.len(), journal_before + 1);

        // and the record can go through approval again
        rec.submit(actor("clerk"), now()).unwrap();
        rec.approve(actor("U1"), now()).unwrap();
        assert_eq!(rec.approval, Some(ApprovalOutcome::Approved));
    }

    // ── Print precondition ───────────────────────────────────────────

    #[test]
    fn test_print_without_approval_fails_precondition_from_every_state() {
        // Pending
        let mut rec = make_temple();
        assert!(matches!(
            rec.mark_printed(actor("p"), now()),
            Err(RegistryError::PreconditionFailed(_))
        ));
        // PendingApproval
        rec.submit(actor("clerk"), now()).unwrap();
        assert!(matches!(
            rec.mark_printed(actor("p"), now()),
            Err(RegistryError::PreconditionFailed(_))
        ));
        // Rejected
        rec.reject(actor("U1"), "nope", now()).unwrap();
        assert!(matches!(
            rec.mark_printed(actor("p"), now()),
            Err(RegistryError::PreconditionFailed(_))
        ));
        // Rejected approval outcome is not a print approval either
        assert_eq!(rec.approval, Some(ApprovalOutcome::Rejected));
    }

    #[test]
    fn test_print_twice_is_invalid_transition() {
        let mut rec = make_approved(EntityKind::Temple, "TRN0000101");
        rec.mark_printed(actor("p"), now()).unwrap();
        let err = rec.mark_printed(actor("p"), now()).unwrap_err();
        // approval is recorded, so the second attempt is a status error
        assert!(matches!(err, RegistryError::InvalidTransition { .. }));
    }

    // ── Soft delete ──────────────────────────────────────────────────

    #[test]
    fn test_deleted_record_refuses_transitions() {
        let mut rec = make_temple();
        rec.mark_deleted(actor("admin"), now()).unwrap();
        assert!(rec.is_deleted);
        assert!(matches!(
            rec.submit(actor("clerk"), now()),
            Err(RegistryError::PreconditionFailed(_))
        ));
        assert!(matches!(
            rec.mark_deleted(actor("admin"), now()),
            Err(RegistryError::PreconditionFailed(_))
        ));
    }

    // ── Residents ────────────────────────────────────────────────────

    #[test]
    fn test_add_resident_only_on_residence_records() {
        let mut arama = RegistrationRecord::new(
            EntityKind::Arama,
            RegistrationCode::new("ARN2026000002").unwrap(),
            ActorContext::new(actor("clerk")),
            now(),
        )
        .unwrap();
        let monk = EntityHandle::new(EntityKind::Monk, RecordId(5));
        arama.add_resident(monk, actor("clerk"), now()).unwrap();
        match &arama.extension {
            KindExtension::Residence { residents } => assert_eq!(residents.as_slice(), &[monk]),
            other => panic!("unexpected extension: {other:?}"),
        }
        // duplicate
        assert!(arama.add_resident(monk, actor("clerk"), now()).is_err());

        let mut temple = make_temple();
        assert!(matches!(
            temple.add_resident(monk, actor("clerk"), now()),
            Err(RegistryError::PreconditionFailed(_))
        ));
    }

    // ── Serialization ────────────────────────────────────────────────

    #[test]
    fn test_record_serde_roundtrip() {
        let mut rec = make_approved(EntityKind::Monk, "BH2026000123");
        rec.mark_printed(actor("p"), now()).unwrap();
        let json = serde_json::to_string(&rec).unwrap();
        let parsed: RegistrationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rec);
    }

    // ── Property: version grows by exactly one per transition ────────

    proptest! {
        #[test]
        fn prop_every_successful_transition_bumps_version_once(seed in 0u8..6) {
            let mut rec = make_temple();
            let steps: Vec<fn(&mut RegistrationRecord) -> Result<(), RegistryError>> = vec![
                |r| r.submit(ActorId::new("a").unwrap(), Timestamp::now()),
                |r| r.approve(ActorId::new("a").unwrap(), Timestamp::now()),
                |r| r.mark_printed(ActorId::new("a").unwrap(), Timestamp::now()),
                |r| r.mark_scanned(
                    ActorId::new("a").unwrap(),
                    DocumentRef::new("d.pdf").unwrap(),
                    Timestamp::now(),
                ),
                |r| r.mark_completed(ActorId::new("a").unwrap(), Timestamp::now()),
            ];
            for step in steps.iter().take(seed as usize) {
                let before = rec.version;
                step(&mut rec).unwrap();
                prop_assert_eq!(rec.version, before + 1);
            }
        }
    }
}
