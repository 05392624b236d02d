//! # Objection Lifecycle
//!
//! An objection is itself a small approval workflow: filed `Pending`,
//! then `Approved` (enforceable), `Rejected`, or `Cancelled`. An
//! approved objection may later be cancelled by an authorized actor,
//! which ends enforcement immediately regardless of `valid_until`.

use serde::{Deserialize, Serialize};

use sasana_core::{
    ActorContext, ActorId, ActorStamp, EntityHandle, ObjectionId, RegistryError, Timestamp,
};

/// Longest accepted grounds/decision reason, in characters.
const MAX_TEXT_LEN: usize = 500;

fn validate_text(field: &str, value: &str) -> Result<String, RegistryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(RegistryError::validation(
            field,
            format!("must be at most {MAX_TEXT_LEN} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle status of an objection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectionStatus {
    /// Filed, awaiting review.
    Pending,
    /// Upheld; enforceable within its validity window.
    Approved,
    /// Dismissed on review (terminal).
    Rejected,
    /// Withdrawn or administratively ended (terminal).
    Cancelled,
}

impl ObjectionStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }

    /// The canonical string name, used in storage and wire forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for ObjectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectionStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(RegistryError::validation(
                "status",
                format!("unknown objection status {other:?}"),
            )),
        }
    }
}

// ─── Journal ─────────────────────────────────────────────────────────

/// One entry in an objection's transition journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectionTransitionRecord {
    /// Status before the transition.
    pub from_status: ObjectionStatus,
    /// Status after the transition.
    pub to_status: ObjectionStatus,
    /// When the transition occurred (UTC).
    pub at: Timestamp,
    /// Who performed the transition.
    pub actor: ActorId,
    /// Optional context (decision reason, …).
    pub note: Option<String>,
}

// ─── Objection ───────────────────────────────────────────────────────

/// A standing objection against exactly one entity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objection {
    /// Unique objection identifier.
    pub id: ObjectionId,
    /// The entity the objection is raised against.
    pub subject: EntityHandle,
    /// Catalogue code of the objection type.
    pub objection_type: String,
    /// The objecting party's stated grounds.
    pub grounds: String,
    /// Free-text name of the objecting party (not a registry reference).
    pub requester_name: String,
    /// Free-text contact details of the objecting party.
    pub requester_contact: Option<String>,
    /// Lifecycle status.
    pub status: ObjectionStatus,
    /// Start of the enforcement window; `None` means "from approval".
    pub valid_from: Option<Timestamp>,
    /// End of the enforcement window (exclusive); `None` means
    /// unbounded.
    pub valid_until: Option<Timestamp>,
    /// Who filed the objection, and when.
    pub filed: ActorStamp,
    /// Approval stamp.
    pub approved: Option<ActorStamp>,
    /// Rejection stamp.
    pub rejected: Option<ActorStamp>,
    /// Cancellation stamp.
    pub cancelled: Option<ActorStamp>,
    /// Reason recorded with a rejection or cancellation.
    pub decision_reason: Option<String>,
    /// Optimistic-concurrency counter; starts at 1, +1 per transition.
    pub version: u64,
    /// Append-only journal of every transition.
    pub transitions: Vec<ObjectionTransitionRecord>,
}

impl Objection {
    /// File a new objection in `Pending` at version 1.
    ///
    /// Validates the grounds, requester identity, and that the validity
    /// window is ordered. Whether the type is catalogued and applies to
    /// the subject's kind is validated by the registry against the
    /// loaded [`ObjectionCatalogue`](crate::ObjectionCatalogue).
    #[allow(clippy::too_many_arguments)]
    pub fn file(
        subject: EntityHandle,
        objection_type: impl Into<String>,
        grounds: &str,
        requester_name: &str,
        requester_contact: Option<String>,
        valid_from: Option<Timestamp>,
        valid_until: Option<Timestamp>,
        ctx: ActorContext,
        now: Timestamp,
    ) -> Result<Self, RegistryError> {
        let grounds = validate_text("grounds", grounds)?;
        let requester_name = validate_text("requester_name", requester_name)?;
        if let (Some(from), Some(until)) = (valid_from, valid_until) {
            if from >= until {
                return Err(RegistryError::validation(
                    "valid_until",
                    "validity window must end after it starts",
                ));
            }
        }
        Ok(Self {
            id: ObjectionId::new(),
            subject,
            objection_type: objection_type.into(),
            grounds,
            requester_name,
            requester_contact,
            status: ObjectionStatus::Pending,
            valid_from,
            valid_until,
            filed: ActorStamp::new(ctx.actor, now),
            approved: None,
            rejected: None,
            cancelled: None,
            decision_reason: None,
            version: 1,
            transitions: Vec::new(),
        })
    }

    /// Uphold the objection (PENDING → APPROVED). It becomes
    /// enforceable within its validity window.
    pub fn approve(&mut self, actor: ActorId, now: Timestamp) -> Result<(), RegistryError> {
        self.require_status(ObjectionStatus::Pending, ObjectionStatus::Approved)?;
        self.approved = Some(ActorStamp::new(actor.clone(), now));
        self.apply(ObjectionStatus::Approved, actor, now, None);
        Ok(())
    }

    /// Dismiss the objection (PENDING → REJECTED).
    pub fn reject(
        &mut self,
        actor: ActorId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        let reason = validate_text("reason", reason)?;
        self.require_status(ObjectionStatus::Pending, ObjectionStatus::Rejected)?;
        self.rejected = Some(ActorStamp::new(actor.clone(), now));
        self.decision_reason = Some(reason.clone());
        self.apply(ObjectionStatus::Rejected, actor, now, Some(reason));
        Ok(())
    }

    /// Cancel the objection (PENDING or APPROVED → CANCELLED).
    ///
    /// Cancelling an approved objection ends enforcement immediately,
    /// regardless of `valid_until`.
    pub fn cancel(
        &mut self,
        actor: ActorId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        let reason = validate_text("reason", reason)?;
        if self.status.is_terminal() {
            return Err(RegistryError::InvalidTransition {
                entity: self.id.to_string(),
                from: self.status.to_string(),
                to: ObjectionStatus::Cancelled.to_string(),
            });
        }
        self.cancelled = Some(ActorStamp::new(actor.clone(), now));
        self.decision_reason = Some(reason.clone());
        self.apply(ObjectionStatus::Cancelled, actor, now, Some(reason));
        Ok(())
    }

    /// Whether the objection is in force at `at`.
    ///
    /// In force means: approved, `at` on or after the window start (the
    /// explicit `valid_from`, or the approval instant when unset), and
    /// `at` strictly before `valid_until` when one is set.
    pub fn in_force_at(&self, at: Timestamp) -> bool {
        if self.status != ObjectionStatus::Approved {
            return false;
        }
        let from = self
            .valid_from
            .or_else(|| self.approved.as_ref().map(|stamp| stamp.at));
        let Some(from) = from else {
            // approved with neither a window start nor an approval stamp
            // cannot happen through this API; treat as not in force
            return false;
        };
        if at < from {
            return false;
        }
        self.valid_until.map_or(true, |until| at < until)
    }

    fn require_status(
        &self,
        expected: ObjectionStatus,
        target: ObjectionStatus,
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

    fn apply(&mut self, to: ObjectionStatus, actor: ActorId, at: Timestamp, note: Option<String>) {
        self.transitions.push(ObjectionTransitionRecord {
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
