//! # Workflow Status Vocabulary
//!
//! The primary lifecycle status of a registrable record and the
//! independent approval sub-status. Every entity kind instantiates the
//! same shape; per-kind variation (the scan-skip route) lives on
//! [`EntityKind`](sasana_core::EntityKind), not here.

use serde::{Deserialize, Serialize};

use sasana_core::RegistryError;

/// The primary workflow status of a registrable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStatus {
    /// Record created, not yet submitted for approval.
    Pending,
    /// Submitted, awaiting an administrator's decision.
    PendingApproval,
    /// Approved for credential issuance.
    Approved,
    /// Rejected; dead end until explicitly resubmitted.
    Rejected,
    /// Credential has been printed.
    Printed,
    /// Printed credential has been scanned back.
    Scanned,
    /// Credential issued; workflow finished (terminal).
    Completed,
}

impl WorkflowStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Sort rank for administrator attention queues: records awaiting a
    /// decision surface ahead of everything else.
    pub fn queue_rank(&self) -> u8 {
        match self {
            Self::PendingApproval => 0,
            _ => 1,
        }
    }

    /// The canonical string name, used in storage and wire forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Printed => "PRINTED",
            Self::Scanned => "SCANNED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PENDING_APPROVAL" => Ok(Self::PendingApproval),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "PRINTED" => Ok(Self::Printed),
            "SCANNED" => Ok(Self::Scanned),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(RegistryError::validation(
                "status",
                format!("unknown workflow status {other:?}"),
            )),
        }
    }
}

/// The approval sub-status, recorded independently of `status`
/// progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalOutcome {
    /// The record passed review.
    Approved,
    /// The record failed review.
    Rejected,
}

impl ApprovalOutcome {
    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for ApprovalOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApprovalOutcome {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(RegistryError::validation(
                "approval",
                format!("unknown approval outcome {other:?}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const ALL: [WorkflowStatus; 7] = [
        WorkflowStatus::Pending,
        WorkflowStatus::PendingApproval,
        WorkflowStatus::Approved,
        WorkflowStatus::Rejected,
        WorkflowStatus::Printed,
        WorkflowStatus::Scanned,
        WorkflowStatus::Completed,
    ];

    #[test]
    fn test_status_roundtrips_through_str() {
        for status in ALL {
            assert_eq!(WorkflowStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(WorkflowStatus::from_str("DRAFT").is_err());
    }

    #[test]
    fn test_only_completed_is_terminal() {
        for status in ALL {
            assert_eq!(status.is_terminal(), status == WorkflowStatus::Completed);
        }
    }

    #[test]
    fn test_pending_approval_ranks_first() {
        assert_eq!(WorkflowStatus::PendingApproval.queue_rank(), 0);
        for status in ALL {
            if status != WorkflowStatus::PendingApproval {
                assert_eq!(status.queue_rank(), 1);
            }
        }
    }

    #[test]
    fn test_approval_outcome_roundtrip() {
        assert_eq!(
            ApprovalOutcome::from_str("APPROVED").unwrap(),
            ApprovalOutcome::Approved
        );
        assert_eq!(
            ApprovalOutcome::from_str("REJECTED").unwrap(),
            ApprovalOutcome::Rejected
        );
        assert!(ApprovalOutcome::from_str("MAYBE").is_err());
    }
}
