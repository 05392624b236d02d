//! # sasana-workflow — Registration Workflow State Machines
//!
//! Implements the two state machines of the registry stack as pure,
//! versioned, audit-trailed types. Transitions are methods that validate
//! the current state, mutate the record, bump the version counter by
//! exactly one, and append a journal entry. Invalid transitions are
//! structured errors, never silent no-ops.
//!
//! ## State Machines
//!
//! - **Registration** (`record.rs`): `Pending → PendingApproval →
//!   Approved | Rejected`, then `Approved → Printed → Scanned →
//!   Completed` — with kinds whose credentials skip the scan step going
//!   `Printed → Completed` directly. `Rejected` is a dead end until an
//!   explicit `resubmit` clears the rejection fields.
//!
//! - **Reprint** (`reprint.rs`): `Pending → Approved | Rejected`, then
//!   `Approved → Printed → Completed`. Approval consults the
//!   [`ObjectionGate`](sasana_core::ObjectionGate) before committing.
//!
//! ## Design
//!
//! An enum with validated transitions rather than typestate types: the
//! registration machine has seven states across seven entity kinds, and
//! the stored representation must round-trip through a relational row,
//! so the state is data with `transition()`-style methods returning
//! `Result`. The joint invariant between `status` and the `approval`
//! sub-status (no printing without a recorded approval) is enforced as a
//! precondition on every print-path transition.
//!
//! Concurrency control is layered above: these types carry the version
//! counter, the registry service performs the compare-and-swap.

pub mod record;
pub mod reprint;
pub mod status;

// ─── Registration re-exports ────────────────────────────────────────

pub use record::{KindExtension, RegistrationRecord, TransitionRecord};
pub use status::{ApprovalOutcome, WorkflowStatus};

// ─── Reprint re-exports ─────────────────────────────────────────────

pub use reprint::{ReprintRequest, ReprintStatus, ReprintTransitionRecord};
