//! # sasana-objection — Cross-Entity Objection Engine
//!
//! A standing objection attaches to exactly one entity record and, while
//! in force, vetoes specific transitions on that record. This crate owns:
//!
//! - the **objection lifecycle** (`objection.rs`): `Pending → Approved |
//!   Rejected | Cancelled`, where an approved objection may later be
//!   cancelled to end enforcement immediately;
//! - the **type catalogue** (`catalogue.rs`): which objection-type code
//!   blocks which operations against which entity kinds. The mapping is
//!   data loaded at startup, not a branch per type;
//! - the **screen** (`screen.rs`): the pure "is anything in force
//!   against this entity for this operation at this time?" query, which
//!   is the sole integration point the workflow engines consult.
//!
//! ## Enforcement window
//!
//! An objection is in force only while `status == Approved` and the
//! queried instant falls within `[valid_from, valid_until)`. A null
//! `valid_from` means "from the moment of approval"; a null
//! `valid_until` means unbounded.

pub mod catalogue;
pub mod objection;
pub mod screen;

pub use catalogue::{ObjectionCatalogue, ObjectionTypeDef};
pub use objection::{Objection, ObjectionStatus, ObjectionTransitionRecord};
pub use screen::ObjectionScreen;
