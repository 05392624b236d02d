//! # sasana-core — Foundational Types for the Sasana Registry Stack
//!
//! This crate is the bedrock of the registry stack. It defines the
//! type-system primitives shared by the workflow engine, the objection
//! engine, the registry service, and the storage adapters. Every other
//! crate in the workspace depends on `sasana-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `RecordId`, `ReprintId`,
//!    `ObjectionId`, `ActorId`, `RegistrationCode`, `DocumentRef` — all
//!    newtypes with validated constructors. No bare strings or integers
//!    for identifiers.
//!
//! 2. **One `EntityKind` enum.** The seven registrable kinds are defined
//!    once, with exhaustive `match` everywhere. Adding a kind forces every
//!    consumer to handle it.
//!
//! 3. **Sum types for discriminated references.** `EntityHandle` and
//!    `ReprintSubject` make "exactly one reference" unrepresentable to
//!    violate in-process; the nullable-columns shape exists only at the
//!    storage boundary.
//!
//! 4. **UTC-only timestamps.** The `Timestamp` type enforces UTC with
//!    seconds precision so audit entries and objection windows serialize
//!    deterministically.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sasana-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize` where they cross a persistence or API
//!   boundary.

pub mod actor;
pub mod error;
pub mod gate;
pub mod identity;
pub mod kind;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use actor::{ActorContext, ActorId, ActorStamp};
pub use error::RegistryError;
pub use gate::{BlockedOperation, NoObjections, ObjectionGate, ObjectionNotice};
pub use identity::{DocumentRef, ObjectionId, RecordId, RegistrationCode, ReprintId};
pub use kind::{CompletionRoute, EntityHandle, EntityKind, ReprintSubject};
pub use temporal::Timestamp;
