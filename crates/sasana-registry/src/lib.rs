//! # sasana-registry — Entity Registry and Orchestration Service
//!
//! The layer that turns the pure state machines of `sasana-workflow` and
//! `sasana-objection` into a transactional registry:
//!
//! - **`store`**: the [`RecordStore`] abstraction over a transactional
//!   backend — insert with code-collision rejection, fetch by handle,
//!   and compare-and-swap updates keyed on the version the caller read.
//!   Implemented by [`MemoryStore`] here and by the Postgres adapter in
//!   `sasana-store`.
//!
//! - **`service`**: [`RegistryService`], one method per workflow
//!   operation. Every transition is one short unit of work: load the
//!   record, check the caller's version token, run the pure transition,
//!   screen objections where the operation is blockable, and CAS-write
//!   the result. On contention the second writer gets `StaleVersion`
//!   and must re-read; the service never retries on its own, so a
//!   concurrent administrator decision is never silently overwritten.
//!
//! ## Ordering guarantees
//!
//! None across records. For one record, the store's CAS serializes
//! writers; exactly one of two concurrent transitions against the same
//! version can commit.

pub mod memory;
pub mod service;
pub mod store;

pub use memory::MemoryStore;
pub use service::RegistryService;
pub use store::RecordStore;
