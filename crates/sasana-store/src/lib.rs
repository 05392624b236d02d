//! # sasana-store — PostgreSQL Persistence
//!
//! The durable [`RecordStore`](sasana_registry::RecordStore) backend.
//!
//! ## Layout
//!
//! Each of the seven entity kinds gets its own record table
//! (`temple_records`, `monk_records`, …) with an identical column
//! layout; the table's `BIGSERIAL` key is the per-kind ascending
//! surrogate id the administrator queues are ordered by. Reprint
//! requests and objections live in one shared table each: a reprint row
//! carries four nullable personnel references with a
//! `num_nonnulls(...) = 1` check constraint, an objection row carries a
//! `(subject_kind, subject_id)` pair.
//!
//! ## Concurrency
//!
//! Workflow constraints are enforced at the application layer, not in
//! SQL. What the store enforces is the compare-and-swap discipline:
//! every `UPDATE` is conditioned on `version = $read` and fails
//! `StaleVersion` when another writer committed first, and code
//! uniqueness among live records is a partial unique index, so two
//! racing creations of the same code cannot both succeed.
//!
//! Transition journals and kind extensions are stored as `JSONB`;
//! everything queried or indexed is a plain column.

pub mod pg;
pub mod schema;

pub use pg::PgStore;
