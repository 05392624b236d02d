//! The `RecordStore` trait.
//!
//! Implemented by storage backends (`MemoryStore` here, the Postgres
//! adapter in `sasana-store`). The registry service depends on this
//! abstraction, never on a concrete backend.
//!
//! All methods return `Send` futures so the trait can be used from
//! multi-threaded async runtimes (tokio with axum).
//!
//! ## Compare-and-swap contract
//!
//! Every `update_*` takes the version the caller *read* before applying
//! its transition. The store commits the write only if the stored
//! version still equals that token, otherwise it fails `StaleVersion`
//! with the stored version, and the caller must re-read. The mutated
//! value passed in already carries the incremented version.

use std::future::Future;

use sasana_core::{
    BlockedOperation, EntityHandle, EntityKind, ObjectionId, RegistryError, ReprintId, Timestamp,
};
use sasana_objection::{Objection, ObjectionCatalogue};
use sasana_workflow::{RegistrationRecord, ReprintRequest};

/// Abstraction over a transactional registry backend.
pub trait RecordStore: Send + Sync + 'static {
    // ── Registration records ──────────────────────────────────────────

    /// Persist a new record, assigning its surrogate key.
    ///
    /// Fails `Validation` if the registration code collides with a
    /// non-deleted record of the same kind.
    fn insert_record(
        &self,
        draft: RegistrationRecord,
    ) -> impl Future<Output = Result<RegistrationRecord, RegistryError>> + Send + '_;

    /// Fetch a record by handle. Returns soft-deleted records too — the
    /// service decides what resolves; audit needs the row either way.
    fn fetch_record(
        &self,
        handle: EntityHandle,
    ) -> impl Future<Output = Result<Option<RegistrationRecord>, RegistryError>> + Send + '_;

    /// CAS-write a mutated record against the version the caller read.
    fn update_record<'a>(
        &'a self,
        record: &'a RegistrationRecord,
        read_version: u64,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send + 'a;

    /// CAS-write a mutated record, screening `subject`'s objections for
    /// `operation` in the same unit of work as the write.
    ///
    /// An in-force match aborts the write with `ObjectionBlocked`. The
    /// screen and the commit are atomic: an objection upheld after the
    /// caller's read still vetoes the write.
    fn update_record_screened<'a>(
        &'a self,
        record: &'a RegistrationRecord,
        read_version: u64,
        subject: EntityHandle,
        catalogue: &'a ObjectionCatalogue,
        operation: BlockedOperation,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send + 'a;

    /// All non-deleted records of a kind, ascending by surrogate key.
    fn list_records(
        &self,
        kind: EntityKind,
    ) -> impl Future<Output = Result<Vec<RegistrationRecord>, RegistryError>> + Send + '_;

    /// Hard-delete a record and cascade-delete its reprint requests and
    /// objections. Soft deletion is an ordinary `update_record`.
    fn purge_record(
        &self,
        handle: EntityHandle,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send + '_;

    // ── Reprint requests ──────────────────────────────────────────────

    /// Persist a new reprint request.
    fn insert_reprint(
        &self,
        request: ReprintRequest,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send + '_;

    /// Fetch a reprint request by id.
    fn fetch_reprint(
        &self,
        id: ReprintId,
    ) -> impl Future<Output = Result<Option<ReprintRequest>, RegistryError>> + Send + '_;

    /// CAS-write a mutated reprint request.
    fn update_reprint<'a>(
        &'a self,
        request: &'a ReprintRequest,
        read_version: u64,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send + 'a;

    /// CAS-write a mutated reprint request with the same atomic
    /// objection screen as
    /// [`update_record_screened`](Self::update_record_screened).
    fn update_reprint_screened<'a>(
        &'a self,
        request: &'a ReprintRequest,
        read_version: u64,
        subject: EntityHandle,
        catalogue: &'a ObjectionCatalogue,
        operation: BlockedOperation,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send + 'a;

    /// All reprint requests referencing a record.
    fn reprints_for(
        &self,
        handle: EntityHandle,
    ) -> impl Future<Output = Result<Vec<ReprintRequest>, RegistryError>> + Send + '_;

    // ── Objections ────────────────────────────────────────────────────

    /// Persist a new objection.
    fn insert_objection(
        &self,
        objection: Objection,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send + '_;

    /// Fetch an objection by id.
    fn fetch_objection(
        &self,
        id: ObjectionId,
    ) -> impl Future<Output = Result<Option<Objection>, RegistryError>> + Send + '_;

    /// CAS-write a mutated objection.
    fn update_objection<'a>(
        &'a self,
        objection: &'a Objection,
        read_version: u64,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send + 'a;

    /// All objections referencing a record.
    fn objections_for(
        &self,
        handle: EntityHandle,
    ) -> impl Future<Output = Result<Vec<Objection>, RegistryError>> + Send + '_;
}
