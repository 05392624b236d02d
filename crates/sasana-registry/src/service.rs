//! The registry service — one method per workflow operation.
//!
//! Each mutating call is one short-lived unit of work: load current
//! state, check the caller's version token, run the pure transition,
//! screen objections where the operation is blockable, CAS-write. On
//! `StaleVersion` the caller re-reads and retries; the service never
//! retries server-side.

use sasana_core::{
    ActorContext, ActorId, BlockedOperation, DocumentRef, EntityHandle, EntityKind, NoObjections,
    ObjectionGate, ObjectionId, ObjectionNotice, RegistrationCode, RegistryError, ReprintId,
    ReprintSubject, Timestamp,
};
use sasana_objection::{Objection, ObjectionCatalogue, ObjectionScreen};
use sasana_workflow::{RegistrationRecord, ReprintRequest, ReprintStatus, WorkflowStatus};

use crate::store::RecordStore;

/// The orchestration layer over a [`RecordStore`].
#[derive(Debug, Clone)]
pub struct RegistryService<S> {
    store: S,
    catalogue: ObjectionCatalogue,
}

impl<S: RecordStore> RegistryService<S> {
    /// Service with the built-in objection catalogue.
    pub fn new(store: S) -> Self {
        Self::with_catalogue(store, ObjectionCatalogue::builtin())
    }

    /// Service with a caller-supplied catalogue (loaded at startup).
    pub fn with_catalogue(store: S, catalogue: ObjectionCatalogue) -> Self {
        Self { store, catalogue }
    }

    /// The loaded objection catalogue.
    pub fn catalogue(&self) -> &ObjectionCatalogue {
        &self.catalogue
    }

    // ── Registration records ──────────────────────────────────────────

    /// Create a record in `Pending` with a caller-supplied registration
    /// code (produced by the code-generator collaborator).
    pub async fn create_record(
        &self,
        kind: EntityKind,
        code: &str,
        ctx: ActorContext,
    ) -> Result<RegistrationRecord, RegistryError> {
        let code = RegistrationCode::new(code)?;
        let draft = RegistrationRecord::new(kind, code, ctx, Timestamp::now())?;
        let record = self.store.insert_record(draft).await?;
        tracing::info!(handle = %record.handle(), code = %record.code, "record created");
        metrics::counter!("registry_records_created_total", "kind" => kind.as_str())
            .increment(1);
        Ok(record)
    }

    /// Fetch a record by handle, soft-deleted ones included. Audit
    /// surfaces (objection and reprint histories) use this; workflow
    /// operations go through [`resolve`](Self::resolve).
    pub async fn get_record(
        &self,
        handle: EntityHandle,
    ) -> Result<RegistrationRecord, RegistryError> {
        self.store.fetch_record(handle).await?.ok_or_else(|| {
            RegistryError::ReferentialIntegrity(format!("{handle} does not exist"))
        })
    }

    /// Resolve a handle to a live (non-deleted) record.
    pub async fn resolve(&self, handle: EntityHandle) -> Result<RegistrationRecord, RegistryError> {
        match self.store.fetch_record(handle).await? {
            Some(record) if !record.is_deleted => Ok(record),
            Some(_) => Err(RegistryError::ReferentialIntegrity(format!(
                "{handle} is deleted"
            ))),
            None => Err(RegistryError::ReferentialIntegrity(format!(
                "{handle} does not exist"
            ))),
        }
    }

    /// The administrator attention queue for a kind: records awaiting a
    /// decision first (ascending id), then the rest (ascending id).
    pub async fn list_queue(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<RegistrationRecord>, RegistryError> {
        let mut records = self.store.list_records(kind).await?;
        records.sort_by_key(|r| (r.status.queue_rank(), r.id));
        Ok(records)
    }

    /// Submit for approval (PENDING → PENDING_APPROVAL).
    pub async fn submit_record(
        &self,
        handle: EntityHandle,
        read_version: u64,
        actor: ActorId,
    ) -> Result<RegistrationRecord, RegistryError> {
        self.transition(handle, read_version, "submit", |record, now| {
            record.submit(actor, now)
        })
        .await
    }

    /// Approve (PENDING_APPROVAL → APPROVED).
    pub async fn approve_record(
        &self,
        handle: EntityHandle,
        read_version: u64,
        actor: ActorId,
    ) -> Result<RegistrationRecord, RegistryError> {
        self.transition(handle, read_version, "approve", |record, now| {
            record.approve(actor, now)
        })
        .await
    }

    /// Reject (PENDING_APPROVAL → REJECTED) with a mandatory reason.
    pub async fn reject_record(
        &self,
        handle: EntityHandle,
        read_version: u64,
        actor: ActorId,
        reason: &str,
    ) -> Result<RegistrationRecord, RegistryError> {
        self.transition(handle, read_version, "reject", |record, now| {
            record.reject(actor, reason, now)
        })
        .await
    }

    /// Resubmit a rejected record (REJECTED → PENDING).
    pub async fn resubmit_record(
        &self,
        handle: EntityHandle,
        read_version: u64,
        actor: ActorId,
    ) -> Result<RegistrationRecord, RegistryError> {
        self.transition(handle, read_version, "resubmit", |record, now| {
            record.resubmit(actor, now)
        })
        .await
    }

    /// Print the credential (APPROVED → PRINTED).
    pub async fn print_record(
        &self,
        handle: EntityHandle,
        read_version: u64,
        actor: ActorId,
    ) -> Result<RegistrationRecord, RegistryError> {
        self.transition(handle, read_version, "print", |record, now| {
            record.mark_printed(actor, now)
        })
        .await
    }

    /// Record the scanned credential (PRINTED → SCANNED).
    pub async fn scan_record(
        &self,
        handle: EntityHandle,
        read_version: u64,
        actor: ActorId,
        document: DocumentRef,
    ) -> Result<RegistrationRecord, RegistryError> {
        self.transition(handle, read_version, "scan", |record, now| {
            record.mark_scanned(actor, document, now)
        })
        .await
    }

    /// Complete the workflow (SCANNED or PRINTED → COMPLETED, by kind).
    pub async fn complete_record(
        &self,
        handle: EntityHandle,
        read_version: u64,
        actor: ActorId,
    ) -> Result<RegistrationRecord, RegistryError> {
        self.transition(handle, read_version, "complete", |record, now| {
            record.mark_completed(actor, now)
        })
        .await
    }

    /// Soft-delete a record. Retained for audit, excluded from active
    /// queries, refuses further transitions.
    pub async fn delete_record(
        &self,
        handle: EntityHandle,
        read_version: u64,
        actor: ActorId,
    ) -> Result<RegistrationRecord, RegistryError> {
        self.transition(handle, read_version, "soft_delete", |record, now| {
            record.mark_deleted(actor, now)
        })
        .await
    }

    /// Register a resident on a communal residence record, unless an
    /// in-force RESIDENCY_RESTRICTION objection vetoes it.
    ///
    /// The objection screen runs in the same store transaction as the
    /// write, so an objection upheld concurrently still vetoes it.
    pub async fn add_resident(
        &self,
        arama: EntityHandle,
        resident: EntityHandle,
        read_version: u64,
        actor: ActorId,
    ) -> Result<RegistrationRecord, RegistryError> {
        // both ends must resolve before anything is written
        self.resolve(resident).await?;
        self.transition_screened(
            arama,
            read_version,
            "add_resident",
            BlockedOperation::AddResident,
            |record, now| record.add_resident(resident, actor, now),
        )
        .await
    }

    /// Hard-delete a record, cascading its reprint requests and
    /// objections. Irreversible; prefer [`delete_record`](Self::delete_record).
    pub async fn purge_record(&self, handle: EntityHandle) -> Result<(), RegistryError> {
        self.store.purge_record(handle).await?;
        tracing::warn!(%handle, "record purged with dependents");
        Ok(())
    }

    // ── Reprint requests ──────────────────────────────────────────────

    /// Request a reprint of an already-issued credential.
    ///
    /// The subject must resolve to a live record in `Completed` status.
    pub async fn request_reprint(
        &self,
        subject: ReprintSubject,
        amount_cents: i64,
        remarks: Option<String>,
        ctx: ActorContext,
    ) -> Result<ReprintRequest, RegistryError> {
        let record = self.resolve(subject.handle()).await?;
        if record.status != WorkflowStatus::Completed {
            return Err(RegistryError::PreconditionFailed(format!(
                "{} has no issued credential to reprint (status {})",
                subject.handle(),
                record.status
            )));
        }
        let request = ReprintRequest::new(subject, amount_cents, remarks, ctx, Timestamp::now())?;
        self.store.insert_reprint(request.clone()).await?;
        tracing::info!(id = %request.id, subject = %subject.handle(), "reprint requested");
        metrics::counter!("registry_reprints_requested_total").increment(1);
        Ok(request)
    }

    /// Approve a reprint (PENDING → APPROVED), unless an in-force
    /// REPRINT_RESTRICTION objection vetoes it.
    ///
    /// The objection screen runs in the same store transaction as the
    /// write: an objection upheld between the load and the commit still
    /// vetoes the approval, even though the reprint's own version is
    /// unchanged.
    pub async fn approve_reprint(
        &self,
        id: ReprintId,
        read_version: u64,
        actor: ActorId,
    ) -> Result<ReprintRequest, RegistryError> {
        let mut request = self.load_reprint(id, read_version).await?;
        let subject = request.subject.handle();
        let now = Timestamp::now();
        request.approve(actor, &NoObjections, now)?;
        self.store
            .update_reprint_screened(
                &request,
                read_version,
                subject,
                &self.catalogue,
                BlockedOperation::ReprintApproval,
                now,
            )
            .await?;
        self.note_reprint(&request, "approve");
        Ok(request)
    }

    /// Reject a reprint (PENDING → REJECTED) with a mandatory reason.
    pub async fn reject_reprint(
        &self,
        id: ReprintId,
        read_version: u64,
        actor: ActorId,
        reason: &str,
    ) -> Result<ReprintRequest, RegistryError> {
        let mut request = self.load_reprint(id, read_version).await?;
        request.reject(actor, reason, Timestamp::now())?;
        self.store.update_reprint(&request, read_version).await?;
        self.note_reprint(&request, "reject");
        Ok(request)
    }

    /// Record the reprint run (APPROVED → PRINTED).
    pub async fn print_reprint(
        &self,
        id: ReprintId,
        read_version: u64,
        actor: ActorId,
    ) -> Result<ReprintRequest, RegistryError> {
        let mut request = self.load_reprint(id, read_version).await?;
        request.mark_printed(actor, Timestamp::now())?;
        self.store.update_reprint(&request, read_version).await?;
        self.note_reprint(&request, "print");
        Ok(request)
    }

    /// Finish the flow (PRINTED → COMPLETED).
    pub async fn complete_reprint(
        &self,
        id: ReprintId,
        read_version: u64,
        actor: ActorId,
    ) -> Result<ReprintRequest, RegistryError> {
        let mut request = self.load_reprint(id, read_version).await?;
        request.complete(actor, Timestamp::now())?;
        self.store.update_reprint(&request, read_version).await?;
        self.note_reprint(&request, "complete");
        Ok(request)
    }

    /// Fetch a reprint request.
    pub async fn get_reprint(&self, id: ReprintId) -> Result<ReprintRequest, RegistryError> {
        self.store.fetch_reprint(id).await?.ok_or_else(|| {
            RegistryError::ReferentialIntegrity(format!("{id} does not exist"))
        })
    }

    /// All reprint requests raised against a record's credential.
    /// Institutions have none.
    pub async fn reprints_for(
        &self,
        handle: EntityHandle,
    ) -> Result<Vec<ReprintRequest>, RegistryError> {
        self.store.reprints_for(handle).await
    }

    // ── Objections ────────────────────────────────────────────────────

    /// File an objection against a record.
    ///
    /// The type must be catalogued and applicable to the subject's kind,
    /// and the subject must resolve to a live record.
    #[allow(clippy::too_many_arguments)]
    pub async fn file_objection(
        &self,
        subject: EntityHandle,
        objection_type: &str,
        grounds: &str,
        requester_name: &str,
        requester_contact: Option<String>,
        valid_from: Option<Timestamp>,
        valid_until: Option<Timestamp>,
        ctx: ActorContext,
    ) -> Result<Objection, RegistryError> {
        self.catalogue.validate_filing(objection_type, subject.kind)?;
        self.resolve(subject).await?;
        let objection = Objection::file(
            subject,
            objection_type,
            grounds,
            requester_name,
            requester_contact,
            valid_from,
            valid_until,
            ctx,
            Timestamp::now(),
        )?;
        self.store.insert_objection(objection.clone()).await?;
        tracing::info!(id = %objection.id, %subject, objection_type, "objection filed");
        metrics::counter!("registry_objections_filed_total").increment(1);
        Ok(objection)
    }

    /// Uphold an objection (PENDING → APPROVED).
    pub async fn approve_objection(
        &self,
        id: ObjectionId,
        read_version: u64,
        actor: ActorId,
    ) -> Result<Objection, RegistryError> {
        let mut objection = self.load_objection(id, read_version).await?;
        objection.approve(actor, Timestamp::now())?;
        self.store.update_objection(&objection, read_version).await?;
        Ok(objection)
    }

    /// Dismiss an objection (PENDING → REJECTED).
    pub async fn reject_objection(
        &self,
        id: ObjectionId,
        read_version: u64,
        actor: ActorId,
        reason: &str,
    ) -> Result<Objection, RegistryError> {
        let mut objection = self.load_objection(id, read_version).await?;
        objection.reject(actor, reason, Timestamp::now())?;
        self.store.update_objection(&objection, read_version).await?;
        Ok(objection)
    }

    /// Cancel an objection (PENDING or APPROVED → CANCELLED), ending
    /// enforcement immediately.
    pub async fn cancel_objection(
        &self,
        id: ObjectionId,
        read_version: u64,
        actor: ActorId,
        reason: &str,
    ) -> Result<Objection, RegistryError> {
        let mut objection = self.load_objection(id, read_version).await?;
        objection.cancel(actor, reason, Timestamp::now())?;
        self.store.update_objection(&objection, read_version).await?;
        Ok(objection)
    }

    /// Fetch an objection.
    pub async fn get_objection(&self, id: ObjectionId) -> Result<Objection, RegistryError> {
        self.store.fetch_objection(id).await?.ok_or_else(|| {
            RegistryError::ReferentialIntegrity(format!("{id} does not exist"))
        })
    }

    /// All objections on file against a record, whatever their status.
    pub async fn objections_for(
        &self,
        handle: EntityHandle,
    ) -> Result<Vec<Objection>, RegistryError> {
        self.store.objections_for(handle).await
    }

    /// Is there an in-force objection blocking `operation` against
    /// `handle` at `at`? Pure query; returns the first match.
    pub async fn is_blocking(
        &self,
        handle: EntityHandle,
        operation: BlockedOperation,
        at: Timestamp,
    ) -> Result<Option<ObjectionNotice>, RegistryError> {
        self.screen(handle, operation, at).await
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn screen(
        &self,
        handle: EntityHandle,
        operation: BlockedOperation,
        at: Timestamp,
    ) -> Result<Option<ObjectionNotice>, RegistryError> {
        let objections = self.store.objections_for(handle).await?;
        let screen = ObjectionScreen::new(&self.catalogue, &objections);
        Ok(screen.blocking(handle, operation, at))
    }

    /// Load → token check → pure transition → CAS write.
    async fn transition<F>(
        &self,
        handle: EntityHandle,
        read_version: u64,
        name: &'static str,
        apply: F,
    ) -> Result<RegistrationRecord, RegistryError>
    where
        F: FnOnce(&mut RegistrationRecord, Timestamp) -> Result<(), RegistryError>,
    {
        self.run_transition(handle, read_version, name, None, apply)
            .await
    }

    /// Like [`transition`](Self::transition), with the objection screen
    /// for `operation` run atomically with the write.
    async fn transition_screened<F>(
        &self,
        handle: EntityHandle,
        read_version: u64,
        name: &'static str,
        operation: BlockedOperation,
        apply: F,
    ) -> Result<RegistrationRecord, RegistryError>
    where
        F: FnOnce(&mut RegistrationRecord, Timestamp) -> Result<(), RegistryError>,
    {
        self.run_transition(handle, read_version, name, Some(operation), apply)
            .await
    }

    async fn run_transition<F>(
        &self,
        handle: EntityHandle,
        read_version: u64,
        name: &'static str,
        screen: Option<BlockedOperation>,
        apply: F,
    ) -> Result<RegistrationRecord, RegistryError>
    where
        F: FnOnce(&mut RegistrationRecord, Timestamp) -> Result<(), RegistryError>,
    {
        let mut record = match self.store.fetch_record(handle).await? {
            Some(record) => record,
            None => {
                return Err(RegistryError::ReferentialIntegrity(format!(
                    "{handle} does not exist"
                )))
            }
        };
        if record.version != read_version {
            return Err(RegistryError::StaleVersion {
                expected: read_version,
                actual: record.version,
            });
        }
        let now = Timestamp::now();
        apply(&mut record, now)?;
        match screen {
            Some(operation) => {
                self.store
                    .update_record_screened(
                        &record,
                        read_version,
                        handle,
                        &self.catalogue,
                        operation,
                        now,
                    )
                    .await?
            }
            None => self.store.update_record(&record, read_version).await?,
        }
        tracing::info!(
            %handle,
            transition = name,
            status = %record.status,
            version = record.version,
            "record transition committed"
        );
        metrics::counter!(
            "registry_transitions_total",
            "kind" => record.kind.as_str(),
            "transition" => name
        )
        .increment(1);
        Ok(record)
    }

    async fn load_reprint(
        &self,
        id: ReprintId,
        read_version: u64,
    ) -> Result<ReprintRequest, RegistryError> {
        let request = self.get_reprint(id).await?;
        if request.version != read_version {
            return Err(RegistryError::StaleVersion {
                expected: read_version,
                actual: request.version,
            });
        }
        Ok(request)
    }

    async fn load_objection(
        &self,
        id: ObjectionId,
        read_version: u64,
    ) -> Result<Objection, RegistryError> {
        let objection = self.store.fetch_objection(id).await?.ok_or_else(|| {
            RegistryError::ReferentialIntegrity(format!("{id} does not exist"))
        })?;
        if objection.version != read_version {
            return Err(RegistryError::StaleVersion {
                expected: read_version,
                actual: objection.version,
            });
        }
        Ok(objection)
    }

    fn note_reprint(&self, request: &ReprintRequest, name: &'static str) {
        tracing::info!(
            id = %request.id,
            transition = name,
            status = %request.status,
            "reprint transition committed"
        );
        metrics::counter!("registry_reprint_transitions_total", "transition" => name)
            .increment(1);
    }
}
