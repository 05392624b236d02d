//! In-memory `RecordStore` backend.
//!
//! Mutex-guarded maps with the same compare-and-swap semantics as the
//! Postgres adapter. Used by tests and by deployments that run the
//! engine without a database (demos, seed tooling).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use sasana_core::{
    BlockedOperation, EntityHandle, EntityKind, ObjectionGate, ObjectionId, RecordId,
    RegistryError, ReprintId, Timestamp,
};
use sasana_objection::{Objection, ObjectionCatalogue, ObjectionScreen};
use sasana_workflow::{RegistrationRecord, ReprintRequest};

use crate::store::RecordStore;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<EntityHandle, RegistrationRecord>,
    next_ids: HashMap<EntityKind, i64>,
    reprints: HashMap<ReprintId, ReprintRequest>,
    objections: HashMap<ObjectionId, Objection>,
}

/// A shared, clonable in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // a poisoned lock only means a test panicked mid-write
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Inner {
    /// Screen `subject`'s objections under the held lock, so the check
    /// and the following write form one unit of work.
    fn screen(
        &self,
        subject: EntityHandle,
        catalogue: &ObjectionCatalogue,
        operation: BlockedOperation,
        at: Timestamp,
    ) -> Result<(), RegistryError> {
        let objections: Vec<Objection> = self
            .objections
            .values()
            .filter(|o| o.subject == subject)
            .cloned()
            .collect();
        match ObjectionScreen::new(catalogue, &objections).blocking(subject, operation, at) {
            Some(notice) => Err(notice.into_error()),
            None => Ok(()),
        }
    }

    fn record_cas(
        &mut self,
        record: &RegistrationRecord,
        read_version: u64,
    ) -> Result<(), RegistryError> {
        let stored = self.records.get_mut(&record.handle()).ok_or_else(|| {
            RegistryError::ReferentialIntegrity(format!("{} does not exist", record.handle()))
        })?;
        if stored.version != read_version {
            return Err(RegistryError::StaleVersion {
                expected: read_version,
                actual: stored.version,
            });
        }
        *stored = record.clone();
        Ok(())
    }

    fn reprint_cas(
        &mut self,
        request: &ReprintRequest,
        read_version: u64,
    ) -> Result<(), RegistryError> {
        let stored = self.reprints.get_mut(&request.id).ok_or_else(|| {
            RegistryError::ReferentialIntegrity(format!("{} does not exist", request.id))
        })?;
        if stored.version != read_version {
            return Err(RegistryError::StaleVersion {
                expected: read_version,
                actual: stored.version,
            });
        }
        *stored = request.clone();
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    async fn insert_record(
        &self,
        mut draft: RegistrationRecord,
    ) -> Result<RegistrationRecord, RegistryError> {
        let mut inner = self.lock();
        let collision = inner.records.values().any(|r| {
            r.kind == draft.kind && !r.is_deleted && r.code == draft.code
        });
        if collision {
            return Err(RegistryError::validation(
                "registration_code",
                format!("{} is already registered for a {} record", draft.code, draft.kind),
            ));
        }
        let next = inner.next_ids.entry(draft.kind).or_insert(1);
        draft.id = RecordId(*next);
        *next += 1;
        inner.records.insert(draft.handle(), draft.clone());
        Ok(draft)
    }

    async fn fetch_record(
        &self,
        handle: EntityHandle,
    ) -> Result<Option<RegistrationRecord>, RegistryError> {
        Ok(self.lock().records.get(&handle).cloned())
    }

    async fn update_record(
        &self,
        record: &RegistrationRecord,
        read_version: u64,
    ) -> Result<(), RegistryError> {
        self.lock().record_cas(record, read_version)
    }

    async fn update_record_screened(
        &self,
        record: &RegistrationRecord,
        read_version: u64,
        subject: EntityHandle,
        catalogue: &ObjectionCatalogue,
        operation: BlockedOperation,
        at: Timestamp,
    ) -> Result<(), RegistryError> {
        let mut inner = self.lock();
        inner.screen(subject, catalogue, operation, at)?;
        inner.record_cas(record, read_version)
    }

    async fn list_records(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<RegistrationRecord>, RegistryError> {
        let mut records: Vec<_> = self
            .lock()
            .records
            .values()
            .filter(|r| r.kind == kind && !r.is_deleted)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn purge_record(&self, handle: EntityHandle) -> Result<(), RegistryError> {
        let mut inner = self.lock();
        if inner.records.remove(&handle).is_none() {
            return Err(RegistryError::ReferentialIntegrity(format!(
                "{handle} does not exist"
            )));
        }
        inner
            .reprints
            .retain(|_, req| req.subject.handle() != handle);
        inner.objections.retain(|_, obj| obj.subject != handle);
        Ok(())
    }

    async fn insert_reprint(&self, request: ReprintRequest) -> Result<(), RegistryError> {
        self.lock().reprints.insert(request.id, request);
        Ok(())
    }

    async fn fetch_reprint(&self, id: ReprintId) -> Result<Option<ReprintRequest>, RegistryError> {
        Ok(self.lock().reprints.get(&id).cloned())
    }

    async fn update_reprint(
        &self,
        request: &ReprintRequest,
        read_version: u64,
    ) -> Result<(), RegistryError> {
        self.lock().reprint_cas(request, read_version)
    }

    async fn update_reprint_screened(
        &self,
        request: &ReprintRequest,
        read_version: u64,
        subject: EntityHandle,
        catalogue: &ObjectionCatalogue,
        operation: BlockedOperation,
        at: Timestamp,
    ) -> Result<(), RegistryError> {
        let mut inner = self.lock();
        inner.screen(subject, catalogue, operation, at)?;
        inner.reprint_cas(request, read_version)
    }

    async fn reprints_for(
        &self,
        handle: EntityHandle,
    ) -> Result<Vec<ReprintRequest>, RegistryError> {
        Ok(self
            .lock()
            .reprints
            .values()
            .filter(|req| req.subject.handle() == handle)
            .cloned()
            .collect())
    }

    async fn insert_objection(&self, objection: Objection) -> Result<(), RegistryError> {
        self.lock().objections.insert(objection.id, objection);
        Ok(())
    }

    async fn fetch_objection(
        &self,
        id: ObjectionId,
    ) -> Result<Option<Objection>, RegistryError> {
        Ok(self.lock().objections.get(&id).cloned())
    }

    async fn update_objection(
        &self,
        objection: &Objection,
        read_version: u64,
    ) -> Result<(), RegistryError> {
        let mut inner = self.lock();
        let stored = inner.objections.get_mut(&objection.id).ok_or_else(|| {
            RegistryError::ReferentialIntegrity(format!("{} does not exist", objection.id))
        })?;
        if stored.version != read_version {
            return Err(RegistryError::StaleVersion {
                expected: read_version,
                actual: stored.version,
            });
        }
        *stored = objection.clone();
        Ok(())
    }

    async fn objections_for(&self, handle: EntityHandle) -> Result<Vec<Objection>, RegistryError> {
        Ok(self
            .lock()
            .objections
            .values()
            .filter(|obj| obj.subject == handle)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sasana_core::{ActorContext, ActorId, NoObjections, RegistrationCode, ReprintSubject};
    use sasana_objection::catalogue::REPRINT_RESTRICTION;
    use sasana_workflow::ReprintStatus;

    fn draft(kind: EntityKind, code: &str) -> RegistrationRecord {
        RegistrationRecord::new(
            kind,
            RegistrationCode::new(code).unwrap(),
            ActorContext::new(ActorId::new("clerk").unwrap()),
            Timestamp::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_ascending_ids_per_kind() {
        let store = MemoryStore::new();
        let a = store.insert_record(draft(EntityKind::Temple, "TRN0000001")).await.unwrap();
        let b = store.insert_record(draft(EntityKind::Temple, "TRN0000002")).await.unwrap();
        let c = store.insert_record(draft(EntityKind::Monk, "BH2026000001")).await.unwrap();
        assert_eq!(a.id, RecordId(1));
        assert_eq!(b.id, RecordId(2));
        // per-kind sequence
        assert_eq!(c.id, RecordId(1));
    }

    #[tokio::test]
    async fn test_insert_rejects_code_collision_same_kind_only() {
        let store = MemoryStore::new();
        store.insert_record(draft(EntityKind::Temple, "TRN0000001")).await.unwrap();
        let err = store
            .insert_record(draft(EntityKind::Temple, "TRN0000001"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_collision_lifted_after_soft_delete() {
        let store = MemoryStore::new();
        let mut rec = store.insert_record(draft(EntityKind::Temple, "TRN0000001")).await.unwrap();
        let read = rec.version;
        rec.mark_deleted(ActorId::new("admin").unwrap(), Timestamp::now())
            .unwrap();
        store.update_record(&rec, read).await.unwrap();
        // same code is registrable again
        store.insert_record(draft(EntityKind::Temple, "TRN0000001")).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_with_stale_version_fails() {
        let store = MemoryStore::new();
        let mut rec = store.insert_record(draft(EntityKind::Temple, "TRN0000001")).await.unwrap();
        let read = rec.version;
        rec.submit(ActorId::new("clerk").unwrap(), Timestamp::now())
            .unwrap();
        store.update_record(&rec, read).await.unwrap();
        // second writer still holds the old version
        let err = store.update_record(&rec, read).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::StaleVersion { expected: 1, actual: 2 }
        ));
    }

    #[tokio::test]
    async fn test_screened_write_vetoed_by_objection_upheld_after_read() {
        let store = MemoryStore::new();
        let catalogue = ObjectionCatalogue::builtin();
        let rec = store
            .insert_record(draft(EntityKind::Monk, "BH2026000001"))
            .await
            .unwrap();
        let subject = ReprintSubject::from_handle(rec.handle()).unwrap();
        let mut req = ReprintRequest::new(
            subject,
            50_00,
            None,
            ActorContext::new(ActorId::new("counter").unwrap()),
            Timestamp::now(),
        )
        .unwrap();
        store.insert_reprint(req.clone()).await.unwrap();
        let read = req.version;

        // the approval decision is computed against a read that saw no
        // objection in force
        req.approve(ActorId::new("U1").unwrap(), &NoObjections, Timestamp::now())
            .unwrap();

        // an objection is upheld before the write lands
        let mut obj = Objection::file(
            rec.handle(),
            REPRINT_RESTRICTION,
            "identity dispute pending",
            "D. Perera",
            None,
            None,
            None,
            ActorContext::new(ActorId::new("clerk").unwrap()),
            Timestamp::now(),
        )
        .unwrap();
        obj.approve(ActorId::new("U1").unwrap(), Timestamp::now())
            .unwrap();
        store.insert_objection(obj).await.unwrap();

        let err = store
            .update_reprint_screened(
                &req,
                read,
                rec.handle(),
                &catalogue,
                BlockedOperation::ReprintApproval,
                Timestamp::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::ObjectionBlocked { .. }));
        // the stored request is untouched
        let stored = store.fetch_reprint(req.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReprintStatus::Pending);
        assert_eq!(stored.version, read);
    }

    #[tokio::test]
    async fn test_screened_write_commits_when_nothing_in_force() {
        let store = MemoryStore::new();
        let catalogue = ObjectionCatalogue::builtin();
        let rec = store
            .insert_record(draft(EntityKind::Monk, "BH2026000001"))
            .await
            .unwrap();
        let subject = ReprintSubject::from_handle(rec.handle()).unwrap();
        let mut req = ReprintRequest::new(
            subject,
            50_00,
            None,
            ActorContext::new(ActorId::new("counter").unwrap()),
            Timestamp::now(),
        )
        .unwrap();
        store.insert_reprint(req.clone()).await.unwrap();
        let read = req.version;
        req.approve(ActorId::new("U1").unwrap(), &NoObjections, Timestamp::now())
            .unwrap();

        store
            .update_reprint_screened(
                &req,
                read,
                rec.handle(),
                &catalogue,
                BlockedOperation::ReprintApproval,
                Timestamp::now(),
            )
            .await
            .unwrap();
        let stored = store.fetch_reprint(req.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReprintStatus::Approved);
    }

    #[tokio::test]
    async fn test_purge_cascades_dependents() {
        let store = MemoryStore::new();
        let rec = store
            .insert_record(draft(EntityKind::Monk, "BH2026000001"))
            .await
            .unwrap();
        let subject = sasana_core::ReprintSubject::from_handle(rec.handle()).unwrap();
        let req = ReprintRequest::new(
            subject,
            50_00,
            None,
            ActorContext::new(ActorId::new("counter").unwrap()),
            Timestamp::now(),
        )
        .unwrap();
        let req_id = req.id;
        store.insert_reprint(req).await.unwrap();

        store.purge_record(rec.handle()).await.unwrap();
        assert!(store.fetch_record(rec.handle()).await.unwrap().is_none());
        assert!(store.fetch_reprint(req_id).await.unwrap().is_none());
    }
}
