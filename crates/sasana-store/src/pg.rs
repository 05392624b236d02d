//! The PostgreSQL `RecordStore` implementation.
//!
//! Workflow constraints stay in the domain types; this module only
//! moves validated aggregates in and out of rows. Per-kind tables carry
//! kind-prefixed column names; the queries alias them back to the
//! shared field names, so one row struct serves every kind. Decode
//! failures on the read path surface as `Storage` errors and are
//! logged — a row this module cannot decode means the database was
//! written by something other than the write path here.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use sasana_core::{
    ActorId, ActorStamp, BlockedOperation, DocumentRef, EntityHandle, EntityKind, ObjectionGate,
    ObjectionId, RecordId, RegistrationCode, RegistryError, ReprintId, ReprintSubject, Timestamp,
};
use sasana_objection::{Objection, ObjectionCatalogue, ObjectionScreen, ObjectionStatus};
use sasana_registry::RecordStore;
use sasana_workflow::{
    ApprovalOutcome, KindExtension, RegistrationRecord, ReprintRequest, ReprintStatus,
    ReprintTransitionRecord, TransitionRecord, WorkflowStatus,
};

use crate::schema::{record_table, reference_column, RECORD_FIELDS, RECORD_UPDATE_FIELDS};

/// A `RecordStore` over a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database and ensure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        crate::schema::ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool. The schema is assumed provisioned.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for health checks.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─── Error mapping ───────────────────────────────────────────────────

fn storage_err(context: &str, e: sqlx::Error) -> RegistryError {
    tracing::error!(error = %e, context, "database operation failed");
    RegistryError::Storage(format!("{context}: {e}"))
}

fn corrupt(entity: &str, field: &str, detail: impl std::fmt::Display) -> RegistryError {
    let message = format!("corrupt {field} for {entity}: {detail}");
    tracing::error!("{message}");
    RegistryError::Storage(message)
}

fn to_json<T: serde::Serialize>(field: &str, value: &T) -> Result<serde_json::Value, RegistryError> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(error = %e, field, "failed to serialize for persistence");
        RegistryError::Storage(format!("failed to serialize {field}: {e}"))
    })
}

fn from_json<T: serde::de::DeserializeOwned>(
    entity: &str,
    field: &str,
    value: serde_json::Value,
) -> Result<T, RegistryError> {
    serde_json::from_value(value).map_err(|e| corrupt(entity, field, e))
}

// ─── Stamp columns ───────────────────────────────────────────────────

fn stamp_cols(stamp: &Option<ActorStamp>) -> (Option<&str>, Option<DateTime<Utc>>) {
    match stamp {
        Some(stamp) => (Some(stamp.by.as_str()), Some(*stamp.at.as_datetime())),
        None => (None, None),
    }
}

fn decode_stamp(
    entity: &str,
    field: &str,
    by: Option<String>,
    at: Option<DateTime<Utc>>,
) -> Result<Option<ActorStamp>, RegistryError> {
    match (by, at) {
        (Some(by), Some(at)) => {
            let by = ActorId::new(by).map_err(|e| corrupt(entity, field, e))?;
            Ok(Some(ActorStamp::new(by, Timestamp::from_utc(at))))
        }
        (None, None) => Ok(None),
        _ => Err(corrupt(entity, field, "half-set actor stamp")),
    }
}

// ─── Discriminated reference columns ─────────────────────────────────

/// The four nullable personnel references of `reprint_requests`, in
/// column order.
fn subject_refs(subject: ReprintSubject) -> [Option<i64>; 4] {
    let mut refs = [None; 4];
    match subject {
        ReprintSubject::Monk(id) => refs[0] = Some(id.0),
        ReprintSubject::Nun(id) => refs[1] = Some(id.0),
        ReprintSubject::HighOrdinationMonk(id) => refs[2] = Some(id.0),
        ReprintSubject::CombinedHighOrdinationMonk(id) => refs[3] = Some(id.0),
    }
    refs
}

/// The seven nullable references of `objections`, in `EntityKind::ALL`
/// order.
fn objection_refs(subject: EntityHandle) -> [Option<i64>; 7] {
    let mut refs = [None; 7];
    for (slot, kind) in refs.iter_mut().zip(EntityKind::ALL) {
        if kind == subject.kind {
            *slot = Some(subject.id.0);
        }
    }
    refs
}

fn subject_from_refs(
    entity: &str,
    refs: [Option<i64>; 7],
) -> Result<EntityHandle, RegistryError> {
    let mut found = None;
    for (kind, id) in EntityKind::ALL.into_iter().zip(refs) {
        if let Some(id) = id {
            if found.is_some() {
                return Err(corrupt(entity, "subject", "multiple references set"));
            }
            found = Some(EntityHandle::new(kind, RecordId(id)));
        }
    }
    found.ok_or_else(|| corrupt(entity, "subject", "no reference set"))
}

// ─── Record rows ─────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: i64,
    code: String,
    status: String,
    approval: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    created_by_location: Option<String>,
    submitted_by: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    rejected_by: Option<String>,
    rejected_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    printed_by: Option<String>,
    printed_at: Option<DateTime<Utc>>,
    scanned_by: Option<String>,
    scanned_at: Option<DateTime<Utc>>,
    scanned_document: Option<String>,
    completed_by: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    extension: serde_json::Value,
    is_deleted: bool,
    version: i64,
    transition_log: serde_json::Value,
}

impl RecordRow {
    fn into_record(self, kind: EntityKind) -> Result<RegistrationRecord, RegistryError> {
        let entity = format!("{kind}:{}", self.id);
        let status =
            WorkflowStatus::from_str(&self.status).map_err(|e| corrupt(&entity, "status", e))?;
        let approval = self
            .approval
            .as_deref()
            .map(ApprovalOutcome::from_str)
            .transpose()
            .map_err(|e| corrupt(&entity, "approval", e))?;
        let created_by =
            ActorId::new(self.created_by).map_err(|e| corrupt(&entity, "created_by", e))?;
        let code =
            RegistrationCode::new(self.code).map_err(|e| corrupt(&entity, "code", e))?;
        let scanned_document = self
            .scanned_document
            .map(DocumentRef::new)
            .transpose()
            .map_err(|e| corrupt(&entity, "scanned_document", e))?;
        let extension: KindExtension = from_json(&entity, "extension", self.extension)?;
        let transitions: Vec<TransitionRecord> =
            from_json(&entity, "transition_log", self.transition_log)?;

        Ok(RegistrationRecord {
            id: RecordId(self.id),
            kind,
            code,
            status,
            approval,
            created: ActorStamp::new(created_by, Timestamp::from_utc(self.created_at)),
            created_by_location: self.created_by_location,
            submitted: decode_stamp(&entity, "submitted", self.submitted_by, self.submitted_at)?,
            approved: decode_stamp(&entity, "approved", self.approved_by, self.approved_at)?,
            rejected: decode_stamp(&entity, "rejected", self.rejected_by, self.rejected_at)?,
            rejection_reason: self.rejection_reason,
            printed: decode_stamp(&entity, "printed", self.printed_by, self.printed_at)?,
            scanned: decode_stamp(&entity, "scanned", self.scanned_by, self.scanned_at)?,
            scanned_document,
            completed: decode_stamp(&entity, "completed", self.completed_by, self.completed_at)?,
            extension,
            is_deleted: self.is_deleted,
            version: self.version as u64,
            transitions,
        })
    }
}

// ─── Per-kind SQL (prefixed columns aliased back to field names) ─────

fn record_select_list(kind: EntityKind) -> String {
    let p = kind.as_str();
    std::iter::once("id")
        .chain(RECORD_FIELDS)
        .map(|field| format!("{p}_{field} AS {field}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn record_insert_sql(kind: EntityKind) -> String {
    let p = kind.as_str();
    let columns = RECORD_FIELDS
        .map(|field| format!("{p}_{field}"))
        .join(", ");
    let binds = (1..=RECORD_FIELDS.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({columns}) VALUES ({binds}) RETURNING {p}_id",
        record_table(kind)
    )
}

fn record_update_sql(kind: EntityKind) -> String {
    let p = kind.as_str();
    let sets = RECORD_UPDATE_FIELDS
        .iter()
        .enumerate()
        .map(|(i, field)| format!("{p}_{field} = ${}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let id_bind = RECORD_UPDATE_FIELDS.len() + 1;
    let version_bind = RECORD_UPDATE_FIELDS.len() + 2;
    format!(
        "UPDATE {} SET {sets} WHERE {p}_id = ${id_bind} AND {p}_version = ${version_bind}",
        record_table(kind)
    )
}

// ─── Reprint rows ────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct ReprintRow {
    id: Uuid,
    monk_id: Option<i64>,
    nun_id: Option<i64>,
    high_ordination_monk_id: Option<i64>,
    combined_high_ordination_monk_id: Option<i64>,
    status: String,
    amount_cents: i64,
    remarks: Option<String>,
    requested_by: String,
    requested_at: DateTime<Utc>,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    rejected_by: Option<String>,
    rejected_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    printed_by: Option<String>,
    printed_at: Option<DateTime<Utc>>,
    completed_by: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    version: i64,
    transition_log: serde_json::Value,
}

impl ReprintRow {
    fn into_request(self) -> Result<ReprintRequest, RegistryError> {
        let entity = format!("reprint:{}", self.id);
        let subject = ReprintSubject::from_options(
            self.monk_id.map(RecordId),
            self.nun_id.map(RecordId),
            self.high_ordination_monk_id.map(RecordId),
            self.combined_high_ordination_monk_id.map(RecordId),
        )
        .map_err(|e| corrupt(&entity, "subject", e))?;
        let status =
            ReprintStatus::from_str(&self.status).map_err(|e| corrupt(&entity, "status", e))?;
        let requested_by =
            ActorId::new(self.requested_by).map_err(|e| corrupt(&entity, "requested_by", e))?;
        let transitions: Vec<ReprintTransitionRecord> =
            from_json(&entity, "transition_log", self.transition_log)?;

        Ok(ReprintRequest {
            id: ReprintId(self.id),
            subject,
            status,
            amount_cents: self.amount_cents,
            remarks: self.remarks,
            requested: ActorStamp::new(requested_by, Timestamp::from_utc(self.requested_at)),
            approved: decode_stamp(&entity, "approved", self.approved_by, self.approved_at)?,
            rejected: decode_stamp(&entity, "rejected", self.rejected_by, self.rejected_at)?,
            rejection_reason: self.rejection_reason,
            printed: decode_stamp(&entity, "printed", self.printed_by, self.printed_at)?,
            completed: decode_stamp(&entity, "completed", self.completed_by, self.completed_at)?,
            version: self.version as u64,
            transitions,
        })
    }
}

const REPRINT_COLUMNS: &str = "id, monk_id, nun_id, high_ordination_monk_id, \
     combined_high_ordination_monk_id, status, amount_cents, remarks, \
     requested_by, requested_at, approved_by, approved_at, rejected_by, \
     rejected_at, rejection_reason, printed_by, printed_at, completed_by, \
     completed_at, version, transition_log";

// ─── Objection rows ──────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct ObjectionRow {
    id: Uuid,
    temple_id: Option<i64>,
    arama_id: Option<i64>,
    devala_id: Option<i64>,
    monk_id: Option<i64>,
    nun_id: Option<i64>,
    high_ordination_monk_id: Option<i64>,
    combined_high_ordination_monk_id: Option<i64>,
    objection_type: String,
    grounds: String,
    requester_name: String,
    requester_contact: Option<String>,
    status: String,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
    filed_by: String,
    filed_at: DateTime<Utc>,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    rejected_by: Option<String>,
    rejected_at: Option<DateTime<Utc>>,
    cancelled_by: Option<String>,
    cancelled_at: Option<DateTime<Utc>>,
    decision_reason: Option<String>,
    version: i64,
    transition_log: serde_json::Value,
}

impl ObjectionRow {
    fn into_objection(self) -> Result<Objection, RegistryError> {
        let entity = format!("objection:{}", self.id);
        let subject = subject_from_refs(
            &entity,
            [
                self.temple_id,
                self.arama_id,
                self.devala_id,
                self.monk_id,
                self.nun_id,
                self.high_ordination_monk_id,
                self.combined_high_ordination_monk_id,
            ],
        )?;
        let status =
            ObjectionStatus::from_str(&self.status).map_err(|e| corrupt(&entity, "status", e))?;
        let filed_by = ActorId::new(self.filed_by).map_err(|e| corrupt(&entity, "filed_by", e))?;
        let transitions = from_json(&entity, "transition_log", self.transition_log)?;

        Ok(Objection {
            id: ObjectionId(self.id),
            subject,
            objection_type: self.objection_type,
            grounds: self.grounds,
            requester_name: self.requester_name,
            requester_contact: self.requester_contact,
            status,
            valid_from: self.valid_from.map(Timestamp::from_utc),
            valid_until: self.valid_until.map(Timestamp::from_utc),
            filed: ActorStamp::new(filed_by, Timestamp::from_utc(self.filed_at)),
            approved: decode_stamp(&entity, "approved", self.approved_by, self.approved_at)?,
            rejected: decode_stamp(&entity, "rejected", self.rejected_by, self.rejected_at)?,
            cancelled: decode_stamp(&entity, "cancelled", self.cancelled_by, self.cancelled_at)?,
            decision_reason: self.decision_reason,
            version: self.version as u64,
            transitions,
        })
    }
}

const OBJECTION_COLUMNS: &str = "id, temple_id, arama_id, devala_id, monk_id, nun_id, \
     high_ordination_monk_id, combined_high_ordination_monk_id, objection_type, \
     grounds, requester_name, requester_contact, status, valid_from, valid_until, \
     filed_by, filed_at, approved_by, approved_at, rejected_by, rejected_at, \
     cancelled_by, cancelled_at, decision_reason, version, transition_log";

// ─── CAS primitives ──────────────────────────────────────────────────

async fn record_cas(
    conn: &mut PgConnection,
    record: &RegistrationRecord,
    read_version: u64,
) -> Result<(), RegistryError> {
    let extension = to_json("extension", &record.extension)?;
    let log = to_json("transition_log", &record.transitions)?;
    let (submitted_by, submitted_at) = stamp_cols(&record.submitted);
    let (approved_by, approved_at) = stamp_cols(&record.approved);
    let (rejected_by, rejected_at) = stamp_cols(&record.rejected);
    let (printed_by, printed_at) = stamp_cols(&record.printed);
    let (scanned_by, scanned_at) = stamp_cols(&record.scanned);
    let (completed_by, completed_at) = stamp_cols(&record.completed);

    let sql = record_update_sql(record.kind);
    let result = sqlx::query(&sql)
        .bind(record.status.as_str())
        .bind(record.approval.map(|a| a.as_str()))
        .bind(submitted_by)
        .bind(submitted_at)
        .bind(approved_by)
        .bind(approved_at)
        .bind(rejected_by)
        .bind(rejected_at)
        .bind(record.rejection_reason.as_deref())
        .bind(printed_by)
        .bind(printed_at)
        .bind(scanned_by)
        .bind(scanned_at)
        .bind(record.scanned_document.as_ref().map(|d| d.as_str()))
        .bind(completed_by)
        .bind(completed_at)
        .bind(&extension)
        .bind(record.is_deleted)
        .bind(record.version as i64)
        .bind(&log)
        .bind(record.id.0)
        .bind(read_version as i64)
        .execute(&mut *conn)
        .await
        .map_err(|e| storage_err("update record", e))?;

    if result.rows_affected() == 0 {
        let p = record.kind.as_str();
        let sql = format!(
            "SELECT {p}_version FROM {} WHERE {p}_id = $1",
            record_table(record.kind)
        );
        let stored: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(record.id.0)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| storage_err("check record version", e))?;
        return Err(match stored {
            Some((version,)) => RegistryError::StaleVersion {
                expected: read_version,
                actual: version as u64,
            },
            None => RegistryError::ReferentialIntegrity(format!(
                "{} does not exist",
                record.handle()
            )),
        });
    }
    Ok(())
}

async fn reprint_cas(
    conn: &mut PgConnection,
    request: &ReprintRequest,
    read_version: u64,
) -> Result<(), RegistryError> {
    let log = to_json("transition_log", &request.transitions)?;
    let (approved_by, approved_at) = stamp_cols(&request.approved);
    let (rejected_by, rejected_at) = stamp_cols(&request.rejected);
    let (printed_by, printed_at) = stamp_cols(&request.printed);
    let (completed_by, completed_at) = stamp_cols(&request.completed);

    let result = sqlx::query(
        "UPDATE reprint_requests SET status = $1, approved_by = $2, approved_at = $3, \
            rejected_by = $4, rejected_at = $5, rejection_reason = $6, printed_by = $7, \
            printed_at = $8, completed_by = $9, completed_at = $10, version = $11, \
            transition_log = $12 \
         WHERE id = $13 AND version = $14",
    )
    .bind(request.status.as_str())
    .bind(approved_by)
    .bind(approved_at)
    .bind(rejected_by)
    .bind(rejected_at)
    .bind(request.rejection_reason.as_deref())
    .bind(printed_by)
    .bind(printed_at)
    .bind(completed_by)
    .bind(completed_at)
    .bind(request.version as i64)
    .bind(&log)
    .bind(request.id.0)
    .bind(read_version as i64)
    .execute(&mut *conn)
    .await
    .map_err(|e| storage_err("update reprint", e))?;

    if result.rows_affected() == 0 {
        let stored: Option<(i64,)> =
            sqlx::query_as("SELECT version FROM reprint_requests WHERE id = $1")
                .bind(request.id.0)
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| storage_err("check reprint version", e))?;
        return Err(match stored {
            Some((version,)) => RegistryError::StaleVersion {
                expected: read_version,
                actual: version as u64,
            },
            None => RegistryError::ReferentialIntegrity(format!("{} does not exist", request.id)),
        });
    }
    Ok(())
}

/// Load the subject's objections inside the caller's transaction,
/// row-locked so a concurrent objection decision serializes against the
/// commit.
async fn lock_objections(
    conn: &mut PgConnection,
    subject: EntityHandle,
) -> Result<Vec<Objection>, RegistryError> {
    let sql = format!(
        "SELECT {OBJECTION_COLUMNS} FROM objections WHERE {} = $1 FOR UPDATE",
        reference_column(subject.kind)
    );
    let rows: Vec<ObjectionRow> = sqlx::query_as(&sql)
        .bind(subject.id.0)
        .fetch_all(conn)
        .await
        .map_err(|e| storage_err("lock objections", e))?;
    rows.into_iter().map(ObjectionRow::into_objection).collect()
}

// ─── RecordStore implementation ──────────────────────────────────────

impl RecordStore for PgStore {
    async fn insert_record(
        &self,
        mut draft: RegistrationRecord,
    ) -> Result<RegistrationRecord, RegistryError> {
        let extension = to_json("extension", &draft.extension)?;
        let log = to_json("transition_log", &draft.transitions)?;
        let sql = record_insert_sql(draft.kind);

        let (submitted_by, submitted_at) = stamp_cols(&draft.submitted);
        let (approved_by, approved_at) = stamp_cols(&draft.approved);
        let (rejected_by, rejected_at) = stamp_cols(&draft.rejected);
        let (printed_by, printed_at) = stamp_cols(&draft.printed);
        let (scanned_by, scanned_at) = stamp_cols(&draft.scanned);
        let (completed_by, completed_at) = stamp_cols(&draft.completed);

        let (id,): (i64,) = sqlx::query_as(&sql)
            .bind(draft.code.as_str())
            .bind(draft.status.as_str())
            .bind(draft.approval.map(|a| a.as_str()))
            .bind(draft.created.by.as_str())
            .bind(draft.created.at.as_datetime())
            .bind(draft.created_by_location.as_deref())
            .bind(submitted_by)
            .bind(submitted_at)
            .bind(approved_by)
            .bind(approved_at)
            .bind(rejected_by)
            .bind(rejected_at)
            .bind(draft.rejection_reason.as_deref())
            .bind(printed_by)
            .bind(printed_at)
            .bind(scanned_by)
            .bind(scanned_at)
            .bind(draft.scanned_document.as_ref().map(|d| d.as_str()))
            .bind(completed_by)
            .bind(completed_at)
            .bind(&extension)
            .bind(draft.is_deleted)
            .bind(draft.version as i64)
            .bind(&log)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    RegistryError::validation(
                        "registration_code",
                        format!(
                            "{} is already registered for a {} record",
                            draft.code, draft.kind
                        ),
                    )
                }
                _ => storage_err("insert record", e),
            })?;

        draft.id = RecordId(id);
        Ok(draft)
    }

    async fn fetch_record(
        &self,
        handle: EntityHandle,
    ) -> Result<Option<RegistrationRecord>, RegistryError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {}_id = $1",
            record_select_list(handle.kind),
            record_table(handle.kind),
            handle.kind.as_str()
        );
        let row: Option<RecordRow> = sqlx::query_as(&sql)
            .bind(handle.id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_err("fetch record", e))?;
        row.map(|row| row.into_record(handle.kind)).transpose()
    }

    async fn update_record(
        &self,
        record: &RegistrationRecord,
        read_version: u64,
    ) -> Result<(), RegistryError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| storage_err("acquire connection", e))?;
        record_cas(&mut conn, record, read_version).await
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
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_err("begin screened update", e))?;
        let objections = lock_objections(&mut tx, subject).await?;
        let screen = ObjectionScreen::new(catalogue, &objections);
        if let Some(notice) = screen.blocking(subject, operation, at) {
            // tx drops here and rolls back
            return Err(notice.into_error());
        }
        record_cas(&mut tx, record, read_version).await?;
        tx.commit()
            .await
            .map_err(|e| storage_err("commit screened update", e))
    }

    async fn list_records(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<RegistrationRecord>, RegistryError> {
        let p = kind.as_str();
        let sql = format!(
            "SELECT {} FROM {} WHERE NOT {p}_is_deleted ORDER BY {p}_id",
            record_select_list(kind),
            record_table(kind)
        );
        let rows: Vec<RecordRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_err("list records", e))?;
        rows.into_iter().map(|row| row.into_record(kind)).collect()
    }

    async fn purge_record(&self, handle: EntityHandle) -> Result<(), RegistryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_err("begin purge", e))?;

        let sql = format!(
            "DELETE FROM objections WHERE {} = $1",
            reference_column(handle.kind)
        );
        sqlx::query(&sql)
            .bind(handle.id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_err("purge objections", e))?;

        if handle.kind.is_personnel() {
            let sql = format!(
                "DELETE FROM reprint_requests WHERE {} = $1",
                reference_column(handle.kind)
            );
            sqlx::query(&sql)
                .bind(handle.id.0)
                .execute(&mut *tx)
                .await
                .map_err(|e| storage_err("purge reprints", e))?;
        }

        let sql = format!(
            "DELETE FROM {} WHERE {}_id = $1",
            record_table(handle.kind),
            handle.kind.as_str()
        );
        let result = sqlx::query(&sql)
            .bind(handle.id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_err("purge record", e))?;
        if result.rows_affected() == 0 {
            // tx drops here and rolls back
            return Err(RegistryError::ReferentialIntegrity(format!(
                "{handle} does not exist"
            )));
        }

        tx.commit().await.map_err(|e| storage_err("commit purge", e))
    }

    async fn insert_reprint(&self, request: ReprintRequest) -> Result<(), RegistryError> {
        let log = to_json("transition_log", &request.transitions)?;
        let [monk, nun, hom, chom] = subject_refs(request.subject);
        let (approved_by, approved_at) = stamp_cols(&request.approved);
        let (rejected_by, rejected_at) = stamp_cols(&request.rejected);
        let (printed_by, printed_at) = stamp_cols(&request.printed);
        let (completed_by, completed_at) = stamp_cols(&request.completed);

        sqlx::query(
            "INSERT INTO reprint_requests (id, monk_id, nun_id, high_ordination_monk_id, \
                combined_high_ordination_monk_id, status, amount_cents, remarks, \
                requested_by, requested_at, approved_by, approved_at, rejected_by, \
                rejected_at, rejection_reason, printed_by, printed_at, completed_by, \
                completed_at, version, transition_log) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                $16, $17, $18, $19, $20, $21)",
        )
        .bind(request.id.0)
        .bind(monk)
        .bind(nun)
        .bind(hom)
        .bind(chom)
        .bind(request.status.as_str())
        .bind(request.amount_cents)
        .bind(request.remarks.as_deref())
        .bind(request.requested.by.as_str())
        .bind(request.requested.at.as_datetime())
        .bind(approved_by)
        .bind(approved_at)
        .bind(rejected_by)
        .bind(rejected_at)
        .bind(request.rejection_reason.as_deref())
        .bind(printed_by)
        .bind(printed_at)
        .bind(completed_by)
        .bind(completed_at)
        .bind(request.version as i64)
        .bind(&log)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_err("insert reprint", e))?;
        Ok(())
    }

    async fn fetch_reprint(&self, id: ReprintId) -> Result<Option<ReprintRequest>, RegistryError> {
        let sql = format!("SELECT {REPRINT_COLUMNS} FROM reprint_requests WHERE id = $1");
        let row: Option<ReprintRow> = sqlx::query_as(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_err("fetch reprint", e))?;
        row.map(ReprintRow::into_request).transpose()
    }

    async fn update_reprint(
        &self,
        request: &ReprintRequest,
        read_version: u64,
    ) -> Result<(), RegistryError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| storage_err("acquire connection", e))?;
        reprint_cas(&mut conn, request, read_version).await
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
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_err("begin screened update", e))?;
        let objections = lock_objections(&mut tx, subject).await?;
        let screen = ObjectionScreen::new(catalogue, &objections);
        if let Some(notice) = screen.blocking(subject, operation, at) {
            // tx drops here and rolls back
            return Err(notice.into_error());
        }
        reprint_cas(&mut tx, request, read_version).await?;
        tx.commit()
            .await
            .map_err(|e| storage_err("commit screened update", e))
    }

    async fn reprints_for(
        &self,
        handle: EntityHandle,
    ) -> Result<Vec<ReprintRequest>, RegistryError> {
        if !handle.kind.is_personnel() {
            // institutions have no credential to reprint
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {REPRINT_COLUMNS} FROM reprint_requests WHERE {} = $1",
            reference_column(handle.kind)
        );
        let rows: Vec<ReprintRow> = sqlx::query_as(&sql)
            .bind(handle.id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_err("list reprints", e))?;
        rows.into_iter().map(ReprintRow::into_request).collect()
    }

    async fn insert_objection(&self, objection: Objection) -> Result<(), RegistryError> {
        let log = to_json("transition_log", &objection.transitions)?;
        let [temple, arama, devala, monk, nun, hom, chom] = objection_refs(objection.subject);
        let (approved_by, approved_at) = stamp_cols(&objection.approved);
        let (rejected_by, rejected_at) = stamp_cols(&objection.rejected);
        let (cancelled_by, cancelled_at) = stamp_cols(&objection.cancelled);

        sqlx::query(
            "INSERT INTO objections (id, temple_id, arama_id, devala_id, monk_id, nun_id, \
                high_ordination_monk_id, combined_high_ordination_monk_id, objection_type, \
                grounds, requester_name, requester_contact, status, valid_from, valid_until, \
                filed_by, filed_at, approved_by, approved_at, rejected_by, rejected_at, \
                cancelled_by, cancelled_at, decision_reason, version, transition_log) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)",
        )
        .bind(objection.id.0)
        .bind(temple)
        .bind(arama)
        .bind(devala)
        .bind(monk)
        .bind(nun)
        .bind(hom)
        .bind(chom)
        .bind(&objection.objection_type)
        .bind(&objection.grounds)
        .bind(&objection.requester_name)
        .bind(objection.requester_contact.as_deref())
        .bind(objection.status.as_str())
        .bind(objection.valid_from.map(|t| *t.as_datetime()))
        .bind(objection.valid_until.map(|t| *t.as_datetime()))
        .bind(objection.filed.by.as_str())
        .bind(objection.filed.at.as_datetime())
        .bind(approved_by)
        .bind(approved_at)
        .bind(rejected_by)
        .bind(rejected_at)
        .bind(cancelled_by)
        .bind(cancelled_at)
        .bind(objection.decision_reason.as_deref())
        .bind(objection.version as i64)
        .bind(&log)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_err("insert objection", e))?;
        Ok(())
    }

    async fn fetch_objection(&self, id: ObjectionId) -> Result<Option<Objection>, RegistryError> {
        let sql = format!("SELECT {OBJECTION_COLUMNS} FROM objections WHERE id = $1");
        let row: Option<ObjectionRow> = sqlx::query_as(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_err("fetch objection", e))?;
        row.map(ObjectionRow::into_objection).transpose()
    }

    async fn update_objection(
        &self,
        objection: &Objection,
        read_version: u64,
    ) -> Result<(), RegistryError> {
        let log = to_json("transition_log", &objection.transitions)?;
        let (approved_by, approved_at) = stamp_cols(&objection.approved);
        let (rejected_by, rejected_at) = stamp_cols(&objection.rejected);
        let (cancelled_by, cancelled_at) = stamp_cols(&objection.cancelled);

        let result = sqlx::query(
            "UPDATE objections SET status = $1, approved_by = $2, approved_at = $3, \
                rejected_by = $4, rejected_at = $5, cancelled_by = $6, cancelled_at = $7, \
                decision_reason = $8, version = $9, transition_log = $10 \
             WHERE id = $11 AND version = $12",
        )
        .bind(objection.status.as_str())
        .bind(approved_by)
        .bind(approved_at)
        .bind(rejected_by)
        .bind(rejected_at)
        .bind(cancelled_by)
        .bind(cancelled_at)
        .bind(objection.decision_reason.as_deref())
        .bind(objection.version as i64)
        .bind(&log)
        .bind(objection.id.0)
        .bind(read_version as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_err("update objection", e))?;

        if result.rows_affected() == 0 {
            let stored: Option<(i64,)> =
                sqlx::query_as("SELECT version FROM objections WHERE id = $1")
                    .bind(objection.id.0)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| storage_err("check objection version", e))?;
            return Err(match stored {
                Some((version,)) => RegistryError::StaleVersion {
                    expected: read_version,
                    actual: version as u64,
                },
                None => {
                    RegistryError::ReferentialIntegrity(format!("{} does not exist", objection.id))
                }
            });
        }
        Ok(())
    }

    async fn objections_for(&self, handle: EntityHandle) -> Result<Vec<Objection>, RegistryError> {
        let sql = format!(
            "SELECT {OBJECTION_COLUMNS} FROM objections WHERE {} = $1",
            reference_column(handle.kind)
        );
        let rows: Vec<ObjectionRow> = sqlx::query_as(&sql)
            .bind(handle.id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_err("list objections", e))?;
        rows.into_iter().map(ObjectionRow::into_objection).collect()
    }
}

// ─── Tests (pure helpers; DB round-trips run against a live database) ─
