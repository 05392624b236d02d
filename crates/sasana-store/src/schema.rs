//! Schema definition and startup migration.
//!
//! Column names in the per-kind tables carry the kind prefix
//! (`monk_code`, `monk_status`, ...); the adapter aliases them back to
//! the shared field names on read. The two shared tables reference
//! records through discriminated nullable columns with an exactly-one
//! check constraint.
//!
//! All DDL is idempotent (`IF NOT EXISTS`); [`ensure_schema`] runs at
//! startup and is a no-op on an already-provisioned database.

use sqlx::PgPool;

use sasana_core::EntityKind;

/// The record table for a kind, e.g. `monk_records`.
///
/// Table names come from [`EntityKind::as_str`], never from user input.
pub fn record_table(kind: EntityKind) -> String {
    format!("{}_records", kind.as_str())
}

/// Record fields in persisted column order, surrogate id excluded.
pub(crate) const RECORD_FIELDS: [&str; 24] = [
    "code",
    "status",
    "approval",
    "created_by",
    "created_at",
    "created_by_location",
    "submitted_by",
    "submitted_at",
    "approved_by",
    "approved_at",
    "rejected_by",
    "rejected_at",
    "rejection_reason",
    "printed_by",
    "printed_at",
    "scanned_by",
    "scanned_at",
    "scanned_document",
    "completed_by",
    "completed_at",
    "extension",
    "is_deleted",
    "version",
    "transition_log",
];

/// The fields a CAS update rewrites, in bind order.
pub(crate) const RECORD_UPDATE_FIELDS: [&str; 20] = [
    "status",
    "approval",
    "submitted_by",
    "submitted_at",
    "approved_by",
    "approved_at",
    "rejected_by",
    "rejected_at",
    "rejection_reason",
    "printed_by",
    "printed_at",
    "scanned_by",
    "scanned_at",
    "scanned_document",
    "completed_by",
    "completed_at",
    "extension",
    "is_deleted",
    "version",
    "transition_log",
];

/// The shared tables' reference column for a kind.
///
/// Matches the per-kind surrogate column name, e.g. `monk_id`.
pub(crate) fn reference_column(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Temple => "temple_id",
        EntityKind::Arama => "arama_id",
        EntityKind::Devala => "devala_id",
        EntityKind::Monk => "monk_id",
        EntityKind::Nun => "nun_id",
        EntityKind::HighOrdinationMonk => "high_ordination_monk_id",
        EntityKind::CombinedHighOrdinationMonk => "combined_high_ordination_monk_id",
    }
}

/// DDL for one per-kind record table and its live-code unique index.
///
/// The unique index is partial: soft-deleted rows keep their code but no
/// longer reserve it.
fn record_table_ddl(kind: EntityKind) -> String {
    let table = record_table(kind);
    let p = kind.as_str();
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            {p}_id                  BIGSERIAL PRIMARY KEY,
            {p}_code                TEXT NOT NULL,
            {p}_status              TEXT NOT NULL,
            {p}_approval            TEXT,
            {p}_created_by          TEXT NOT NULL,
            {p}_created_at          TIMESTAMPTZ NOT NULL,
            {p}_created_by_location TEXT,
            {p}_submitted_by        TEXT,
            {p}_submitted_at        TIMESTAMPTZ,
            {p}_approved_by         TEXT,
            {p}_approved_at         TIMESTAMPTZ,
            {p}_rejected_by         TEXT,
            {p}_rejected_at         TIMESTAMPTZ,
            {p}_rejection_reason    TEXT,
            {p}_printed_by          TEXT,
            {p}_printed_at          TIMESTAMPTZ,
            {p}_scanned_by          TEXT,
            {p}_scanned_at          TIMESTAMPTZ,
            {p}_scanned_document    TEXT,
            {p}_completed_by        TEXT,
            {p}_completed_at        TIMESTAMPTZ,
            {p}_extension           JSONB NOT NULL,
            {p}_is_deleted          BOOLEAN NOT NULL DEFAULT FALSE,
            {p}_version             BIGINT NOT NULL,
            {p}_transition_log      JSONB NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS {table}_live_code
            ON {table} ({p}_code) WHERE NOT {p}_is_deleted;"
    )
}

/// DDL for the shared reprint request table.
///
/// The check constraint is the SQL image of the `ReprintSubject` sum
/// type: exactly one personnel reference per row.
const REPRINT_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS reprint_requests (
        id                               UUID PRIMARY KEY,
        monk_id                          BIGINT,
        nun_id                           BIGINT,
        high_ordination_monk_id          BIGINT,
        combined_high_ordination_monk_id BIGINT,
        status                           TEXT NOT NULL,
        amount_cents                     BIGINT NOT NULL,
        remarks                          TEXT,
        requested_by                     TEXT NOT NULL,
        requested_at                     TIMESTAMPTZ NOT NULL,
        approved_by                      TEXT,
        approved_at                      TIMESTAMPTZ,
        rejected_by                      TEXT,
        rejected_at                      TIMESTAMPTZ,
        rejection_reason                 TEXT,
        printed_by                       TEXT,
        printed_at                       TIMESTAMPTZ,
        completed_by                     TEXT,
        completed_at                     TIMESTAMPTZ,
        version                          BIGINT NOT NULL,
        transition_log                   JSONB NOT NULL,
        CHECK (num_nonnulls(monk_id, nun_id, high_ordination_monk_id,
                            combined_high_ordination_monk_id) = 1)
    );";

/// DDL for the shared objection table.
///
/// One nullable reference column per entity kind, exactly one set; a
/// partial index per column serves the subject lookups.
const OBJECTION_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS objections (
        id                               UUID PRIMARY KEY,
        temple_id                        BIGINT,
        arama_id                         BIGINT,
        devala_id                        BIGINT,
        monk_id                          BIGINT,
        nun_id                           BIGINT,
        high_ordination_monk_id          BIGINT,
        combined_high_ordination_monk_id BIGINT,
        objection_type                   TEXT NOT NULL,
        grounds                          TEXT NOT NULL,
        requester_name                   TEXT NOT NULL,
        requester_contact                TEXT,
        status                           TEXT NOT NULL,
        valid_from                       TIMESTAMPTZ,
        valid_until                      TIMESTAMPTZ,
        filed_by                         TEXT NOT NULL,
        filed_at                         TIMESTAMPTZ NOT NULL,
        approved_by                      TEXT,
        approved_at                      TIMESTAMPTZ,
        rejected_by                      TEXT,
        rejected_at                      TIMESTAMPTZ,
        cancelled_by                     TEXT,
        cancelled_at                     TIMESTAMPTZ,
        decision_reason                  TEXT,
        version                          BIGINT NOT NULL,
        transition_log                   JSONB NOT NULL,
        CHECK (num_nonnulls(temple_id, arama_id, devala_id, monk_id, nun_id,
                            high_ordination_monk_id,
                            combined_high_ordination_monk_id) = 1)
    );";

fn objection_index_ddl(kind: EntityKind) -> String {
    let column = reference_column(kind);
    format!(
        "CREATE INDEX IF NOT EXISTS objections_{column}
            ON objections ({column}) WHERE {column} IS NOT NULL;"
    )
}

/// Create every table and index the store needs, if absent.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for kind in EntityKind::ALL {
        sqlx::raw_sql(&record_table_ddl(kind)).execute(pool).await?;
    }
    sqlx::raw_sql(REPRINT_TABLE_DDL).execute(pool).await?;
    sqlx::raw_sql(OBJECTION_TABLE_DDL).execute(pool).await?;
    for kind in EntityKind::ALL {
        sqlx::raw_sql(&objection_index_ddl(kind))
            .execute(pool)
            .await?;
    }
    tracing::info!("database schema ensured");
    Ok(())
}
