//! # Registration Record Routes
//!
//! Record creation, the administrator attention queue, the workflow
//! transitions, resident management, and the objection-screen query.
//!
//! Every mutating request carries the caller's actor id and the record
//! version it read; a lost race comes back `409` with the stored
//! version in the body.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use sasana_core::{BlockedOperation, DocumentRef, ObjectionNotice, Timestamp};
use sasana_objection::Objection;
use sasana_registry::RecordStore;
use sasana_workflow::{RegistrationRecord, ReprintRequest};

use crate::error::AppError;
use crate::routes::{actor_context, parse_actor, parse_handle, parse_kind};
use crate::state::AppState;

pub fn router<S: RecordStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/v1/records/{kind}", post(create::<S>).get(queue::<S>))
        .route(
            "/v1/records/{kind}/{id}",
            get(fetch::<S>).delete(remove::<S>),
        )
        .route("/v1/records/{kind}/{id}/submit", post(submit::<S>))
        .route("/v1/records/{kind}/{id}/approve", post(approve::<S>))
        .route("/v1/records/{kind}/{id}/reject", post(reject::<S>))
        .route("/v1/records/{kind}/{id}/resubmit", post(resubmit::<S>))
        .route("/v1/records/{kind}/{id}/print", post(print::<S>))
        .route("/v1/records/{kind}/{id}/scan", post(scan::<S>))
        .route("/v1/records/{kind}/{id}/complete", post(complete::<S>))
        .route("/v1/records/{kind}/{id}/residents", post(add_resident::<S>))
        .route(
            "/v1/records/{kind}/{id}/objections",
            get(list_objections::<S>),
        )
        .route("/v1/records/{kind}/{id}/reprints", get(list_reprints::<S>))
        .route("/v1/records/{kind}/{id}/blocking", get(blocking::<S>))
}

// ─── Request/response bodies ─────────────────────────────────────────

/// Request to create a record. The code comes from the external
/// code-generator collaborator.
#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub code: String,
    pub actor: String,
    pub location: Option<String>,
}

/// A plain transition: who, against which read version.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub actor: String,
    pub version: u64,
}

/// A decision transition that carries a mandatory reason.
#[derive(Debug, Deserialize)]
pub struct ReasonedTransitionRequest {
    pub actor: String,
    pub version: u64,
    pub reason: String,
}

/// The scan transition, carrying the stored document reference.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub actor: String,
    pub version: u64,
    pub document: String,
}

/// Request to register a resident on a communal residence record.
#[derive(Debug, Deserialize)]
pub struct AddResidentRequest {
    pub actor: String,
    pub version: u64,
    pub resident_kind: String,
    pub resident_id: i64,
}

/// Query for the objection-screen check.
#[derive(Debug, Deserialize)]
pub struct BlockingQuery {
    /// `REPRINT_APPROVAL` or `ADD_RESIDENT`.
    pub operation: String,
    /// RFC 3339 instant to evaluate at; defaults to now.
    pub at: Option<String>,
}

/// Answer to the objection-screen check.
#[derive(Debug, Serialize)]
pub struct BlockingResponse {
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objection: Option<ObjectionNotice>,
}

// ─── Handlers ────────────────────────────────────────────────────────

async fn create<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(kind): Path<String>,
    Json(body): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<RegistrationRecord>), AppError> {
    let kind = parse_kind(&kind)?;
    let ctx = actor_context(&body.actor, body.location)?;
    let record = state.service().create_record(kind, &body.code, ctx).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn queue<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<RegistrationRecord>>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.service().list_queue(kind).await?))
}

async fn fetch<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Json<RegistrationRecord>, AppError> {
    let handle = parse_handle(&kind, id)?;
    Ok(Json(state.service().resolve(handle).await?))
}

async fn submit<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<RegistrationRecord>, AppError> {
    let handle = parse_handle(&kind, id)?;
    let record = state
        .service()
        .submit_record(handle, body.version, parse_actor(&body.actor)?)
        .await?;
    Ok(Json(record))
}

async fn approve<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<RegistrationRecord>, AppError> {
    let handle = parse_handle(&kind, id)?;
    let record = state
        .service()
        .approve_record(handle, body.version, parse_actor(&body.actor)?)
        .await?;
    Ok(Json(record))
}

async fn reject<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<ReasonedTransitionRequest>,
) -> Result<Json<RegistrationRecord>, AppError> {
    let handle = parse_handle(&kind, id)?;
    let record = state
        .service()
        .reject_record(handle, body.version, parse_actor(&body.actor)?, &body.reason)
        .await?;
    Ok(Json(record))
}

async fn resubmit<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<RegistrationRecord>, AppError> {
    let handle = parse_handle(&kind, id)?;
    let record = state
        .service()
        .resubmit_record(handle, body.version, parse_actor(&body.actor)?)
        .await?;
    Ok(Json(record))
}

async fn print<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<RegistrationRecord>, AppError> {
    let handle = parse_handle(&kind, id)?;
    let record = state
        .service()
        .print_record(handle, body.version, parse_actor(&body.actor)?)
        .await?;
    Ok(Json(record))
}

async fn scan<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<ScanRequest>,
) -> Result<Json<RegistrationRecord>, AppError> {
    let handle = parse_handle(&kind, id)?;
    let document = DocumentRef::new(body.document)?;
    let record = state
        .service()
        .scan_record(handle, body.version, parse_actor(&body.actor)?, document)
        .await?;
    Ok(Json(record))
}

async fn complete<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<RegistrationRecord>, AppError> {
    let handle = parse_handle(&kind, id)?;
    let record = state
        .service()
        .complete_record(handle, body.version, parse_actor(&body.actor)?)
        .await?;
    Ok(Json(record))
}

async fn remove<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<RegistrationRecord>, AppError> {
    let handle = parse_handle(&kind, id)?;
    let record = state
        .service()
        .delete_record(handle, body.version, parse_actor(&body.actor)?)
        .await?;
    Ok(Json(record))
}

async fn add_resident<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<AddResidentRequest>,
) -> Result<Json<RegistrationRecord>, AppError> {
    let arama = parse_handle(&kind, id)?;
    let resident = parse_handle(&body.resident_kind, body.resident_id)?;
    let record = state
        .service()
        .add_resident(arama, resident, body.version, parse_actor(&body.actor)?)
        .await?;
    Ok(Json(record))
}

async fn list_objections<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Json<Vec<Objection>>, AppError> {
    let handle = parse_handle(&kind, id)?;
    // the subject must exist; objections remain on file after soft
    // deletion, so the check allows deleted records
    state.service().get_record(handle).await?;
    Ok(Json(state.service().objections_for(handle).await?))
}

async fn list_reprints<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Json<Vec<ReprintRequest>>, AppError> {
    let handle = parse_handle(&kind, id)?;
    state.service().get_record(handle).await?;
    Ok(Json(state.service().reprints_for(handle).await?))
}

async fn blocking<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    Query(query): Query<BlockingQuery>,
) -> Result<Json<BlockingResponse>, AppError> {
    let handle = parse_handle(&kind, id)?;
    let operation: BlockedOperation = query
        .operation
        .parse()
        .map_err(|e: sasana_core::RegistryError| AppError::BadRequest(e.to_string()))?;
    let at = match query.at.as_deref() {
        Some(raw) => Timestamp::parse(raw)?,
        None => Timestamp::now(),
    };
    let notice = state.service().is_blocking(handle, operation, at).await?;
    Ok(Json(BlockingResponse {
        blocked: notice.is_some(),
        objection: notice,
    }))
}
