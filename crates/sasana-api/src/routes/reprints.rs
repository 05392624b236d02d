//! # Credential Reprint Routes
//!
//! Raising and deciding reprint requests. Approval is where the
//! objection screen bites: an in-force REPRINT_RESTRICTION against the
//! credential holder comes back `409` with the objection's grounds and
//! requester in the body.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use sasana_core::{ReprintId, ReprintSubject};
use sasana_registry::RecordStore;
use sasana_workflow::ReprintRequest;

use crate::error::AppError;
use crate::routes::{actor_context, parse_actor, parse_handle};
use crate::state::AppState;

pub fn router<S: RecordStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/v1/reprints", post(create::<S>))
        .route("/v1/reprints/{id}", get(fetch::<S>))
        .route("/v1/reprints/{id}/approve", post(approve::<S>))
        .route("/v1/reprints/{id}/reject", post(reject::<S>))
        .route("/v1/reprints/{id}/print", post(print::<S>))
        .route("/v1/reprints/{id}/complete", post(complete::<S>))
}

/// Request to raise a reprint. The subject names exactly one personnel
/// record; the fee is integer rupee cents.
#[derive(Debug, Deserialize)]
pub struct CreateReprintRequest {
    pub subject_kind: String,
    pub subject_id: i64,
    pub amount_cents: i64,
    pub remarks: Option<String>,
    pub actor: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub actor: String,
    pub version: u64,
}

#[derive(Debug, Deserialize)]
pub struct ReasonedTransitionRequest {
    pub actor: String,
    pub version: u64,
    pub reason: String,
}

async fn create<S: RecordStore>(
    State(state): State<AppState<S>>,
    Json(body): Json<CreateReprintRequest>,
) -> Result<(StatusCode, Json<ReprintRequest>), AppError> {
    let handle = parse_handle(&body.subject_kind, body.subject_id)?;
    let subject = ReprintSubject::from_handle(handle)?;
    let ctx = actor_context(&body.actor, body.location)?;
    let request = state
        .service()
        .request_reprint(subject, body.amount_cents, body.remarks, ctx)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn fetch<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReprintRequest>, AppError> {
    Ok(Json(state.service().get_reprint(ReprintId(id)).await?))
}

async fn approve<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<ReprintRequest>, AppError> {
    let request = state
        .service()
        .approve_reprint(ReprintId(id), body.version, parse_actor(&body.actor)?)
        .await?;
    Ok(Json(request))
}

async fn reject<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReasonedTransitionRequest>,
) -> Result<Json<ReprintRequest>, AppError> {
    let request = state
        .service()
        .reject_reprint(
            ReprintId(id),
            body.version,
            parse_actor(&body.actor)?,
            &body.reason,
        )
        .await?;
    Ok(Json(request))
}

async fn print<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<ReprintRequest>, AppError> {
    let request = state
        .service()
        .print_reprint(ReprintId(id), body.version, parse_actor(&body.actor)?)
        .await?;
    Ok(Json(request))
}

async fn complete<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<ReprintRequest>, AppError> {
    let request = state
        .service()
        .complete_reprint(ReprintId(id), body.version, parse_actor(&body.actor)?)
        .await?;
    Ok(Json(request))
}
