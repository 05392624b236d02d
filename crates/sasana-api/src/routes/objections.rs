//! # Objection Routes
//!
//! Filing and deciding objections. Filing validates the type against
//! the loaded catalogue and the subject's kind; decisions are the usual
//! versioned transitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use sasana_core::{ObjectionId, Timestamp};
use sasana_objection::Objection;
use sasana_registry::RecordStore;

use crate::error::AppError;
use crate::routes::{actor_context, parse_actor, parse_handle};
use crate::state::AppState;

pub fn router<S: RecordStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/v1/objections", post(create::<S>))
        .route("/v1/objections/{id}", get(fetch::<S>))
        .route("/v1/objections/{id}/approve", post(approve::<S>))
        .route("/v1/objections/{id}/reject", post(reject::<S>))
        .route("/v1/objections/{id}/cancel", post(cancel::<S>))
}

/// Request to file an objection. Validity bounds are RFC 3339; a null
/// `valid_from` means "from approval", a null `valid_until` unbounded.
#[derive(Debug, Deserialize)]
pub struct FileObjectionRequest {
    pub subject_kind: String,
    pub subject_id: i64,
    pub objection_type: String,
    pub grounds: String,
    pub requester_name: String,
    pub requester_contact: Option<String>,
    pub valid_from: Option<String>,
    pub valid_until: Option<String>,
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

fn parse_bound(raw: &Option<String>) -> Result<Option<Timestamp>, AppError> {
    Ok(raw.as_deref().map(Timestamp::parse).transpose()?)
}

async fn create<S: RecordStore>(
    State(state): State<AppState<S>>,
    Json(body): Json<FileObjectionRequest>,
) -> Result<(StatusCode, Json<Objection>), AppError> {
    let subject = parse_handle(&body.subject_kind, body.subject_id)?;
    let ctx = actor_context(&body.actor, body.location)?;
    let objection = state
        .service()
        .file_objection(
            subject,
            &body.objection_type,
            &body.grounds,
            &body.requester_name,
            body.requester_contact,
            parse_bound(&body.valid_from)?,
            parse_bound(&body.valid_until)?,
            ctx,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(objection)))
}

async fn fetch<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Objection>, AppError> {
    Ok(Json(state.service().get_objection(ObjectionId(id)).await?))
}

async fn approve<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<Objection>, AppError> {
    let objection = state
        .service()
        .approve_objection(ObjectionId(id), body.version, parse_actor(&body.actor)?)
        .await?;
    Ok(Json(objection))
}

async fn reject<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReasonedTransitionRequest>,
) -> Result<Json<Objection>, AppError> {
    let objection = state
        .service()
        .reject_objection(
            ObjectionId(id),
            body.version,
            parse_actor(&body.actor)?,
            &body.reason,
        )
        .await?;
    Ok(Json(objection))
}

async fn cancel<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReasonedTransitionRequest>,
) -> Result<Json<Objection>, AppError> {
    let objection = state
        .service()
        .cancel_objection(
            ObjectionId(id),
            body.version,
            parse_actor(&body.actor)?,
            &body.reason,
        )
        .await?;
    Ok(Json(objection))
}
