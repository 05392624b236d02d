//! # Application Error
//!
//! Maps domain errors to structured HTTP responses with proper status
//! codes and error bodies.
//!
//! The body shape is always `{"error": {"code", "message", ...}}`.
//! Two conflict cases are distinguished for callers: a `StaleVersion`
//! response carries the stored version so the client can re-read and
//! retry, an `ObjectionBlocked` response carries the objection's type,
//! grounds, and requester so the veto is explainable at the counter.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use sasana_core::RegistryError;

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// A domain error from the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Request shape error before the domain is reached (bad path
    /// segment, unparseable enum name, …).
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Registry(e) => match e {
                RegistryError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                RegistryError::InvalidTransition { .. } => StatusCode::CONFLICT,
                RegistryError::StaleVersion { .. } => StatusCode::CONFLICT,
                RegistryError::ObjectionBlocked { .. } => StatusCode::CONFLICT,
                RegistryError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
                RegistryError::ReferentialIntegrity(_) => StatusCode::NOT_FOUND,
                RegistryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // storage details stay in the log, not on the wire
        let message = match &self {
            Self::Registry(RegistryError::Storage(detail)) => {
                tracing::error!(error = %detail, "storage failure surfaced to client");
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };

        let mut error = serde_json::json!({
            "code": status.as_u16(),
            "message": message,
        });
        match &self {
            Self::Registry(RegistryError::StaleVersion { expected, actual }) => {
                error["stale_version"] = serde_json::json!({
                    "read": expected,
                    "stored": actual,
                });
            }
            Self::Registry(RegistryError::ObjectionBlocked {
                objection_type,
                reason,
                requester,
            }) => {
                error["objection"] = serde_json::json!({
                    "objection_type": objection_type,
                    "reason": reason,
                    "requester": requester,
                });
            }
            _ => {}
        }

        let body = serde_json::json!({ "error": error });
        (status, axum::Json(body)).into_response()
    }
}
