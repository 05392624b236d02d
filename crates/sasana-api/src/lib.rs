//! # sasana-api — Axum HTTP Surface
//!
//! The HTTP layer over [`sasana_registry::RegistryService`]. Three
//! routers, one per surface area:
//!
//! - `/v1/records/*` — registration records: creation, the attention
//!   queue, workflow transitions, residents, the objection-screen query
//! - `/v1/reprints/*` — credential reprint requests
//! - `/v1/objections/*` — filing and deciding objections
//!
//! Health probes (`/health/*`) are mounted alongside; the Prometheus
//! `/metrics` endpoint is mounted by the binary, which owns the
//! recorder handle.
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers — handlers parse, delegate to
//!   the registry service, and map errors via [`AppError`].
//! - Handlers are generic over the storage backend; tests run the full
//!   HTTP stack against the in-memory store.

pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use sasana_registry::RecordStore;

pub use error::AppError;
pub use state::AppState;

/// Assemble the full application router.
pub fn app<S: RecordStore>(state: AppState<S>) -> Router {
    Router::new()
        .merge(routes::records::router())
        .merge(routes::reprints::router())
        .merge(routes::objections::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
}

async fn liveness() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn readiness() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ready" })))
}
