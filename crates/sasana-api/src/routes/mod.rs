//! # Route Modules
//!
//! Each module defines an Axum router for one API surface area:
//! registration records, credential reprints, objections. Routers are
//! assembled in [`crate::app`].

pub mod objections;
pub mod records;
pub mod reprints;

use sasana_core::{ActorContext, ActorId, EntityHandle, EntityKind, RecordId, RegistryError};

use crate::error::AppError;

/// Parse a `{kind}` path segment. A bad segment is a request-shape
/// error, not a domain validation failure.
fn parse_kind(kind: &str) -> Result<EntityKind, AppError> {
    kind.parse()
        .map_err(|e: RegistryError| AppError::BadRequest(e.to_string()))
}

fn parse_handle(kind: &str, id: i64) -> Result<EntityHandle, AppError> {
    Ok(EntityHandle::new(parse_kind(kind)?, RecordId(id)))
}

fn parse_actor(name: &str) -> Result<ActorId, AppError> {
    Ok(ActorId::new(name)?)
}

fn actor_context(name: &str, location: Option<String>) -> Result<ActorContext, AppError> {
    let mut ctx = ActorContext::new(parse_actor(name)?);
    ctx.location = location;
    Ok(ctx)
}
