//! Shared application state.

use std::sync::Arc;

use sasana_registry::{RecordStore, RegistryService};

/// Handler state: the registry service behind an `Arc`.
///
/// Generic over the storage backend so the same routers serve the
/// Postgres deployment and the in-memory store the tests run against.
#[derive(Debug)]
pub struct AppState<S> {
    service: Arc<RegistryService<S>>,
}

impl<S: RecordStore> AppState<S> {
    /// State over a registry service.
    pub fn new(service: RegistryService<S>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// The registry service.
    pub fn service(&self) -> &RegistryService<S> {
        &self.service
    }
}

// manual impl: `S` itself need not be Clone behind the Arc
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}
