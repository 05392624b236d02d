//! Registry API server binary.
//!
//! With `DATABASE_URL` set the server runs over PostgreSQL; without it
//! the in-memory store backs the API, for demos and local development.

use anyhow::Context;
use axum::routing::get;

use sasana_api::{telemetry, AppState};
use sasana_registry::{MemoryStore, RegistryService};
use sasana_store::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();
    let metrics = telemetry::init_metrics()?;

    let port: u16 = match std::env::var("PORT") {
        Ok(raw) => raw.parse().context("PORT must be a port number")?,
        Err(_) => 8080,
    };

    let router = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = PgStore::connect(&url)
                .await
                .context("failed to connect to the database")?;
            tracing::info!("serving over PostgreSQL");
            sasana_api::app(AppState::new(RegistryService::new(store)))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL unset — serving from the in-memory store");
            sasana_api::app(AppState::new(RegistryService::new(MemoryStore::new())))
        }
    };
    let router = router.route(
        "/metrics",
        get(move || {
            let metrics = metrics.clone();
            async move { metrics.render() }
        }),
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!(port, "registry API listening");
    axum::serve(listener, router).await.context("server error")
}
