//! Cards Server Binary
//!
//! Serves the deck and card REST API over the configured store.

use anyhow::Context;
use rememerme_cards::api::rest::{AppState, create_router};
use rememerme_cards::application::services::{EntityClients, ThreadRngOrderPicker};
use rememerme_cards::config::{AppConfig, StoreBackend};
use rememerme_cards::infrastructure::persistence::ColumnFamilyStore;
use rememerme_cards::infrastructure::persistence::in_memory::InMemoryColumnFamilyStore;
use rememerme_cards::infrastructure::persistence::postgres::PostgresColumnFamilyStore;
use rememerme_cards::infrastructure::telemetry;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    telemetry::init(config.logging.format, config.logging.filter.as_deref());

    let store = open_store(&config).await?;
    let clients = EntityClients::with_selection(
        Arc::clone(&store),
        Arc::new(ThreadRngOrderPicker::new()),
        Some(config.selection.order_range()),
    );
    let router = create_router(Arc::new(AppState::new(clients)));

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, backend = ?config.store.backend, "cards server listening");

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    tracing::info!("store closed");
    served.context("serving http")
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ColumnFamilyStore>> {
    match config.store.backend {
        StoreBackend::InMemory => {
            tracing::warn!("using the in-memory store; records are lost on exit");
            Ok(Arc::new(InMemoryColumnFamilyStore::new()))
        }
        StoreBackend::Postgres => {
            let store = PostgresColumnFamilyStore::connect(&config.store.postgres())
                .await
                .context("connecting to the store")?;
            if config.store.ensure_schema {
                store
                    .ensure_schema()
                    .await
                    .context("creating the column table")?;
            }
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
