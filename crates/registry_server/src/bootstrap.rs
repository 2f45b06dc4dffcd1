//! Wiring shared by the service binaries: open stores, build the bank
//! service's downstream adapters, serve a router.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;

use registry_client::{
    HttpDetailsApi, HttpDocumentsApi, StaticResolver, DETAILS_SERVICE, DOCUMENTS_SERVICE,
};
use registry_core::downstream::{DetailsAdapter, DocumentsAdapter};
use registry_core::memory::{MemoryBankDetailsStore, MemoryBankStore, MemoryDocumentStore};
use registry_core::ports::{BankDetailsStore, BankStore, DocumentStore};
use registry_core::service::BankService;
use registry_postgres::{mask_database_url, DatabaseManager, PgStores};

use crate::config::{DownstreamConfig, StoreConfig};

pub struct Stores {
    pub banks: Arc<dyn BankStore>,
    pub bank_details: Arc<dyn BankDetailsStore>,
    pub documents: Arc<dyn DocumentStore>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            banks: Arc::new(MemoryBankStore::new()),
            bank_details: Arc::new(MemoryBankDetailsStore::new()),
            documents: Arc::new(MemoryDocumentStore::new()),
        }
    }
}

/// Connect the configured backend. Postgres migrations run before any
/// store is handed out.
pub async fn open_stores(config: &StoreConfig) -> Result<Stores> {
    match config {
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory stores; data is lost on restart");
            Ok(Stores::memory())
        }
        StoreConfig::Postgres(db_config) => {
            let db = DatabaseManager::connect(db_config).await.with_context(|| {
                format!(
                    "failed to connect to {}",
                    mask_database_url(&db_config.database_url)
                )
            })?;
            db.run_migrations()
                .await
                .context("failed to run database migrations")?;

            let stores = PgStores::new(db.pool().clone());
            Ok(Stores {
                banks: Arc::new(stores.banks),
                bank_details: Arc::new(stores.bank_details),
                documents: Arc::new(stores.documents),
            })
        }
    }
}

/// Bank service with reqwest adapters for both downstream services.
pub fn bank_service(banks: Arc<dyn BankStore>, config: &DownstreamConfig) -> Result<BankService> {
    let client = config
        .http
        .build_client()
        .context("failed to build HTTP client")?;
    let resolver = Arc::new(
        StaticResolver::new()
            .with_service(DETAILS_SERVICE, config.details_urls.clone())
            .with_service(DOCUMENTS_SERVICE, config.documents_urls.clone()),
    );

    let details = HttpDetailsApi::new(client.clone(), resolver.clone(), &config.http);
    let documents = HttpDocumentsApi::new(client, resolver, &config.http);

    tracing::info!(
        details = ?config.details_urls.iter().map(|u| u.as_str()).collect::<Vec<_>>(),
        documents = ?config.documents_urls.iter().map(|u| u.as_str()).collect::<Vec<_>>(),
        details_on_failure = ?config.details.on_failure,
        documents_on_failure = ?config.documents.on_failure,
        "Downstream services configured"
    );

    Ok(BankService::new(
        banks,
        DetailsAdapter::new(Arc::new(details), config.details),
        DocumentsAdapter::new(Arc::new(documents), config.documents),
    ))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(app: Router, bind_addr: SocketAddr, name: &str) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    tracing::info!("{name} listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("{name} stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
