//! documents_service: documents attached to banks, soft-deleted.

use std::sync::Arc;

use registry_core::registry::DocumentRegistry;
use registry_server::config::{ServiceConfig, DOCUMENTS_SERVICE_ADDR};
use registry_server::{bootstrap, router, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("documents_service");

    let config = ServiceConfig::from_env(DOCUMENTS_SERVICE_ADDR)?;
    let stores = bootstrap::open_stores(&config.store).await?;
    let registry = DocumentRegistry::new(stores.documents);

    let app = router::documents_router(Arc::new(registry));
    bootstrap::serve(app, config.bind_addr, "documents_service").await
}
