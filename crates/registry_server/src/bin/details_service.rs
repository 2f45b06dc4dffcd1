//! details_service: bank-details records, looked up by bank id.

use std::sync::Arc;

use registry_core::registry::BankDetailsRegistry;
use registry_server::config::{ServiceConfig, DETAILS_SERVICE_ADDR};
use registry_server::{bootstrap, router, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("details_service");

    let config = ServiceConfig::from_env(DETAILS_SERVICE_ADDR)?;
    let stores = bootstrap::open_stores(&config.store).await?;
    let registry = BankDetailsRegistry::new(stores.bank_details);

    let app = router::details_router(Arc::new(registry));
    bootstrap::serve(app, config.bind_addr, "details_service").await
}
