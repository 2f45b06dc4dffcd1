//! bank_service: bank records plus the aggregated bank view.
//!
//! See `registry_server::config` for the environment variables read.

use std::sync::Arc;

use registry_server::config::BankServiceConfig;
use registry_server::{bootstrap, router, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("bank_service");

    let config = BankServiceConfig::from_env()?;
    let stores = bootstrap::open_stores(&config.service.store).await?;
    let service = bootstrap::bank_service(stores.banks, &config.downstream)?;

    let app = router::bank_router(Arc::new(service));
    bootstrap::serve(app, config.service.bind_addr, "bank_service").await
}
