//! Postgres implementations of the registry_core store ports.

pub mod database;
pub mod store;

pub use database::{mask_database_url, DatabaseConfig, DatabaseManager};
pub use store::{PgBankDetailsStore, PgBankStore, PgDocumentStore, PgStores};
