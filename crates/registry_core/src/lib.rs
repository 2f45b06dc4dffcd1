//! Bank registry core: pure domain types, port traits, retry and fallback
//! policy for downstream calls, and the aggregated bank view.
//!
//! Nothing in this crate talks to a database or a socket. Stores and
//! downstream services are reached through the traits in [`ports`];
//! `registry_postgres` and `registry_client` provide the real adapters,
//! [`memory`] provides in-process ones.

pub mod circuit;
pub mod downstream;
pub mod error;
pub mod memory;
pub mod ports;
pub mod registry;
pub mod retry;
pub mod service;
pub mod types;
pub mod validation;

pub use error::{DownstreamError, FieldViolation, RegistryError};
pub use types::*;
