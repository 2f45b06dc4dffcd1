//! REST front ends for the bank, bank-details and documents services.
//!
//! Each binary under `src/bin` wires a store backend into one of the
//! routers in [`router`] and serves it.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod telemetry;
