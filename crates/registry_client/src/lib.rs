//! HTTP adapters for the downstream bank-details and documents services.
//!
//! One call here is one network round trip. Retry, circuit breaking and
//! fallback are applied by `registry_core::downstream` on top of these.

pub mod http;
pub mod resolver;

pub use http::{HttpClientConfig, HttpDetailsApi, HttpDocumentsApi};
pub use resolver::{ServiceResolver, StaticResolver};

/// Logical name the details service is registered under.
pub const DETAILS_SERVICE: &str = "bank-details";
/// Logical name the documents service is registered under.
pub const DOCUMENTS_SERVICE: &str = "documents";
