//! Router construction for the three services.

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use registry_core::registry::{BankDetailsRegistry, DocumentRegistry};
use registry_core::service::BankService;

use crate::handlers;

pub fn bank_router(service: Arc<BankService>) -> Router {
    let api = Router::new()
        .route(
            "/api/banks",
            get(handlers::banks::list_banks).post(handlers::banks::create_bank),
        )
        .route(
            "/api/banks/:id",
            get(handlers::banks::get_bank).delete(handlers::banks::delete_bank),
        )
        .route(
            "/api/banks/:id/details",
            get(handlers::banks::aggregated_view).post(handlers::banks::register_details),
        )
        .layer(Extension(service));

    with_common_layers(api)
}

pub fn details_router(registry: Arc<BankDetailsRegistry>) -> Router {
    let api = Router::new()
        .route(
            "/api/bank-details",
            get(handlers::bank_details::list_details).post(handlers::bank_details::create_details),
        )
        .route(
            "/api/bank-details/:bank_id",
            get(handlers::bank_details::details_by_bank_id),
        )
        .layer(Extension(registry));

    with_common_layers(api)
}

pub fn documents_router(registry: Arc<DocumentRegistry>) -> Router {
    let api = Router::new()
        .route(
            "/api/documents",
            get(handlers::documents::list_documents).post(handlers::documents::create_document),
        )
        .route(
            "/api/documents/:id",
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        )
        .route(
            "/api/documents/:id/bank",
            get(handlers::documents::documents_by_bank),
        )
        .layer(Extension(registry));

    with_common_layers(api)
}

/// Health check plus tracing and CORS, shared by every service.
fn with_common_layers(api: Router) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}
