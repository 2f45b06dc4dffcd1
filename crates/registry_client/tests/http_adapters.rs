//! HTTP adapters against a local axum server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

use registry_client::{
    HttpClientConfig, HttpDetailsApi, HttpDocumentsApi, StaticResolver, DETAILS_SERVICE,
    DOCUMENTS_SERVICE,
};
use registry_core::downstream::{DocumentsAdapter, DownstreamPolicy};
use registry_core::ports::{DetailsApi, DocumentsApi};
use registry_core::retry::RetryConfig;
use registry_core::types::NewBankDetails;
use registry_core::DownstreamError;

// ── Helpers ────────────────────────────────────────────────────

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config() -> HttpClientConfig {
    HttpClientConfig {
        timeout: Duration::from_millis(200),
        connect_timeout: Duration::from_millis(200),
    }
}

fn resolver(service: &str, base: String) -> Arc<StaticResolver> {
    Arc::new(StaticResolver::new().with_service(service, vec![Url::parse(&base).unwrap()]))
}

fn details_api(addr: SocketAddr) -> HttpDetailsApi {
    let config = config();
    HttpDetailsApi::new(
        config.build_client().unwrap(),
        resolver(DETAILS_SERVICE, format!("http://{addr}/api/bank-details")),
        &config,
    )
}

fn documents_api(addr: SocketAddr) -> HttpDocumentsApi {
    let config = config();
    HttpDocumentsApi::new(
        config.build_client().unwrap(),
        resolver(DOCUMENTS_SERVICE, format!("http://{addr}/api/documents")),
        &config,
    )
}

// ── Details ────────────────────────────────────────────────────

#[tokio::test]
async fn details_body_passes_through() {
    let app = Router::new().route(
        "/api/bank-details/:bank_id",
        get(|Path(bank_id): Path<i64>| async move {
            Json(json!({ "bankId": bank_id, "tier": "gold" }))
        }),
    );
    let api = details_api(serve(app).await);

    let body = api.details_by_bank_id(1).await.unwrap();
    assert_eq!(body, Some(json!({ "bankId": 1, "tier": "gold" })));
}

#[tokio::test]
async fn details_not_found_reads_as_absent() {
    let app = Router::new().route(
        "/api/bank-details/:bank_id",
        get(|| async { StatusCode::NOT_FOUND }),
    );
    let api = details_api(serve(app).await);

    assert_eq!(api.details_by_bank_id(7).await.unwrap(), None);
}

#[tokio::test]
async fn details_create_posts_payload() {
    let app = Router::new().route(
        "/api/bank-details",
        axum::routing::post(|Json(body): Json<Value>| async move {
            (StatusCode::CREATED, Json(json!({ "id": 10, "echo": body })))
        }),
    );
    let api = details_api(serve(app).await);

    let created = api
        .create_details(&NewBankDetails {
            bank_id: 3,
            name: "Acme".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created["id"], 10);
    assert_eq!(created["echo"]["bankId"], 3);
    assert_eq!(created["echo"]["name"], "Acme");
}

#[tokio::test]
async fn client_error_is_rejected_with_body() {
    let app = Router::new().route(
        "/api/bank-details",
        axum::routing::post(|| async { (StatusCode::BAD_REQUEST, "bad name") }),
    );
    let api = details_api(serve(app).await);

    let err = api
        .create_details(&NewBankDetails::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DownstreamError::Rejected {
            status: 400,
            body: "bad name".into()
        }
    );
    assert!(!err.is_retryable());
}

// ── Documents ─────────────────────────────────────────────────

#[tokio::test]
async fn documents_decode_from_camel_case() {
    let app = Router::new().route(
        "/api/documents/:id/bank",
        get(|Path(id): Path<i64>| async move {
            Json(json!([
                { "id": 1, "bankId": id, "title": "Charter", "message": "signed" }
            ]))
        }),
    );
    let api = documents_api(serve(app).await);

    let docs = api.documents_by_bank_id(4).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].bank_id, 4);
    assert_eq!(docs[0].title, "Charter");
    assert!(!docs[0].deleted);
}

#[tokio::test]
async fn server_error_is_unavailable() {
    let app = Router::new().route(
        "/api/documents/:id/bank",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let api = documents_api(serve(app).await);

    let err = api.documents_by_bank_id(1).await.unwrap_err();
    assert_eq!(err, DownstreamError::Unavailable(503));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let app = Router::new().route(
        "/api/documents/:id/bank",
        get(|| async { Json(json!({ "not": "a list" })) }),
    );
    let api = documents_api(serve(app).await);

    assert!(matches!(
        api.documents_by_bank_id(1).await,
        Err(DownstreamError::Decode(_))
    ));
}

#[tokio::test]
async fn slow_server_times_out() {
    let app = Router::new().route(
        "/api/documents/:id/bank",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!([]))
        }),
    );
    let api = documents_api(serve(app).await);

    assert_eq!(
        api.documents_by_bank_id(1).await.unwrap_err(),
        DownstreamError::Timeout(Duration::from_millis(200))
    );
}

#[tokio::test]
async fn refused_connection_is_connect_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = documents_api(addr);

    assert!(matches!(
        api.documents_by_bank_id(1).await,
        Err(DownstreamError::Connect(_))
    ));
}

#[tokio::test]
async fn unregistered_service_is_unresolved() {
    let config = config();
    let api = HttpDocumentsApi::new(
        config.build_client().unwrap(),
        Arc::new(StaticResolver::new()),
        &config,
    );

    assert_eq!(
        api.documents_by_bank_id(1).await.unwrap_err(),
        DownstreamError::Unresolved(DOCUMENTS_SERVICE.into())
    );
}

// ── Through the adapter ───────────────────────────────────────

#[tokio::test]
async fn fail_open_adapter_retries_then_returns_empty() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/api/documents/:id/bank",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::BAD_GATEWAY
            }),
        )
        .with_state(hits.clone());
    let api = documents_api(serve(app).await);

    let adapter = DocumentsAdapter::new(
        Arc::new(api),
        DownstreamPolicy::fail_open().with_retry(RetryConfig {
            backoff_millis: 5,
            max_attempts: 3,
        }),
    );

    let docs = adapter.documents_by_bank_id(1).await.unwrap();
    assert!(docs.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn rejected_call_is_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/api/documents/:id/bank",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::FORBIDDEN
            }),
        )
        .with_state(hits.clone());
    let api = documents_api(serve(app).await);

    let adapter = DocumentsAdapter::new(
        Arc::new(api),
        DownstreamPolicy::propagate().with_retry(RetryConfig {
            backoff_millis: 5,
            max_attempts: 3,
        }),
    );

    let err = adapter.documents_by_bank_id(1).await.unwrap_err();
    assert_eq!(err.http_status(), 502);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
