//! reqwest implementations of [`DetailsApi`] and [`DocumentsApi`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use registry_core::ports::{DetailsApi, DocumentsApi, DownstreamResult};
use registry_core::types::{Document, EntityId, NewBankDetails};
use registry_core::DownstreamError;

use crate::resolver::ServiceResolver;
use crate::{DETAILS_SERVICE, DOCUMENTS_SERVICE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Whole-request deadline.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

impl HttpClientConfig {
    pub fn build_client(&self) -> reqwest::Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()
    }
}

/// Shared plumbing for both adapters.
struct Endpoint {
    client: Client,
    resolver: Arc<dyn ServiceResolver>,
    service: &'static str,
    timeout: Duration,
}

impl Endpoint {
    fn url(&self, path: &str) -> DownstreamResult<String> {
        let base = self.resolver.resolve(self.service)?;
        let base = base.as_str().trim_end_matches('/');
        if path.is_empty() {
            Ok(base.to_string())
        } else {
            Ok(format!("{base}/{path}"))
        }
    }

    fn classify(&self, err: reqwest::Error) -> DownstreamError {
        if err.is_timeout() {
            DownstreamError::Timeout(self.timeout)
        } else if err.is_connect() {
            DownstreamError::Connect(err.to_string())
        } else if err.is_decode() {
            DownstreamError::Decode(err.to_string())
        } else {
            DownstreamError::Transport(err.to_string())
        }
    }

    async fn check(&self, response: Response) -> DownstreamResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.is_server_error() {
            return Err(DownstreamError::Unavailable(status.as_u16()));
        }
        Err(rejection(status, response.text().await))
    }
}

/// A non-success, non-5xx answer. A body that cannot be read is reported
/// as such rather than as an empty body.
fn rejection(status: StatusCode, body: reqwest::Result<String>) -> DownstreamError {
    DownstreamError::Rejected {
        status: status.as_u16(),
        body: body.unwrap_or_else(|e| format!("<unreadable body: {e}>")),
    }
}

// ── HttpDetailsApi ────────────────────────────────────────────

pub struct HttpDetailsApi {
    endpoint: Endpoint,
}

impl HttpDetailsApi {
    pub fn new(client: Client, resolver: Arc<dyn ServiceResolver>, config: &HttpClientConfig) -> Self {
        Self {
            endpoint: Endpoint {
                client,
                resolver,
                service: DETAILS_SERVICE,
                timeout: config.timeout,
            },
        }
    }
}

#[async_trait]
impl DetailsApi for HttpDetailsApi {
    async fn details_by_bank_id(&self, bank_id: EntityId) -> DownstreamResult<Option<Value>> {
        let url = self.endpoint.url(&bank_id.to_string())?;
        debug!(%url, "GET bank details");

        let response = self
            .endpoint
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.endpoint.classify(e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: Value = self
            .endpoint
            .check(response)
            .await?
            .json()
            .await
            .map_err(|e| self.endpoint.classify(e))?;
        Ok((!body.is_null()).then_some(body))
    }

    async fn create_details(&self, details: &NewBankDetails) -> DownstreamResult<Value> {
        let url = self.endpoint.url("")?;
        debug!(%url, bank_id = details.bank_id, "POST bank details");

        let response = self
            .endpoint
            .client
            .post(&url)
            .json(details)
            .send()
            .await
            .map_err(|e| self.endpoint.classify(e))?;
        self.endpoint
            .check(response)
            .await?
            .json()
            .await
            .map_err(|e| self.endpoint.classify(e))
    }
}

// ── HttpDocumentsApi ──────────────────────────────────────────

pub struct HttpDocumentsApi {
    endpoint: Endpoint,
}

impl HttpDocumentsApi {
    pub fn new(client: Client, resolver: Arc<dyn ServiceResolver>, config: &HttpClientConfig) -> Self {
        Self {
            endpoint: Endpoint {
                client,
                resolver,
                service: DOCUMENTS_SERVICE,
                timeout: config.timeout,
            },
        }
    }
}

#[async_trait]
impl DocumentsApi for HttpDocumentsApi {
    async fn documents_by_bank_id(&self, bank_id: EntityId) -> DownstreamResult<Vec<Document>> {
        let url = self.endpoint.url(&format!("{bank_id}/bank"))?;
        debug!(%url, "GET documents for bank");

        let response = self
            .endpoint
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.endpoint.classify(e))?;
        self.endpoint
            .check(response)
            .await?
            .json()
            .await
            .map_err(|e| self.endpoint.classify(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_keeps_body() {
        let err = rejection(StatusCode::CONFLICT, Ok("duplicate".into()));
        assert_eq!(
            err,
            DownstreamError::Rejected {
                status: 409,
                body: "duplicate".into()
            }
        );
    }

    #[test]
    fn unreadable_rejection_body_is_reported() {
        let read_error = Client::new().get("not a url").build().unwrap_err();
        match rejection(StatusCode::BAD_REQUEST, Err(read_error)) {
            DownstreamError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.starts_with("<unreadable body: "), "{body}");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
}
