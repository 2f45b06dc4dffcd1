//! Documents service handlers.
//!
//! DELETE marks a document deleted; listings only return live documents.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};

use registry_core::registry::DocumentRegistry;
use registry_core::types::{Document, EntityId, NewDocument};

use crate::error::AppError;

pub async fn list_documents(
    Extension(registry): Extension<Arc<DocumentRegistry>>,
) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(registry.list_active().await?))
}

pub async fn create_document(
    Extension(registry): Extension<Arc<DocumentRegistry>>,
    payload: Result<Json<NewDocument>, JsonRejection>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let Json(document) = payload?;
    let created = registry.create(document).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_document(
    Extension(registry): Extension<Arc<DocumentRegistry>>,
    Path(id): Path<EntityId>,
) -> Result<Json<Document>, AppError> {
    Ok(Json(registry.get(id).await?))
}

pub async fn delete_document(
    Extension(registry): Extension<Arc<DocumentRegistry>>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode, AppError> {
    registry.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `id` here is the bank id.
pub async fn documents_by_bank(
    Extension(registry): Extension<Arc<DocumentRegistry>>,
    Path(id): Path<EntityId>,
) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(registry.list_by_bank(id).await?))
}
