//! Bank-details service handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};

use registry_core::registry::BankDetailsRegistry;
use registry_core::types::{BankDetails, EntityId, NewBankDetails};

use crate::error::AppError;

pub async fn list_details(
    Extension(registry): Extension<Arc<BankDetailsRegistry>>,
) -> Result<Json<Vec<BankDetails>>, AppError> {
    Ok(Json(registry.list().await?))
}

pub async fn create_details(
    Extension(registry): Extension<Arc<BankDetailsRegistry>>,
    payload: Result<Json<NewBankDetails>, JsonRejection>,
) -> Result<(StatusCode, Json<BankDetails>), AppError> {
    let Json(details) = payload?;
    let created = registry.create(details).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn details_by_bank_id(
    Extension(registry): Extension<Arc<BankDetailsRegistry>>,
    Path(bank_id): Path<EntityId>,
) -> Result<Json<BankDetails>, AppError> {
    Ok(Json(registry.get_by_bank_id(bank_id).await?))
}
