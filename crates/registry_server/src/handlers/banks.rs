//! Bank service handlers.
//!
//! GET    /api/banks              — list banks
//! POST   /api/banks              — create bank
//! GET    /api/banks/:id          — get bank
//! DELETE /api/banks/:id          — delete bank
//! GET    /api/banks/:id/details  — bank plus downstream details and documents
//! POST   /api/banks/:id/details  — forward a details record to the details service

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::Value;

use registry_core::service::BankService;
use registry_core::types::{AggregatedBankView, Bank, EntityId, NewBank, NewBankDetails};

use crate::error::AppError;

pub async fn list_banks(
    Extension(service): Extension<Arc<BankService>>,
) -> Result<Json<Vec<Bank>>, AppError> {
    Ok(Json(service.list_banks().await?))
}

pub async fn get_bank(
    Extension(service): Extension<Arc<BankService>>,
    Path(id): Path<EntityId>,
) -> Result<Json<Bank>, AppError> {
    Ok(Json(service.get_bank(id).await?))
}

pub async fn create_bank(
    Extension(service): Extension<Arc<BankService>>,
    payload: Result<Json<NewBank>, JsonRejection>,
) -> Result<(StatusCode, Json<Bank>), AppError> {
    let Json(new_bank) = payload?;
    let bank = service.create_bank(new_bank).await?;
    Ok((StatusCode::CREATED, Json(bank)))
}

pub async fn delete_bank(
    Extension(service): Extension<Arc<BankService>>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode, AppError> {
    service.delete_bank(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn aggregated_view(
    Extension(service): Extension<Arc<BankService>>,
    Path(id): Path<EntityId>,
) -> Result<Json<AggregatedBankView>, AppError> {
    Ok(Json(service.aggregated_view(id).await?))
}

pub async fn register_details(
    Extension(service): Extension<Arc<BankService>>,
    Path(id): Path<EntityId>,
    payload: Result<Json<NewBankDetails>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(details) = payload?;
    let created = service.register_details(id, details).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
