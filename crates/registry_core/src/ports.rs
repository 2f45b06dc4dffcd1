//! Port traits. Core logic depends only on these; `registry_postgres`,
//! `registry_client` and [`crate::memory`] implement them.

use async_trait::async_trait;

use crate::error::{DownstreamError, RegistryError};
use crate::types::*;

pub type Result<T> = std::result::Result<T, RegistryError>;

// ── Entity stores ──────────────────────────────────────────────

#[async_trait]
pub trait BankStore: Send + Sync {
    /// Persist a new bank and return it with its assigned id.
    async fn save(&self, bank: NewBank) -> Result<Bank>;
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Bank>>;
    /// All banks in id order.
    async fn find_all(&self) -> Result<Vec<Bank>>;
    /// Deleting an id that does not exist is not an error.
    async fn delete_by_id(&self, id: EntityId) -> Result<()>;
}

#[async_trait]
pub trait BankDetailsStore: Send + Sync {
    async fn save(&self, details: NewBankDetails) -> Result<BankDetails>;
    /// Most recently created details record for a bank.
    async fn find_by_bank_id(&self, bank_id: EntityId) -> Result<Option<BankDetails>>;
    async fn find_all(&self) -> Result<Vec<BankDetails>>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save(&self, document: NewDocument) -> Result<Document>;
    /// Includes soft-deleted documents.
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Document>>;
    /// Documents not marked deleted, in id order.
    async fn find_active(&self) -> Result<Vec<Document>>;
    /// Documents of one bank that are not marked deleted, in id order.
    async fn find_by_bank_id(&self, bank_id: EntityId) -> Result<Vec<Document>>;
    /// Set the soft-delete flag. Idempotent, unknown ids are ignored.
    async fn mark_deleted(&self, id: EntityId) -> Result<()>;
}

// ── Downstream services ────────────────────────────────────────

pub type DownstreamResult<T> = std::result::Result<T, DownstreamError>;

/// Remote bank-details service. One call is one network round trip; retry
/// and fallback live in [`crate::downstream`].
#[async_trait]
pub trait DetailsApi: Send + Sync {
    /// Opaque details payload for a bank, `None` when the service has none.
    async fn details_by_bank_id(&self, bank_id: EntityId)
        -> DownstreamResult<Option<serde_json::Value>>;

    async fn create_details(&self, details: &NewBankDetails) -> DownstreamResult<serde_json::Value>;
}

/// Remote documents service.
#[async_trait]
pub trait DocumentsApi: Send + Sync {
    async fn documents_by_bank_id(&self, bank_id: EntityId) -> DownstreamResult<Vec<Document>>;
}
