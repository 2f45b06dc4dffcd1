//! Registries behind the bank-details and documents services.

use std::sync::Arc;

use crate::error::RegistryError;
use crate::ports::{BankDetailsStore, DocumentStore, Result};
use crate::types::*;
use crate::validation::Validate;

// ── BankDetailsRegistry ───────────────────────────────────────

pub struct BankDetailsRegistry {
    store: Arc<dyn BankDetailsStore>,
}

impl BankDetailsRegistry {
    pub fn new(store: Arc<dyn BankDetailsStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, details: NewBankDetails) -> Result<BankDetails> {
        details.validate()?;
        let saved = self.store.save(details).await?;
        tracing::info!(details_id = saved.id, bank_id = saved.bank_id, "bank details created");
        Ok(saved)
    }

    pub async fn get_by_bank_id(&self, bank_id: EntityId) -> Result<BankDetails> {
        tracing::info!(bank_id, "getting bank details by bank id");
        self.store
            .find_by_bank_id(bank_id)
            .await?
            .ok_or_else(|| RegistryError::not_found("bank details for bank", bank_id))
    }

    pub async fn list(&self) -> Result<Vec<BankDetails>> {
        self.store.find_all().await
    }
}

// ── DocumentRegistry ──────────────────────────────────────────

pub struct DocumentRegistry {
    store: Arc<dyn DocumentStore>,
}

impl DocumentRegistry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, document: NewDocument) -> Result<Document> {
        document.validate()?;
        let saved = self.store.save(document).await?;
        tracing::info!(document_id = saved.id, bank_id = saved.bank_id, "document created");
        Ok(saved)
    }

    pub async fn get(&self, id: EntityId) -> Result<Document> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| RegistryError::not_found("document", id))
    }

    pub async fn list_active(&self) -> Result<Vec<Document>> {
        self.store.find_active().await
    }

    pub async fn list_by_bank(&self, bank_id: EntityId) -> Result<Vec<Document>> {
        tracing::info!(bank_id, "getting all documents by bank id");
        self.store.find_by_bank_id(bank_id).await
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.store.mark_deleted(id).await?;
        tracing::info!(document_id = id, "document marked deleted");
        Ok(())
    }
}
