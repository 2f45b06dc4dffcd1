//! BankService: the bank registry plus the aggregated bank view.
//!
//! `aggregated_view` is the only operation that talks to other services:
//! it reads the bank locally, then asks the details and documents services
//! concurrently and folds whatever comes back into one view. A missing bank
//! is the only failure that is guaranteed to abort it; downstream failures
//! follow each adapter's failure policy.

use std::sync::Arc;

use crate::downstream::{DetailsAdapter, DocumentsAdapter};
use crate::error::RegistryError;
use crate::ports::{BankStore, Result};
use crate::types::*;
use crate::validation::Validate;

pub struct BankService {
    banks: Arc<dyn BankStore>,
    details: DetailsAdapter,
    documents: DocumentsAdapter,
}

impl BankService {
    pub fn new(
        banks: Arc<dyn BankStore>,
        details: DetailsAdapter,
        documents: DocumentsAdapter,
    ) -> Self {
        Self {
            banks,
            details,
            documents,
        }
    }

    pub fn details(&self) -> &DetailsAdapter {
        &self.details
    }

    pub fn documents(&self) -> &DocumentsAdapter {
        &self.documents
    }

    pub async fn list_banks(&self) -> Result<Vec<Bank>> {
        self.banks.find_all().await
    }

    pub async fn get_bank(&self, id: EntityId) -> Result<Bank> {
        self.banks
            .find_by_id(id)
            .await?
            .ok_or_else(|| RegistryError::not_found("bank", id))
    }

    pub async fn create_bank(&self, new_bank: NewBank) -> Result<Bank> {
        new_bank.validate()?;
        let bank = self.banks.save(new_bank).await?;
        tracing::info!(bank_id = bank.id, code = %bank.code, "bank created");
        Ok(bank)
    }

    pub async fn delete_bank(&self, id: EntityId) -> Result<()> {
        self.banks.delete_by_id(id).await?;
        tracing::info!(bank_id = id, "bank deleted");
        Ok(())
    }

    /// Compose the bank with its details body and documents.
    pub async fn aggregated_view(&self, id: EntityId) -> Result<AggregatedBankView> {
        tracing::info!(bank_id = id, "building aggregated bank view");
        let bank = self.get_bank(id).await?;

        let (details_body, documents) = tokio::join!(
            self.details.details_by_bank_id(bank.id),
            self.documents.documents_by_bank_id(bank.id),
        );

        Ok(AggregatedBankView::compose(bank, details_body?, documents?))
    }

    /// Register details for an existing bank with the details service.
    /// The path id wins over any `bankId` in the payload.
    pub async fn register_details(
        &self,
        bank_id: EntityId,
        mut details: NewBankDetails,
    ) -> Result<serde_json::Value> {
        details.bank_id = bank_id;
        details.validate()?;
        self.get_bank(bank_id).await?;
        self.details.create_details(&details).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downstream::DownstreamPolicy;
    use crate::error::DownstreamError;
    use crate::memory::MemoryBankStore;
    use crate::ports::{DetailsApi, DocumentsApi, DownstreamResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    // ── Test doubles ───────────────────────────────────────────

    #[derive(Default)]
    struct ScriptedDetails {
        body: Option<serde_json::Value>,
        fail: bool,
        calls: AtomicU32,
        created: Mutex<Vec<NewBankDetails>>,
    }

    #[async_trait]
    impl DetailsApi for ScriptedDetails {
        async fn details_by_bank_id(
            &self,
            _bank_id: EntityId,
        ) -> DownstreamResult<Option<serde_json::Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DownstreamError::Transport("connection refused".into()));
            }
            Ok(self.body.clone())
        }

        async fn create_details(
            &self,
            details: &NewBankDetails,
        ) -> DownstreamResult<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.created.lock().unwrap().push(details.clone());
            Ok(json!({ "id": 1, "bankId": details.bank_id }))
        }
    }

    #[derive(Default)]
    struct ScriptedDocuments {
        docs: Vec<Document>,
        fail: bool,
        calls: AtomicU32,
    }

    #[async_trait]
    impl DocumentsApi for ScriptedDocuments {
        async fn documents_by_bank_id(&self, _bank_id: EntityId) -> DownstreamResult<Vec<Document>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DownstreamError::Timeout(Duration::from_secs(5)));
            }
            Ok(self.docs.clone())
        }
    }

    struct Fixture {
        service: BankService,
        banks: Arc<MemoryBankStore>,
        details: Arc<ScriptedDetails>,
        documents: Arc<ScriptedDocuments>,
    }

    fn fixture(details: ScriptedDetails, documents: ScriptedDocuments) -> Fixture {
        let banks = Arc::new(MemoryBankStore::new());
        let details = Arc::new(details);
        let documents = Arc::new(documents);
        let service = BankService::new(
            banks.clone(),
            DetailsAdapter::new(details.clone(), DownstreamPolicy::propagate()),
            DocumentsAdapter::new(documents.clone(), DownstreamPolicy::fail_open()),
        );
        Fixture {
            service,
            banks,
            details,
            documents,
        }
    }

    fn acme() -> NewBank {
        NewBank {
            name: "Acme".into(),
            code: "ACM".into(),
            address: "1 Main St".into(),
            phone_number: "555-0100".into(),
            email: "ops@acme.test".into(),
        }
    }

    // ── Aggregated view ────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn view_survives_documents_timeouts() {
        let fx = fixture(
            ScriptedDetails {
                body: Some(json!({ "tier": "gold" })),
                ..Default::default()
            },
            ScriptedDocuments {
                fail: true,
                ..Default::default()
            },
        );
        let bank = fx.service.create_bank(acme()).await.unwrap();

        let view = fx.service.aggregated_view(bank.id).await.unwrap();

        assert_eq!(view.id, 1);
        assert_eq!(view.name, "Acme");
        assert_eq!(view.details_body, Some(json!({ "tier": "gold" })));
        assert!(view.documents.is_empty());
        assert_eq!(fx.details.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.documents.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn view_root_fields_match_store() {
        let doc = Document {
            id: 9,
            bank_id: 1,
            title: "Licence".into(),
            message: "renewed".into(),
            deleted: false,
        };
        let fx = fixture(
            ScriptedDetails::default(),
            ScriptedDocuments {
                docs: vec![doc.clone()],
                ..Default::default()
            },
        );
        let bank = fx.service.create_bank(acme()).await.unwrap();

        let view = fx.service.aggregated_view(bank.id).await.unwrap();

        assert_eq!(
            view,
            AggregatedBankView {
                id: bank.id,
                name: bank.name,
                code: bank.code,
                address: bank.address,
                phone_number: bank.phone_number,
                email: bank.email,
                details_body: None,
                documents: vec![doc],
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_bank_is_not_found_without_downstream_calls() {
        let fx = fixture(ScriptedDetails::default(), ScriptedDocuments::default());

        let err = fx.service.aggregated_view(99).await.unwrap_err();

        assert!(matches!(err, RegistryError::NotFound(_)));
        assert_eq!(fx.details.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.documents.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn details_failure_propagates_under_propagate_policy() {
        let fx = fixture(
            ScriptedDetails {
                fail: true,
                ..Default::default()
            },
            ScriptedDocuments::default(),
        );
        let bank = fx.service.create_bank(acme()).await.unwrap();

        let err = fx.service.aggregated_view(bank.id).await.unwrap_err();

        assert!(matches!(
            err,
            RegistryError::Downstream {
                service: "details",
                ..
            }
        ));
        assert_eq!(fx.details.calls.load(Ordering::SeqCst), 3);
    }

    // ── CRUD ───────────────────────────────────────────────────

    #[tokio::test]
    async fn invalid_bank_is_rejected_before_store() {
        let fx = fixture(ScriptedDetails::default(), ScriptedDocuments::default());
        let bad = NewBank {
            email: " ".into(),
            ..acme()
        };

        let err = fx.service.create_bank(bad).await.unwrap_err();

        assert_eq!(err.http_status(), 400);
        assert!(fx.banks.is_empty());
    }

    #[tokio::test]
    async fn get_missing_bank_is_not_found() {
        let fx = fixture(ScriptedDetails::default(), ScriptedDocuments::default());
        let err = fx.service.get_bank(3).await.unwrap_err();
        assert_eq!(err.to_string(), "not found: bank 3");
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let fx = fixture(ScriptedDetails::default(), ScriptedDocuments::default());
        let bank = fx.service.create_bank(acme()).await.unwrap();

        fx.service.delete_bank(bank.id).await.unwrap();
        fx.service.delete_bank(bank.id).await.unwrap();

        assert!(fx.service.get_bank(bank.id).await.is_err());
        assert!(fx.service.list_banks().await.unwrap().is_empty());
    }

    // ── Details registration ───────────────────────────────────

    #[tokio::test]
    async fn register_details_uses_path_bank_id() {
        let fx = fixture(ScriptedDetails::default(), ScriptedDocuments::default());
        let bank = fx.service.create_bank(acme()).await.unwrap();
        let payload = NewBankDetails {
            bank_id: 777,
            name: "Acme Ops".into(),
            code: "ACM-OPS".into(),
            address: "2 Side St".into(),
            phone_number: "555-0101".into(),
            email: "desk@acme.test".into(),
        };

        let body = fx.service.register_details(bank.id, payload).await.unwrap();

        assert_eq!(body["bankId"], bank.id);
        let created = fx.details.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].bank_id, bank.id);
    }

    #[tokio::test]
    async fn register_details_for_missing_bank_skips_downstream() {
        let fx = fixture(ScriptedDetails::default(), ScriptedDocuments::default());
        let payload = NewBankDetails {
            name: "n".into(),
            code: "c".into(),
            address: "a".into(),
            phone_number: "p".into(),
            email: "e".into(),
            ..Default::default()
        };

        let err = fx.service.register_details(8, payload).await.unwrap_err();

        assert!(matches!(err, RegistryError::NotFound(_)));
        assert_eq!(fx.details.calls.load(Ordering::SeqCst), 0);
    }
}
