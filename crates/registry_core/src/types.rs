//! Domain records and request/response payloads.
//!
//! JSON field names are camelCase on the wire (`phoneNumber`, `bankId`).

use serde::{Deserialize, Serialize};

/// Surrogate id assigned by the store.
pub type EntityId = i64;

// ── Bank ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    pub id: EntityId,
    pub name: String,
    pub code: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
}

/// Payload for `POST /api/banks`. Missing fields arrive blank and are
/// rejected by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBank {
    pub name: String,
    pub code: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
}

impl NewBank {
    pub fn into_bank(self, id: EntityId) -> Bank {
        Bank {
            id,
            name: self.name,
            code: self.code,
            address: self.address,
            phone_number: self.phone_number,
            email: self.email,
        }
    }
}

// ── BankDetails ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub id: EntityId,
    pub bank_id: EntityId,
    pub name: String,
    pub code: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBankDetails {
    pub bank_id: EntityId,
    pub name: String,
    pub code: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
}

impl NewBankDetails {
    pub fn into_details(self, id: EntityId) -> BankDetails {
        BankDetails {
            id,
            bank_id: self.bank_id,
            name: self.name,
            code: self.code,
            address: self.address,
            phone_number: self.phone_number,
            email: self.email,
        }
    }
}

// ── Document ──────────────────────────────────────────────────

/// A document filed against a bank. `deleted` is a soft-delete marker;
/// deleted documents are hidden from the list queries but still readable
/// by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: EntityId,
    pub bank_id: EntityId,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewDocument {
    pub bank_id: EntityId,
    pub title: String,
    pub message: String,
}

impl NewDocument {
    pub fn into_document(self, id: EntityId) -> Document {
        Document {
            id,
            bank_id: self.bank_id,
            title: self.title,
            message: self.message,
            deleted: false,
        }
    }
}

// ── Aggregated view ───────────────────────────────────────────

/// A bank plus whatever the details and documents services returned for it.
///
/// Computed per request and never persisted. `details_body` is the details
/// service payload passed through untouched, or `None` when the details are
/// absent or the lookup failed open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedBankView {
    pub id: EntityId,
    pub name: String,
    pub code: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub details_body: Option<serde_json::Value>,
    pub documents: Vec<Document>,
}

impl AggregatedBankView {
    pub fn compose(
        bank: Bank,
        details_body: Option<serde_json::Value>,
        documents: Vec<Document>,
    ) -> Self {
        Self {
            id: bank.id,
            name: bank.name,
            code: bank.code,
            address: bank.address,
            phone_number: bank.phone_number,
            email: bank.email,
            details_body,
            documents,
        }
    }
}
