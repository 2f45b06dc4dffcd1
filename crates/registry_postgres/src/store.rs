//! Postgres-backed stores.
//!
//! Each store is a newtype over `PgPool`. All SQL is runtime-checked
//! (`sqlx::query_as`, not `sqlx::query!`) so building does not need a
//! live database.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;

use registry_core::ports::{BankDetailsStore, BankStore, DocumentStore, Result};
use registry_core::types::*;

/// All three stores over one pool.
pub struct PgStores {
    pub banks: PgBankStore,
    pub bank_details: PgBankDetailsStore,
    pub documents: PgDocumentStore,
}

impl PgStores {
    pub fn new(pool: PgPool) -> Self {
        Self {
            banks: PgBankStore::new(pool.clone()),
            bank_details: PgBankDetailsStore::new(pool.clone()),
            documents: PgDocumentStore::new(pool),
        }
    }
}

// ── Row types ─────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct PgBankRow {
    id: i64,
    name: String,
    code: String,
    address: String,
    phone_number: String,
    email: String,
}

impl From<PgBankRow> for Bank {
    fn from(r: PgBankRow) -> Self {
        Bank {
            id: r.id,
            name: r.name,
            code: r.code,
            address: r.address,
            phone_number: r.phone_number,
            email: r.email,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PgBankDetailsRow {
    id: i64,
    bank_id: i64,
    name: String,
    code: String,
    address: String,
    phone_number: String,
    email: String,
}

impl From<PgBankDetailsRow> for BankDetails {
    fn from(r: PgBankDetailsRow) -> Self {
        BankDetails {
            id: r.id,
            bank_id: r.bank_id,
            name: r.name,
            code: r.code,
            address: r.address,
            phone_number: r.phone_number,
            email: r.email,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PgDocumentRow {
    id: i64,
    bank_id: i64,
    title: String,
    message: String,
    deleted: bool,
}

impl From<PgDocumentRow> for Document {
    fn from(r: PgDocumentRow) -> Self {
        Document {
            id: r.id,
            bank_id: r.bank_id,
            title: r.title,
            message: r.message,
            deleted: r.deleted,
        }
    }
}

// ── PgBankStore ───────────────────────────────────────────────

pub struct PgBankStore {
    pool: PgPool,
}

impl PgBankStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BankStore for PgBankStore {
    async fn save(&self, bank: NewBank) -> Result<Bank> {
        let row = sqlx::query_as::<_, PgBankRow>(
            r#"
            INSERT INTO banks (name, code, address, phone_number, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, code, address, phone_number, email
            "#,
        )
        .bind(&bank.name)
        .bind(&bank.code)
        .bind(&bank.address)
        .bind(&bank.phone_number)
        .bind(&bank.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Bank>> {
        let row = sqlx::query_as::<_, PgBankRow>(
            r#"
            SELECT id, name, code, address, phone_number, email
            FROM banks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(row.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<Bank>> {
        let rows = sqlx::query_as::<_, PgBankRow>(
            r#"
            SELECT id, name, code, address, phone_number, email
            FROM banks
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_by_id(&self, id: EntityId) -> Result<()> {
        sqlx::query("DELETE FROM banks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(())
    }
}

// ── PgBankDetailsStore ────────────────────────────────────────

pub struct PgBankDetailsStore {
    pool: PgPool,
}

impl PgBankDetailsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BankDetailsStore for PgBankDetailsStore {
    async fn save(&self, details: NewBankDetails) -> Result<BankDetails> {
        let row = sqlx::query_as::<_, PgBankDetailsRow>(
            r#"
            INSERT INTO bank_details (bank_id, name, code, address, phone_number, email)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, bank_id, name, code, address, phone_number, email
            "#,
        )
        .bind(details.bank_id)
        .bind(&details.name)
        .bind(&details.code)
        .bind(&details.address)
        .bind(&details.phone_number)
        .bind(&details.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(row.into())
    }

    async fn find_by_bank_id(&self, bank_id: EntityId) -> Result<Option<BankDetails>> {
        let row = sqlx::query_as::<_, PgBankDetailsRow>(
            r#"
            SELECT id, bank_id, name, code, address, phone_number, email
            FROM bank_details
            WHERE bank_id = $1
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(bank_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(row.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<BankDetails>> {
        let rows = sqlx::query_as::<_, PgBankDetailsRow>(
            r#"
            SELECT id, bank_id, name, code, address, phone_number, email
            FROM bank_details
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// ── PgDocumentStore ───────────────────────────────────────────

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn save(&self, document: NewDocument) -> Result<Document> {
        let row = sqlx::query_as::<_, PgDocumentRow>(
            r#"
            INSERT INTO documents (bank_id, title, message, deleted)
            VALUES ($1, $2, $3, FALSE)
            RETURNING id, bank_id, title, message, deleted
            "#,
        )
        .bind(document.bank_id)
        .bind(&document.title)
        .bind(&document.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, PgDocumentRow>(
            r#"
            SELECT id, bank_id, title, message, deleted
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(row.map(Into::into))
    }

    async fn find_active(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, PgDocumentRow>(
            r#"
            SELECT id, bank_id, title, message, deleted
            FROM documents
            WHERE deleted = FALSE
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_bank_id(&self, bank_id: EntityId) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, PgDocumentRow>(
            r#"
            SELECT id, bank_id, title, message, deleted
            FROM documents
            WHERE bank_id = $1
              AND deleted = FALSE
            ORDER BY id
            "#,
        )
        .bind(bank_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_deleted(&self, id: EntityId) -> Result<()> {
        sqlx::query("UPDATE documents SET deleted = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(())
    }
}
