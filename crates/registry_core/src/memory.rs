//! In-memory stores for tests and for running a service without Postgres.
//!
//! Ids come from a per-store monotonic sequence starting at 1, matching a
//! `BIGSERIAL` column.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::ports::{BankDetailsStore, BankStore, DocumentStore, Result};
use crate::types::*;

/// Id-ordered table with a monotonic id sequence.
struct Table<T> {
    rows: RwLock<BTreeMap<EntityId, T>>,
    next_id: AtomicI64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn insert_with(&self, build: impl FnOnce(EntityId) -> T) -> Result<T> {
        let mut rows = self.rows.write().map_err(|e| anyhow!("Lock: {}", e))?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = build(id);
        rows.insert(id, row.clone());
        Ok(row)
    }

    fn get(&self, id: EntityId) -> Result<Option<T>> {
        let rows = self.rows.read().map_err(|e| anyhow!("Lock: {}", e))?;
        Ok(rows.get(&id).cloned())
    }

    fn select(&self, keep: impl Fn(&T) -> bool) -> Result<Vec<T>> {
        let rows = self.rows.read().map_err(|e| anyhow!("Lock: {}", e))?;
        Ok(rows.values().filter(|row| keep(row)).cloned().collect())
    }

    fn update(&self, id: EntityId, apply: impl FnOnce(&mut T)) -> Result<()> {
        let mut rows = self.rows.write().map_err(|e| anyhow!("Lock: {}", e))?;
        if let Some(row) = rows.get_mut(&id) {
            apply(row);
        }
        Ok(())
    }

    fn remove(&self, id: EntityId) -> Result<()> {
        let mut rows = self.rows.write().map_err(|e| anyhow!("Lock: {}", e))?;
        rows.remove(&id);
        Ok(())
    }

    fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or_default()
    }
}

// ── MemoryBankStore ───────────────────────────────────────────

pub struct MemoryBankStore {
    table: Table<Bank>,
}

impl MemoryBankStore {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBankStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BankStore for MemoryBankStore {
    async fn save(&self, bank: NewBank) -> Result<Bank> {
        self.table.insert_with(|id| bank.into_bank(id))
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Bank>> {
        self.table.get(id)
    }

    async fn find_all(&self) -> Result<Vec<Bank>> {
        self.table.select(|_| true)
    }

    async fn delete_by_id(&self, id: EntityId) -> Result<()> {
        self.table.remove(id)
    }
}

// ── MemoryBankDetailsStore ────────────────────────────────────

pub struct MemoryBankDetailsStore {
    table: Table<BankDetails>,
}

impl MemoryBankDetailsStore {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBankDetailsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BankDetailsStore for MemoryBankDetailsStore {
    async fn save(&self, details: NewBankDetails) -> Result<BankDetails> {
        self.table.insert_with(|id| details.into_details(id))
    }

    async fn find_by_bank_id(&self, bank_id: EntityId) -> Result<Option<BankDetails>> {
        Ok(self
            .table
            .select(|d| d.bank_id == bank_id)?
            .into_iter()
            .next_back())
    }

    async fn find_all(&self) -> Result<Vec<BankDetails>> {
        self.table.select(|_| true)
    }
}

// ── MemoryDocumentStore ───────────────────────────────────────

pub struct MemoryDocumentStore {
    table: Table<Document>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn save(&self, document: NewDocument) -> Result<Document> {
        self.table.insert_with(|id| document.into_document(id))
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Document>> {
        self.table.get(id)
    }

    async fn find_active(&self) -> Result<Vec<Document>> {
        self.table.select(|d| !d.deleted)
    }

    async fn find_by_bank_id(&self, bank_id: EntityId) -> Result<Vec<Document>> {
        self.table.select(|d| d.bank_id == bank_id && !d.deleted)
    }

    async fn mark_deleted(&self, id: EntityId) -> Result<()> {
        self.table.update(id, |d| d.deleted = true)
    }
}
