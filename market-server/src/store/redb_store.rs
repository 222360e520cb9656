//! redb-backed document store
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `documents` | `(collection, id)` | JSON-serialized [`Document`] |
//!
//! Every write (single or batched) runs in one write transaction, so a batch
//! either commits as a whole or leaves no trace. redb calls are blocking and
//! are moved off the async runtime with `spawn_blocking`.

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use super::{
    BatchOp, Document, DocumentStore, Query, QueryPage, StoreError, StoreResult, apply_create,
    apply_update,
};

const DOCUMENTS_TABLE: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("documents");

/// Document store backed by an embedded redb database
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for tests)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DOCUMENTS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    async fn blocking<R, F>(&self, f: F) -> StoreResult<R>
    where
        F: FnOnce(&Database) -> StoreResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }

    fn read_slot(txn: &WriteTransaction, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let table = txn.open_table(DOCUMENTS_TABLE)?;
        let slot = match table.get((collection, id))? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(slot)
    }

    fn write_slot(txn: &WriteTransaction, doc: &Document, collection: &str) -> StoreResult<()> {
        let mut table = txn.open_table(DOCUMENTS_TABLE)?;
        let value = serde_json::to_vec(doc)?;
        table.insert((collection, doc.id.as_str()), value.as_slice())?;
        Ok(())
    }

    fn apply_op(txn: &WriteTransaction, op: BatchOp) -> StoreResult<Document> {
        match op {
            BatchOp::Create {
                collection,
                id,
                data,
            } => {
                let existing = Self::read_slot(txn, &collection, &id)?;
                let doc = apply_create(existing.as_ref(), &collection, &id, data)?;
                Self::write_slot(txn, &doc, &collection)?;
                Ok(doc)
            }
            BatchOp::Update {
                collection,
                id,
                patch,
                expected_version,
            } => {
                let existing = Self::read_slot(txn, &collection, &id)?;
                let doc = apply_update(existing, &collection, &id, patch, expected_version)?;
                Self::write_slot(txn, &doc, &collection)?;
                Ok(doc)
            }
        }
    }

    fn commit_ops(db: &Database, ops: Vec<BatchOp>) -> StoreResult<Vec<Document>> {
        let txn = db.begin_write()?;
        let mut written = Vec::with_capacity(ops.len());
        for op in ops {
            match Self::apply_op(&txn, op) {
                Ok(doc) => written.push(doc),
                Err(e) => {
                    txn.abort()?;
                    return Err(e);
                }
            }
        }
        txn.commit()?;
        Ok(written)
    }
}

fn single(written: Vec<Document>) -> StoreResult<Document> {
    written
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::InvalidDocument("write produced no document".to_string()))
}

#[async_trait]
impl DocumentStore for RedbStore {
    fn backend(&self) -> &'static str {
        "redb"
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let (collection, id) = (collection.to_string(), id.to_string());
        self.blocking(move |db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(DOCUMENTS_TABLE)?;
            match table.get((collection.as_str(), id.as_str()))? {
                Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<QueryPage> {
        let collection = collection.to_string();
        let query = query.clone();
        self.blocking(move |db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(DOCUMENTS_TABLE)?;

            let mut documents = Vec::new();
            for result in table.range((collection.as_str(), "")..)? {
                let (key, value) = result?;
                if key.value().0 != collection {
                    break;
                }
                documents.push(serde_json::from_slice::<Document>(value.value())?);
            }

            Ok(query.evaluate(documents))
        })
        .await
    }

    async fn create(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document> {
        let op = BatchOp::create(collection, id, data);
        let written = self.blocking(move |db| Self::commit_ops(db, vec![op])).await?;
        single(written)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
        expected_version: Option<u64>,
    ) -> StoreResult<Document> {
        let op = BatchOp::update(collection, id, patch, expected_version);
        let written = self.blocking(move |db| Self::commit_ops(db, vec![op])).await?;
        single(written)
    }

    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> StoreResult<()> {
        if ops.is_empty() {
            return Ok(());
        }
        let count = ops.len();
        self.blocking(move |db| Self::commit_ops(db, ops)).await?;
        tracing::debug!(ops = count, "Batch committed");
        Ok(())
    }
}
