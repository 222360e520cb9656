//! Process-local document store for demo mode
//!
//! State lives in this process only and is lost on restart. The server
//! refuses to start with it in production (see `Config::validate`).

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::{
    BatchOp, Document, DocumentStore, Query, QueryPage, StoreError, StoreResult, apply_create,
    apply_update,
};

type Slot = (String, String);

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn commit_ops(&self, ops: Vec<BatchOp>) -> StoreResult<Vec<Document>> {
        let mut collections = self.collections.write();

        // Stage every write first so a failing op leaves the maps untouched
        let mut staged: HashMap<Slot, Document> = HashMap::new();
        let mut written = Vec::with_capacity(ops.len());
        for op in ops {
            let slot = (op.collection().to_string(), op.id().to_string());
            let existing = staged.get(&slot).cloned().or_else(|| {
                collections
                    .get(&slot.0)
                    .and_then(|docs| docs.get(&slot.1))
                    .cloned()
            });
            let doc = match op {
                BatchOp::Create {
                    collection,
                    id,
                    data,
                } => apply_create(existing.as_ref(), &collection, &id, data)?,
                BatchOp::Update {
                    collection,
                    id,
                    patch,
                    expected_version,
                } => apply_update(existing, &collection, &id, patch, expected_version)?,
            };
            written.push(doc.clone());
            staged.insert(slot, doc);
        }

        for ((collection, id), doc) in staged {
            collections.entry(collection).or_default().insert(id, doc);
        }
        Ok(written)
    }

    fn commit_one(&self, op: BatchOp) -> StoreResult<Document> {
        let mut written = self.commit_ops(vec![op])?;
        written
            .pop()
            .ok_or_else(|| StoreError::InvalidDocument("write produced no document".into()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<QueryPage> {
        let documents: Vec<Document> = self
            .collections
            .read()
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();
        Ok(query.evaluate(documents))
    }

    async fn create(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document> {
        self.commit_one(BatchOp::create(collection, id, data))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
        expected_version: Option<u64>,
    ) -> StoreResult<Document> {
        self.commit_one(BatchOp::update(collection, id, patch, expected_version))
    }

    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> StoreResult<()> {
        self.commit_ops(ops).map(|_| ())
    }
}
