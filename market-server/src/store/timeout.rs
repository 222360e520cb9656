//! Per-call deadline around any [`DocumentStore`]
//!
//! A timed-out write may still commit in the background; callers that retry
//! creates should supply their own document id.

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::{BatchOp, Document, DocumentStore, Query, QueryPage, StoreError, StoreResult};

pub struct TimeoutStore {
    inner: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl TimeoutStore {
    pub fn new(inner: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(&self, op: &'static str, fut: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    backend = self.inner.backend(),
                    op,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl DocumentStore for TimeoutStore {
    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.bounded("get", self.inner.get(collection, id)).await
    }

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<QueryPage> {
        self.bounded("query", self.inner.query(collection, query)).await
    }

    async fn create(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document> {
        self.bounded("create", self.inner.create(collection, id, data))
            .await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
        expected_version: Option<u64>,
    ) -> StoreResult<Document> {
        self.bounded(
            "update",
            self.inner.update(collection, id, patch, expected_version),
        )
        .await
    }

    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> StoreResult<()> {
        self.bounded("atomic_batch", self.inner.atomic_batch(ops))
            .await
    }

    fn server_time(&self) -> i64 {
        self.inner.server_time()
    }
}
