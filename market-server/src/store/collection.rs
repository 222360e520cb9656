//! Typed access to one collection
//!
//! `modify` is the read-modify-write primitive behind every manager
//! mutation: read the document and its version, run the mutation,
//! then write back only if nobody else wrote in between.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{Document, DocumentStore, Query, StoreError, StoreResult};

/// Compare-and-swap attempts before giving up with [`StoreError::Contended`]
pub const MAX_CAS_ATTEMPTS: u32 = 16;

/// A document type stored in its own collection
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// A record together with the version it was read at
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub record: T,
    pub version: u64,
}

pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn now(&self) -> i64 {
        self.store.server_time()
    }

    fn decode(doc: Document) -> StoreResult<Versioned<T>> {
        Ok(Versioned {
            record: serde_json::from_value(doc.data)?,
            version: doc.version,
        })
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<Versioned<T>>> {
        self.store
            .get(T::COLLECTION, id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// Like [`get`](Self::get) but absence is an error
    pub async fn require(&self, id: &str) -> StoreResult<Versioned<T>> {
        self.get(id).await?.ok_or_else(|| StoreError::NotFound {
            collection: T::COLLECTION.to_string(),
            id: id.to_string(),
        })
    }

    pub async fn insert(&self, record: &T) -> StoreResult<()> {
        let data = serde_json::to_value(record)?;
        self.store.create(T::COLLECTION, record.id(), data).await?;
        Ok(())
    }

    /// Insert a new record. With a caller-chosen id a document that already
    /// exists counts as success, so a retried create is a no-op.
    ///
    /// Returns whether this call created the document.
    pub async fn insert_idempotent(&self, record: &T, caller_chose_id: bool) -> StoreResult<bool> {
        match self.insert(record).await {
            Ok(()) => Ok(true),
            Err(StoreError::AlreadyExists { .. }) if caller_chose_id => {
                tracing::info!(
                    collection = T::COLLECTION,
                    id = %record.id(),
                    "Create retried, keeping existing document"
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Query and decode; returns the page and the total match count
    pub async fn find(&self, query: &Query) -> StoreResult<(Vec<T>, usize)> {
        let page = self.store.query(T::COLLECTION, query).await?;
        let records = page
            .documents
            .into_iter()
            .map(|doc| Self::decode(doc).map(|v| v.record))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok((records, page.total))
    }

    /// Like [`find`](Self::find) but keeps each record's version, for
    /// conditional batch writes
    pub async fn find_versioned(&self, query: &Query) -> StoreResult<Vec<Versioned<T>>> {
        let page = self.store.query(T::COLLECTION, query).await?;
        page.documents.into_iter().map(Self::decode).collect()
    }

    /// Read-modify-write with optimistic concurrency.
    ///
    /// `mutate` receives the current record and the store clock. Returning an
    /// error aborts without writing. On a version conflict the whole cycle is
    /// re-run against fresh state.
    pub async fn modify<R, E, F>(&self, id: &str, mut mutate: F) -> Result<(T, R), E>
    where
        F: FnMut(&mut T, i64) -> Result<R, E> + Send,
        E: From<StoreError>,
        R: Send,
    {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let current = self.require(id).await?;
            let mut record = current.record;
            let outcome = mutate(&mut record, self.now())?;

            let data = serde_json::to_value(&record).map_err(StoreError::from)?;
            match self
                .store
                .update(T::COLLECTION, id, data, Some(current.version))
                .await
            {
                Ok(_) => return Ok((record, outcome)),
                Err(StoreError::VersionConflict { found, .. }) => {
                    tracing::debug!(
                        collection = T::COLLECTION,
                        id = %id,
                        attempt,
                        found,
                        "Version conflict, retrying"
                    );
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!(collection = T::COLLECTION, id = %id, "Giving up after repeated conflicts");
        Err(StoreError::Contended {
            collection: T::COLLECTION.to_string(),
            id: id.to_string(),
            attempts: MAX_CAS_ATTEMPTS,
        }
        .into())
    }
}
