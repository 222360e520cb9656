//! Persistence adapter
//!
//! Every manager talks to storage through [`DocumentStore`]: JSON documents
//! grouped in named collections, each carrying a version number used for
//! optimistic concurrency.
//!
//! | Implementation | Use |
//! |----------------|-----|
//! | [`RedbStore`] | embedded redb file, the real backend |
//! | [`MemoryStore`] | process-local maps, demo mode only |
//! | [`TimeoutStore`] | wraps either one with a per-call deadline |
//!
//! [`Collection`] layers typed records and compare-and-swap updates on top.

pub mod collections {
    //! Collection names
    pub const GROUPS: &str = "buying_groups";
    pub const ORDERS: &str = "orders";
    pub const SURPLUS: &str = "surplus_items";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const USERS: &str = "users";
    pub const PLATFORM_STATS: &str = "platform_stats";
    pub const ANALYTICS_EVENTS: &str = "analytics_events";
}

mod collection;
mod error;
mod memory;
mod query;
mod redb_store;
mod timeout;

pub use collection::{Collection, MAX_CAS_ATTEMPTS, Record, Versioned};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use query::{OrderBy, Predicate, Query, QueryPage};
pub use redb_store::RedbStore;
pub use timeout::TimeoutStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    /// Starts at 1, incremented by every write
    pub version: u64,
    pub data: Value,
}

/// One write inside [`DocumentStore::atomic_batch`]
#[derive(Debug, Clone)]
pub enum BatchOp {
    Create {
        collection: String,
        id: String,
        data: Value,
    },
    Update {
        collection: String,
        id: String,
        patch: Value,
        expected_version: Option<u64>,
    },
}

impl BatchOp {
    pub fn create(collection: &str, id: &str, data: Value) -> Self {
        Self::Create {
            collection: collection.to_string(),
            id: id.to_string(),
            data,
        }
    }

    pub fn update(collection: &str, id: &str, patch: Value, expected_version: Option<u64>) -> Self {
        Self::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            patch,
            expected_version,
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            Self::Create { collection, .. } | Self::Update { collection, .. } => collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Create { id, .. } | Self::Update { id, .. } => id,
        }
    }
}

/// Generic document-store capability set
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Filter, order and page a collection. `total` counts all matches.
    async fn query(&self, collection: &str, query: &Query) -> StoreResult<QueryPage>;

    /// Insert a new document; fails with [`StoreError::AlreadyExists`] if `id` is taken
    async fn create(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document>;

    /// Shallow-merge `patch` into the document's top-level fields.
    ///
    /// With `expected_version` set, fails with [`StoreError::VersionConflict`]
    /// unless the stored version matches.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
        expected_version: Option<u64>,
    ) -> StoreResult<Document>;

    /// Apply every operation or none of them
    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> StoreResult<()>;

    /// Write-time clock; ordering-sensitive fields are stamped from here
    fn server_time(&self) -> i64 {
        shared::util::now_millis()
    }
}

/// Build the document produced by a create against the current slot
pub(crate) fn apply_create(
    existing: Option<&Document>,
    collection: &str,
    id: &str,
    data: Value,
) -> StoreResult<Document> {
    if existing.is_some() {
        return Err(StoreError::AlreadyExists {
            collection: collection.to_string(),
            id: id.to_string(),
        });
    }
    if !data.is_object() {
        return Err(StoreError::InvalidDocument(format!(
            "{collection}/{id}: document must be a JSON object"
        )));
    }
    Ok(Document {
        id: id.to_string(),
        version: 1,
        data,
    })
}

/// Build the document produced by an update against the current slot
pub(crate) fn apply_update(
    existing: Option<Document>,
    collection: &str,
    id: &str,
    patch: Value,
    expected_version: Option<u64>,
) -> StoreResult<Document> {
    let mut doc = existing.ok_or_else(|| StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    })?;

    if let Some(expected) = expected_version
        && expected != doc.version
    {
        return Err(StoreError::VersionConflict {
            collection: collection.to_string(),
            id: id.to_string(),
            expected,
            found: doc.version,
        });
    }

    let Value::Object(fields) = patch else {
        return Err(StoreError::InvalidDocument(format!(
            "{collection}/{id}: patch must be a JSON object"
        )));
    };
    match &mut doc.data {
        Value::Object(target) => {
            for (key, value) in fields {
                target.insert(key, value);
            }
        }
        other => *other = Value::Object(fields),
    }
    doc.version += 1;
    Ok(doc)
}
