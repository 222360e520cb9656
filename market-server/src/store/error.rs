use std::time::Duration;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("{collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    #[error("version conflict on {collection}/{id}: expected {expected}, found {found}")]
    VersionConflict {
        collection: String,
        id: String,
        expected: u64,
        found: u64,
    },

    #[error("{collection}/{id} still contended after {attempts} attempts")]
    Contended {
        collection: String,
        id: String,
        attempts: u32,
    },

    #[error("store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl StoreError {
    /// Transient failures: the same call may succeed if repeated
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout(_)
                | StoreError::Contended { .. }
                | StoreError::VersionConflict { .. }
                | StoreError::Transaction(_)
                | StoreError::Storage(_)
                | StoreError::Join(_)
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
