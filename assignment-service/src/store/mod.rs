//! Assignment record store.
//!
//! The store is the only shared mutable resource. It is append-only: records
//! are inserted once and never updated or deleted.

mod memory;
mod postgres;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use common::config::{AppConfig, StoreBackend};
use common::errors::AppError;
use common::models::{Assignment, NewAssignment};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or the operation failed.
    #[error("{0}")]
    Unavailable(String),

    /// The backend cannot serve this kind of query.
    #[error("{0} is not supported by this store")]
    Unsupported(&'static str),

    /// A uniqueness constraint rejected the commit.
    #[error("{0}")]
    DuplicateIdentifier(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            StoreError::Unsupported(what) => {
                AppError::StoreUnavailable(format!("{} is not supported by this store", what))
            }
            StoreError::DuplicateIdentifier(msg) => AppError::DuplicateIdentifier(msg),
        }
    }
}

/// Exact-match lookup fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupField {
    Email,
    Phone,
}

impl LookupField {
    /// Column name in the relational backend.
    pub fn column(&self) -> &'static str {
        match self {
            LookupField::Email => "email",
            LookupField::Phone => "phone",
        }
    }

    /// Reads this field from a record.
    pub fn value_of<'a>(&self, assignment: &'a Assignment) -> &'a str {
        match self {
            LookupField::Email => &assignment.email,
            LookupField::Phone => &assignment.phone,
        }
    }
}

/// Contract every record store backend fulfils.
///
/// Query results are ordered newest first (`Assignment::newest_first`).
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Whether `query_contains` is expected to work on this backend.
    fn supports_containment(&self) -> bool {
        true
    }

    /// Reads every record.
    async fn scan_all(&self) -> StoreResult<Vec<Assignment>>;

    /// Appends a record, assigning its identity and commit timestamp.
    async fn insert(&self, new: NewAssignment) -> StoreResult<Assignment>;

    /// Records whose `field` equals `value` exactly.
    async fn query_eq(&self, field: LookupField, value: &str) -> StoreResult<Vec<Assignment>>;

    /// Records whose identifier list contains `identifier`.
    async fn query_contains(&self, identifier: &str) -> StoreResult<Vec<Assignment>>;
}

/// Builds the store selected by configuration.
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn AssignmentStore>, AppError> {
    let store: Arc<dyn AssignmentStore> = match config.store_backend {
        StoreBackend::Memory => Arc::new(
            MemoryStore::new().with_unique_identifiers(config.enforce_unique_identifiers),
        ),
        StoreBackend::Postgres => Arc::new(PostgresStore::connect(config).await?),
    };

    tracing::info!(
        backend = store.backend(),
        unique_identifiers = config.enforce_unique_identifiers,
        "记录存储已就绪"
    );
    Ok(store)
}
