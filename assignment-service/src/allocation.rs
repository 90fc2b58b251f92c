//! Identifier allocation.
//!
//! Reads the full assignment history, takes the complement against the pool
//! and draws the requested quantity. Committing the drawn identifiers is the
//! caller's job; nothing here locks across the read and the commit.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tokio::sync::Mutex;

use common::errors::{AppError, AppResult};
use common::models::PoolStats;
use common::utils::{IdentifierPool, POOL_SIZE};

use crate::store::AssignmentStore;

type RandomSource = Box<dyn RngCore + Send>;

/// Allocation component.
#[derive(Clone)]
pub struct AllocationService {
    store: Arc<dyn AssignmentStore>,
    rng: Arc<Mutex<RandomSource>>,
}

impl AllocationService {
    /// Creates an allocator drawing from an entropy-seeded generator.
    pub fn new(store: Arc<dyn AssignmentStore>) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    /// Creates an allocator drawing from the given generator.
    pub fn with_rng<R>(store: Arc<dyn AssignmentStore>, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        Self {
            store,
            rng: Arc::new(Mutex::new(Box::new(rng))),
        }
    }

    /// The store this allocator reads from; commits go to the same store.
    pub fn store(&self) -> &dyn AssignmentStore {
        self.store.as_ref()
    }

    /// Identifiers not held by any stored assignment, ascending.
    pub async fn available(&self) -> AppResult<Vec<String>> {
        let records = self.store.scan_all().await?;
        Ok(IdentifierPool::available(
            records
                .iter()
                .flat_map(|r| r.identifiers.iter().map(String::as_str)),
        ))
    }

    /// Draws `quantity` unassigned identifiers, sorted ascending.
    ///
    /// # Errors
    /// - `AppError::Validation` if `quantity` is zero (no store access).
    /// - `AppError::StoreUnavailable` if the history cannot be read.
    /// - `AppError::PoolExhausted` if fewer than `quantity` remain.
    pub async fn allocate(&self, quantity: usize) -> AppResult<Vec<String>> {
        if quantity == 0 {
            return Err(AppError::Validation("quantity must be at least 1".into()));
        }

        let available = self.available().await?;
        tracing::debug!(quantity, available = available.len(), "drawing identifiers");

        let mut rng = self.rng.lock().await;
        IdentifierPool::draw(available, quantity, &mut *rng)
    }

    /// Current pool occupancy.
    pub async fn stats(&self) -> AppResult<PoolStats> {
        let available = self.available().await?.len();
        Ok(PoolStats {
            total: POOL_SIZE,
            assigned: POOL_SIZE - available,
            available,
        })
    }
}
