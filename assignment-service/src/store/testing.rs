//! Store wrappers used by tests to vary backend capability and timing.

use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Barrier;

use common::errors::AppResult;
use common::models::{Assignment, CreateAssignmentRequest, NewAssignment};
use common::utils::IdentifierPool;

use crate::allocation::AllocationService;
use crate::lookup::LookupService;
use crate::service::{AssignmentService, AssignmentServiceTrait};

use super::{AssignmentStore, LookupField, StoreError, StoreResult};

/// How the wrapper answers `query_contains`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Delegate to the inner store.
    Native,
    /// Report the capability as missing.
    Unsupported,
    /// Advertise the capability but fail every call.
    Failing,
}

/// Wraps a store with configurable containment, scan failure and an
/// optional barrier reached after every `scan_all`.
pub struct TestStore {
    inner: Arc<dyn AssignmentStore>,
    containment: Containment,
    scan_fails: bool,
    scan_barrier: Option<Arc<Barrier>>,
}

impl TestStore {
    pub fn new(inner: Arc<dyn AssignmentStore>) -> Self {
        Self {
            inner,
            containment: Containment::Native,
            scan_fails: false,
            scan_barrier: None,
        }
    }

    pub fn containment(mut self, containment: Containment) -> Self {
        self.containment = containment;
        self
    }

    pub fn failing_scan(mut self) -> Self {
        self.scan_fails = true;
        self
    }

    /// Every `scan_all` waits on `barrier` after reading.
    pub fn scan_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.scan_barrier = Some(barrier);
        self
    }
}

#[async_trait]
impl AssignmentStore for TestStore {
    fn backend(&self) -> &'static str {
        "test"
    }

    fn supports_containment(&self) -> bool {
        self.containment != Containment::Unsupported
    }

    async fn scan_all(&self) -> StoreResult<Vec<Assignment>> {
        if self.scan_fails {
            return Err(StoreError::Unavailable("scan failed".into()));
        }
        let records = self.inner.scan_all().await?;
        if let Some(barrier) = &self.scan_barrier {
            barrier.wait().await;
        }
        Ok(records)
    }

    async fn insert(&self, new: NewAssignment) -> StoreResult<Assignment> {
        self.inner.insert(new).await
    }

    async fn query_eq(&self, field: LookupField, value: &str) -> StoreResult<Vec<Assignment>> {
        self.inner.query_eq(field, value).await
    }

    async fn query_contains(&self, identifier: &str) -> StoreResult<Vec<Assignment>> {
        match self.containment {
            Containment::Native => self.inner.query_contains(identifier).await,
            Containment::Unsupported => Err(StoreError::Unsupported("containment query")),
            Containment::Failing => Err(StoreError::Unavailable("containment query failed".into())),
        }
    }
}

/// Builds a commit payload from string slices.
pub fn new_assignment(email: &str, phone: &str, ids: &[&str]) -> NewAssignment {
    NewAssignment::new(
        "Ana",
        email,
        phone,
        ids.iter().map(|s| s.to_string()).collect(),
    )
}

/// Service over `store` with a seeded generator and the default request cap.
pub fn seeded_service(store: Arc<dyn AssignmentStore>, seed: u64) -> AssignmentService {
    AssignmentService::new(
        AllocationService::with_rng(store.clone(), StdRng::seed_from_u64(seed)),
        LookupService::new(store),
        100,
    )
}

/// Request for `quantity` identifiers from a fixed requester.
pub fn request(email: &str, quantity: usize) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        name: "Ana".into(),
        email: email.into(),
        phone: "+54 911".into(),
        quantity,
    }
}

/// Fills the pool except for `free` with a single record.
pub async fn fill_except(store: &dyn AssignmentStore, free: &str) {
    let taken: Vec<String> = IdentifierPool::universe()
        .into_iter()
        .filter(|id| id != free)
        .collect();
    store
        .insert(NewAssignment::new("Seed", "seed@x.com", "0", taken))
        .await
        .unwrap();
}

/// Two assignments of one identifier each, both reading `inner` before either
/// commits. `inner` must hold exactly one free identifier.
pub async fn racing_pair(
    inner: Arc<dyn AssignmentStore>,
) -> (AppResult<Assignment>, AppResult<Assignment>) {
    let barrier = Arc::new(Barrier::new(2));
    let store: Arc<dyn AssignmentStore> =
        Arc::new(TestStore::new(inner).scan_barrier(barrier));
    let first = seeded_service(store.clone(), 1);
    let second = seeded_service(store, 2);

    tokio::join!(
        first.assign(request("a@x.com", 1)),
        second.assign(request("b@x.com", 1)),
    )
}
