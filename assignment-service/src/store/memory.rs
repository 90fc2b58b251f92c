//! In-process record store.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use common::models::{Assignment, NewAssignment};
use common::utils::IdGenerator;

use super::{AssignmentStore, LookupField, StoreError, StoreResult};

/// Append-only store backed by a vector behind an async lock.
///
/// Inserts take the write lock, which makes them the serialization point for
/// the optional identifier uniqueness check.
pub struct MemoryStore {
    records: RwLock<Vec<Assignment>>,
    unique_identifiers: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store that rejects reused identifiers.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            unique_identifiers: true,
        }
    }

    /// Enables or disables the identifier uniqueness check on insert.
    pub fn with_unique_identifiers(mut self, enabled: bool) -> Self {
        self.unique_identifiers = enabled;
        self
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    fn newest_first(mut records: Vec<Assignment>) -> Vec<Assignment> {
        records.sort_by(Assignment::newest_first);
        records
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn scan_all(&self) -> StoreResult<Vec<Assignment>> {
        Ok(self.records.read().await.clone())
    }

    async fn insert(&self, new: NewAssignment) -> StoreResult<Assignment> {
        let mut records = self.records.write().await;

        if self.unique_identifiers {
            let taken: HashSet<&str> = records
                .iter()
                .flat_map(|r| r.identifiers.iter().map(String::as_str))
                .collect();
            let mut seen = HashSet::new();
            for id in &new.identifiers {
                if taken.contains(id.as_str()) || !seen.insert(id.as_str()) {
                    return Err(StoreError::DuplicateIdentifier(id.clone()));
                }
            }
        }

        let assignment = new.into_assignment(IdGenerator::record_id(), Utc::now());
        records.push(assignment.clone());
        Ok(assignment)
    }

    async fn query_eq(&self, field: LookupField, value: &str) -> StoreResult<Vec<Assignment>> {
        let matches = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| field.value_of(r) == value)
            .cloned()
            .collect();
        Ok(Self::newest_first(matches))
    }

    async fn query_contains(&self, identifier: &str) -> StoreResult<Vec<Assignment>> {
        let matches = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.contains(identifier))
            .cloned()
            .collect();
        Ok(Self::newest_first(matches))
    }
}
