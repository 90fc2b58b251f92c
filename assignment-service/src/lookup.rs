//! Assignment lookup.
//!
//! Exact-match queries go straight to the store. Identifier containment has
//! two strategies, the store's native query and a full scan filtered here;
//! both finish with the same ordering so callers cannot tell them apart.

use std::sync::Arc;

use common::errors::AppResult;
use common::models::Assignment;
use common::utils::IdentifierPool;

use crate::store::{AssignmentStore, LookupField};

/// How a containment query is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainmentStrategy {
    /// Ask the store to filter.
    Native,
    /// Read every record and filter in process.
    Scan,
}

/// Lookup component.
#[derive(Clone)]
pub struct LookupService {
    store: Arc<dyn AssignmentStore>,
}

impl LookupService {
    pub fn new(store: Arc<dyn AssignmentStore>) -> Self {
        Self { store }
    }

    /// Assignments whose email equals `email` exactly, newest first.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Vec<Assignment>> {
        self.find_by_field(LookupField::Email, email).await
    }

    /// Assignments whose phone equals `phone` exactly, newest first.
    pub async fn find_by_phone(&self, phone: &str) -> AppResult<Vec<Assignment>> {
        self.find_by_field(LookupField::Phone, phone).await
    }

    async fn find_by_field(&self, field: LookupField, value: &str) -> AppResult<Vec<Assignment>> {
        Ok(self.store.query_eq(field, value).await?)
    }

    /// Assignments holding the identifier given as 1-3 digits, newest first.
    ///
    /// Input is validated before the store is touched. A failing or
    /// unsupported native containment query falls back to a scan; only a
    /// failing scan is reported.
    ///
    /// # Errors
    /// - `AppError::InvalidQuery` if `text` is not 1-3 ASCII digits.
    /// - `AppError::StoreUnavailable` if the scan fallback fails.
    pub async fn find_by_identifier(&self, text: &str) -> AppResult<Vec<Assignment>> {
        let identifier = IdentifierPool::normalize_query(text)?;

        if !self.store.supports_containment() {
            return self.find_containing(ContainmentStrategy::Scan, &identifier).await;
        }

        match self.find_containing(ContainmentStrategy::Native, &identifier).await {
            Ok(found) => Ok(found),
            Err(e) => {
                tracing::warn!(
                    backend = self.store.backend(),
                    identifier = %identifier,
                    error = %e,
                    "containment query failed, scanning all assignments"
                );
                self.find_containing(ContainmentStrategy::Scan, &identifier).await
            }
        }
    }

    /// Runs one containment strategy for a padded identifier.
    pub async fn find_containing(
        &self,
        strategy: ContainmentStrategy,
        identifier: &str,
    ) -> AppResult<Vec<Assignment>> {
        let mut found = match strategy {
            ContainmentStrategy::Native => self.store.query_contains(identifier).await?,
            ContainmentStrategy::Scan => self
                .store
                .scan_all()
                .await?
                .into_iter()
                .filter(|a| a.contains(identifier))
                .collect(),
        };
        found.sort_by(Assignment::newest_first);
        Ok(found)
    }
}
