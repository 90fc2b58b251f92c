//! Pool occupancy models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PoolStats {
    /// Total identifiers in the pool.
    pub total: usize,
    /// Distinct identifiers already assigned.
    pub assigned: usize,
    /// Identifiers still available.
    pub available: usize,
}
