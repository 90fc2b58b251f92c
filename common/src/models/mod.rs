//! Shared data models.

pub mod assignment;
pub mod lookup;
pub mod pool;

// Re-export commonly used types
pub use assignment::{Assignment, CreateAssignmentRequest, NewAssignment};
pub use lookup::{SearchQuery, SearchType};
pub use pool::PoolStats;
