//! Utility functions and helpers.

pub mod id_generator;
pub mod identifier_pool;

// Re-export commonly used types
pub use id_generator::IdGenerator;
pub use identifier_pool::{IdentifierPool, IDENTIFIER_WIDTH, POOL_SIZE};
