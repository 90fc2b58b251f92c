//! Unique ID generator.
//!
//! Record identities and request IDs are random v4 UUIDs.

use uuid::Uuid;

/// Generates unique identifiers for stored records and requests.
pub struct IdGenerator;

impl IdGenerator {
    /// Generates the identity for a newly committed assignment record.
    pub fn record_id() -> Uuid {
        Uuid::new_v4()
    }

    /// Generates a unique request ID.
    pub fn request_id() -> String {
        Uuid::new_v4().to_string()
    }
}
