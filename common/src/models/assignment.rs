//! Assignment models.
//!
//! An assignment binds one requester to a sorted set of identifiers. It is
//! created once and never modified.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A persisted assignment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Assignment {
    /// Store-assigned record identity.
    pub id: Uuid,
    /// Requester name.
    pub name: String,
    /// Requester email, used as an exact-match lookup key.
    pub email: String,
    /// Requester phone, stored as given.
    pub phone: String,
    /// Number of identifiers in this assignment.
    pub quantity: u32,
    /// Assigned identifiers, ascending.
    pub identifiers: Vec<String>,
    /// Commit timestamp.
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    /// Whether this assignment holds `identifier` (exact element match).
    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.iter().any(|id| id == identifier)
    }

    /// Ordering used by every lookup: newest first, then by identity
    /// descending so equal timestamps still yield a total order.
    pub fn newest_first(a: &Assignment, b: &Assignment) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// An assignment ready to be committed; the store adds identity and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub identifiers: Vec<String>,
}

impl NewAssignment {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        identifiers: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            identifiers,
        }
    }

    /// Quantity is always the identifier count.
    pub fn quantity(&self) -> u32 {
        self.identifiers.len() as u32
    }

    /// Attaches the store-assigned identity and commit time.
    pub fn into_assignment(self, id: Uuid, created_at: DateTime<Utc>) -> Assignment {
        Assignment {
            id,
            quantity: self.quantity(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            identifiers: self.identifiers,
            created_at,
        }
    }
}

/// Request body for creating a new assignment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAssignmentRequest {
    /// Requester name.
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    /// Requester email.
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    /// Requester phone (WhatsApp) number.
    #[validate(length(min = 1, message = "Phone must not be empty"))]
    pub phone: String,

    /// How many identifiers to allocate.
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: usize,
}

impl CreateAssignmentRequest {
    /// Applies the form-side normalization: trimmed fields, lowercase email.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            quantity: self.quantity,
        }
    }

    /// Converts the request plus drawn identifiers into a commit payload.
    pub fn into_new_assignment(self, identifiers: Vec<String>) -> NewAssignment {
        NewAssignment::new(self.name, self.email, self.phone, identifiers)
    }
}
