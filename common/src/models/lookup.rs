//! Lookup query models.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Which field a search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Exact match on requester email.
    Email,
    /// Exact match on requester phone.
    #[serde(alias = "whatsapp")]
    Phone,
    /// Assignments containing one identifier.
    #[serde(alias = "number")]
    Identifier,
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchType::Email => write!(f, "email"),
            SearchType::Phone => write!(f, "phone"),
            SearchType::Identifier => write!(f, "identifier"),
        }
    }
}

/// Query string for `GET /api/assignments/search`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Field to search by.
    pub by: SearchType,
    /// Search value.
    pub value: String,
}

impl SearchQuery {
    /// Value after the search-form normalization for this search type.
    ///
    /// Emails are trimmed and lowercased, phones and identifiers trimmed.
    pub fn normalized_value(&self) -> String {
        match self.by {
            SearchType::Email => self.value.trim().to_lowercase(),
            SearchType::Phone | SearchType::Identifier => self.value.trim().to_string(),
        }
    }
}
