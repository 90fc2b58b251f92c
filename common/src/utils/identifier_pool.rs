//! Identifier pool primitives.
//!
//! The pool is the fixed range "000".."999". Everything here is pure: the
//! caller supplies the assigned identifiers and the random source.

use std::collections::HashSet;

use rand::Rng;

use crate::errors::{AppError, AppResult};

/// Number of identifiers in the pool.
pub const POOL_SIZE: usize = 1000;

/// Every identifier is rendered with exactly this many digits.
pub const IDENTIFIER_WIDTH: usize = 3;

/// Operations over the fixed identifier pool.
pub struct IdentifierPool;

impl IdentifierPool {
    /// Renders a pool position as a zero-padded identifier.
    pub fn format(value: u16) -> String {
        format!("{:0width$}", value, width = IDENTIFIER_WIDTH)
    }

    /// All identifiers in ascending order.
    pub fn universe() -> Vec<String> {
        (0..POOL_SIZE as u16).map(Self::format).collect()
    }

    /// Identifiers not present in `assigned`, in ascending order.
    ///
    /// `assigned` may contain duplicates; they are collapsed before the
    /// complement is taken.
    pub fn available<'a, I>(assigned: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let taken: HashSet<&str> = assigned.into_iter().collect();
        Self::universe()
            .into_iter()
            .filter(|id| !taken.contains(id.as_str()))
            .collect()
    }

    /// Draws `quantity` identifiers uniformly at random from `available`.
    ///
    /// Uses a Fisher-Yates shuffle over the whole candidate list and returns
    /// the first `quantity` entries sorted ascending. Nothing is drawn when
    /// the candidates cannot cover the request.
    ///
    /// # Errors
    /// - `AppError::Validation` if `quantity` is zero.
    /// - `AppError::PoolExhausted` if fewer than `quantity` candidates exist.
    pub fn draw<R>(mut available: Vec<String>, quantity: usize, rng: &mut R) -> AppResult<Vec<String>>
    where
        R: Rng,
    {
        if quantity == 0 {
            return Err(AppError::Validation("quantity must be at least 1".into()));
        }
        if available.len() < quantity {
            return Err(AppError::PoolExhausted {
                available: available.len(),
                requested: quantity,
            });
        }

        for i in (1..available.len()).rev() {
            let j = rng.gen_range(0..=i);
            available.swap(i, j);
        }

        available.truncate(quantity);
        available.sort_unstable();
        Ok(available)
    }

    /// Validates lookup input and pads it to a full identifier.
    ///
    /// Accepts 1 to 3 ASCII digits; "7" becomes "007". No trimming is done.
    ///
    /// # Errors
    /// Returns `AppError::InvalidQuery` for any other input.
    pub fn normalize_query(text: &str) -> AppResult<String> {
        let valid = !text.is_empty()
            && text.len() <= IDENTIFIER_WIDTH
            && text.bytes().all(|b| b.is_ascii_digit());
        if !valid {
            return Err(AppError::InvalidQuery(format!(
                "expected 1-{} digits, got {:?}",
                IDENTIFIER_WIDTH, text
            )));
        }
        Ok(format!("{:0>width$}", text, width = IDENTIFIER_WIDTH))
    }

    /// Whether `text` is a well-formed, fully padded identifier.
    pub fn is_identifier(text: &str) -> bool {
        text.len() == IDENTIFIER_WIDTH && text.bytes().all(|b| b.is_ascii_digit())
    }
}
