//! Business rules a candidate must pass before it may enter the ledger.

use tally_domain::{CategoryId, Transaction};
use thiserror::Error;

/// Ceiling applied when no other limit is configured.
pub const DEFAULT_MAX_AMOUNT: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid amount: {0} is not a finite number")]
    InvalidAmount(f64),
    #[error("Amount {amount} exceeds the limit of {limit}")]
    AmountExceedsLimit { amount: f64, limit: f64 },
    #[error("Invalid category reference: `{0}` is not an integer id")]
    InvalidCategory(String),
}

/// Stateless rule set; rules run in order and the first failure wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationPolicy {
    max_amount: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_amount: DEFAULT_MAX_AMOUNT,
        }
    }
}

impl ValidationPolicy {
    /// Uses `limit` as the ceiling, or the default when it is negative or not finite.
    pub fn with_limit(limit: f64) -> Self {
        if limit.is_finite() && limit >= 0.0 {
            Self { max_amount: limit }
        } else {
            Self::default()
        }
    }

    pub fn max_amount(&self) -> f64 {
        self.max_amount
    }

    /// Checks `candidate`. Zero and negative amounts are accepted. A typed
    /// `category_id` is always well formed and its existence is not checked.
    pub fn validate(&self, candidate: &Transaction) -> Result<(), ValidationError> {
        let amount = candidate.amount;
        if !amount.is_finite() {
            return Err(ValidationError::InvalidAmount(amount));
        }
        if amount > self.max_amount {
            return Err(ValidationError::AmountExceedsLimit {
                amount,
                limit: self.max_amount,
            });
        }
        Ok(())
    }

    /// Reads an untyped category reference: blank means absent, anything
    /// else must be an integer. Existence is not checked.
    pub fn category_reference(raw: &str) -> Result<Option<CategoryId>, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::InvalidCategory(raw.to_string()))
    }
}
