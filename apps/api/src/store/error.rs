//! Store error types

use thiserror::Error;

/// Failure reported by a [`Store`](super::Store) implementation
#[derive(Error, Debug)]
pub enum StoreError {
    /// Query failed inside PostgreSQL or the pool
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Update or delete targeted a row that does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Uniqueness rule violated (one profile per user, one edge per pair)
    #[error("{entity} already exists: {id}")]
    Conflict { entity: &'static str, id: String },

    /// Write pointed at a row that does not exist
    #[error("{entity} does not exist: {id}")]
    InvalidReference { entity: &'static str, id: String },

    /// Backend refused to serve the call
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(entity: &'static str, id: impl ToString) -> Self {
        Self::Conflict {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_reference(entity: &'static str, id: impl ToString) -> Self {
        Self::InvalidReference {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            StoreError::not_found("post", "abc").to_string(),
            "post not found: abc"
        );
        assert_eq!(
            StoreError::conflict("profile", "u1").to_string(),
            "profile already exists: u1"
        );
    }
}
