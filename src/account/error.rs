//! Account Store Error Types

use thiserror::Error;

use super::models::AccountId;
use super::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AccountError {
    /// Connectivity, driver or constraint failure
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Account not found: {0}")]
    NotFound(AccountId),

    #[error("Invalid account: {0}")]
    Validation(#[from] ValidationError),
}

impl AccountError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::Store(_) => "STORE_ERROR",
            AccountError::NotFound(_) => "ACCOUNT_NOT_FOUND",
            AccountError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AccountError::NotFound(7).code(), "ACCOUNT_NOT_FOUND");
        assert_eq!(
            AccountError::Store(sqlx::Error::PoolTimedOut).code(),
            "STORE_ERROR"
        );
        assert_eq!(
            AccountError::from(ValidationError::Empty { field: "name" }).code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(AccountError::NotFound(42).to_string(), "Account not found: 42");
    }
}
