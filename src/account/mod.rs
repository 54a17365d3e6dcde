//! Account management module
//!
//! PostgreSQL-based storage for account holders and their balances.

pub mod error;
pub mod models;
pub mod repository;
pub mod validation;

// Re-export commonly used types
pub use error::AccountError;
pub use models::{Account, AccountId, NewAccount};
pub use repository::AccountRepository;
pub use validation::ValidationError;

// Re-export Database from top-level db module
pub use crate::db::Database;
