//! Data models for account management

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;

use super::validation::{ValidationError, validate_balance, validate_email, validate_name};
use crate::money::Amount;

/// Account ID (store-assigned `BIGSERIAL`)
pub type AccountId = i64;

/// One holder of funds
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Name: {}, Email: {}, Balance: {}",
            self.id, self.name, self.email, self.balance
        )
    }
}

/// Validated insert payload
///
/// Fields are private to force validation through `new()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    name: String,
    email: String,
    balance: Amount,
}

impl NewAccount {
    pub fn new(name: &str, email: &str, initial_balance: Amount) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validate_name(name)?,
            email: validate_email(email)?,
            balance: validate_balance(initial_balance)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }
}
