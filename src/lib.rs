//! pg_transfer - Atomic Account Transfers on PostgreSQL
//!
//! A small account store plus a transfer engine that moves balances between
//! accounts as one all-or-nothing transaction, correct under concurrency.
//!
//! # Modules
//!
//! - [`money`] - Fixed-point amounts (minor units, no floating point)
//! - [`account`] - Account records: create, list, fetch-by-id
//! - [`transfer`] - Transfer engine, state machine and error taxonomy
//! - [`db`] - Connection pool and schema bootstrap
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing subscriber setup

pub mod account;
pub mod config;
pub mod db;
pub mod logging;
pub mod money;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, AccountError, AccountId, AccountRepository, NewAccount};
pub use config::{AppConfig, DatabaseConfig, TransferConfig};
pub use db::Database;
pub use money::{Amount, MoneyError};
pub use transfer::{
    BalancePair, IsolationLevel, Party, TransferEngine, TransferError, TransferReceipt,
    TransferState,
};
