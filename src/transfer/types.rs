//! Transfer Types

use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::TransferState;
use crate::account::AccountId;
use crate::money::Amount;

/// Which side of a transfer an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    Sender,
    Receiver,
}

impl Party {
    pub fn as_str(&self) -> &'static str {
        match self {
            Party::Sender => "sender",
            Party::Receiver => "receiver",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction isolation level applied to each transfer transaction
///
/// `ReadCommitted` relies on `FOR UPDATE` row locks alone. The stricter
/// levels may abort with serialization failures, which the engine retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    /// Statement that must run first inside the transaction
    pub fn set_transaction_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
            IsolationLevel::RepeatableRead => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
            IsolationLevel::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        }
    }
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Amount,
    /// Sender balance after commit
    pub sender_balance: Amount,
    /// Receiver balance after commit
    pub receiver_balance: Amount,
    /// Number of transactions started, including retries
    pub attempts: u32,
    pub state: TransferState,
}

impl fmt::Display for TransferReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{} -> {}, amount={}, state={}, attempts={}]",
            self.from, self.to, self.amount, self.state, self.attempts
        )
    }
}

/// Balances re-read after an indeterminate commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancePair {
    pub sender: Option<Amount>,
    pub receiver: Option<Amount>,
}

impl BalancePair {
    /// Sum of both balances, if both accounts exist
    pub fn total(&self) -> Option<Amount> {
        self.sender?.checked_add(self.receiver?)
    }
}
