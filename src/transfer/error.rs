//! Transfer Error Types

use std::time::Duration;
use thiserror::Error;

use super::state::TransferState;
use super::types::Party;
use crate::account::AccountId;
use crate::money::Amount;

/// PostgreSQL SQLSTATE: serialization_failure
pub const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// PostgreSQL SQLSTATE: deadlock_detected
pub const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";

/// Transfer error types
///
/// Every variant produced inside a transaction has already been rolled back
/// by the time the caller sees it, except where noted.
#[derive(Error, Debug)]
pub enum TransferError {
    /// Connectivity or driver failure before commit
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("{who} account not found: {id}")]
    AccountNotFound { who: Party, id: AccountId },

    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: Amount, need: Amount },

    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(Amount),

    #[error("Receiver balance would overflow: account {0}")]
    Overflow(AccountId),

    /// Commit did not succeed
    ///
    /// `rolled_back` is true only when the server answered with an error,
    /// which aborts the transaction. Otherwise the outcome is unknown and
    /// the caller must re-read both balances.
    #[error("Commit failed (rolled_back={rolled_back}): {source}")]
    Commit {
        rolled_back: bool,
        #[source]
        source: sqlx::Error,
    },

    /// Caller deadline expired; the in-flight transaction was dropped
    #[error("Transfer deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        from: TransferState,
        to: TransferState,
    },
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::Store(_) => "STORE_ERROR",
            TransferError::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            TransferError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            TransferError::InvalidAmount(_) => "INVALID_AMOUNT",
            TransferError::Overflow(_) => "OVERFLOW",
            TransferError::Commit { .. } => "COMMIT_FAILED",
            TransferError::DeadlineExceeded(_) => "DEADLINE_EXCEEDED",
            TransferError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
        }
    }

    /// SQLSTATE reported by the server, if any
    pub fn sqlstate(&self) -> Option<String> {
        let source = match self {
            TransferError::Store(e) => e,
            TransferError::Commit { source, .. } => source,
            _ => return None,
        };
        source
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned())
    }

    /// Whether the whole transaction may be retried from the start
    ///
    /// Only conflicts the server resolved by aborting us qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransferError::Store(_) | TransferError::Commit { rolled_back: true, .. } => self
                .sqlstate()
                .is_some_and(|code| is_retryable_sqlstate(&code)),
            _ => false,
        }
    }

    /// Whether the transfer may or may not have been applied
    ///
    /// When true, reconcile by re-reading balances before retrying.
    pub fn outcome_unknown(&self) -> bool {
        matches!(
            self,
            TransferError::Commit {
                rolled_back: false,
                ..
            } | TransferError::DeadlineExceeded(_)
        )
    }
}

pub fn is_retryable_sqlstate(code: &str) -> bool {
    matches!(
        code,
        SQLSTATE_SERIALIZATION_FAILURE | SQLSTATE_DEADLOCK_DETECTED
    )
}
