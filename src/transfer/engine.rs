//! Transfer Engine
//!
//! Moves a fixed amount between two accounts in one PostgreSQL transaction.
//!
//! Both rows are locked with `SELECT ... FOR UPDATE` in ascending id order
//! before any check runs, and the locks are held until commit. A concurrent
//! transfer touching either row blocks on the lock and then re-reads the
//! committed balance, so the sufficiency check never sees a stale value.
//!
//! Under `repeatable_read` / `serializable` the server may abort us instead
//! of blocking; the engine then retries the whole transaction.

use sqlx::{PgConnection, PgPool};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::error::TransferError;
use super::state::{TransferProgress, TransferState};
use super::types::{BalancePair, Party, TransferReceipt};
use crate::account::{AccountId, AccountRepository};
use crate::config::TransferConfig;
use crate::db::Database;
use crate::money::Amount;

const LOCK_ACCOUNTS_SQL: &str =
    "SELECT id, balance FROM accounts WHERE id = ANY($1) ORDER BY id FOR UPDATE";
const DEBIT_SQL: &str = "UPDATE accounts SET balance = balance - $1 WHERE id = $2 RETURNING balance";
const CREDIT_SQL: &str = "UPDATE accounts SET balance = balance + $1 WHERE id = $2 RETURNING balance";

/// Atomic debit/credit between accounts
///
/// Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct TransferEngine {
    pool: PgPool,
    config: TransferConfig,
}

impl TransferEngine {
    pub fn new(db: &Database, config: TransferConfig) -> Self {
        Self {
            pool: db.pool().clone(),
            config,
        }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Transfer `amount` from `from` to `to`
    ///
    /// Applies the configured default deadline, if any. Self-transfers are
    /// validated like any other and leave the balance unchanged.
    ///
    /// Not idempotent: two identical calls move the amount twice.
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferError> {
        match self.config.deadline() {
            Some(deadline) => {
                self.transfer_with_deadline(from, to, amount, deadline)
                    .await
            }
            None => self.run(from, to, amount).await,
        }
    }

    /// Transfer with a caller-supplied deadline
    ///
    /// On expiry the in-flight transaction is dropped, which rolls it back.
    /// If expiry races with COMMIT the outcome is unknown; see
    /// [`TransferError::outcome_unknown`] and [`Self::reconcile`].
    pub async fn transfer_with_deadline(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
        deadline: Duration,
    ) -> Result<TransferReceipt, TransferError> {
        match tokio::time::timeout(deadline, self.run(from, to, amount)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(from, to, amount = %amount, ?deadline, "Transfer deadline exceeded, transaction dropped");
                Err(TransferError::DeadlineExceeded(deadline))
            }
        }
    }

    /// Read-only checks without locking
    ///
    /// Produces the same error shapes as [`Self::transfer`], but the answer
    /// may be stale by the time a transfer runs.
    pub async fn preflight(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        if !amount.is_positive() {
            return Err(TransferError::InvalidAmount(amount));
        }

        let sender = AccountRepository::find(&self.pool, from)
            .await?
            .ok_or(TransferError::AccountNotFound {
                who: Party::Sender,
                id: from,
            })?;
        if sender.balance < amount {
            return Err(TransferError::InsufficientFunds {
                have: sender.balance,
                need: amount,
            });
        }

        AccountRepository::find(&self.pool, to)
            .await?
            .ok_or(TransferError::AccountNotFound {
                who: Party::Receiver,
                id: to,
            })?;

        Ok(())
    }

    /// Re-read both balances, e.g. after a commit with unknown outcome
    pub async fn reconcile(
        &self,
        from: AccountId,
        to: AccountId,
    ) -> Result<BalancePair, TransferError> {
        let rows = AccountRepository::balances(&self.pool, &[from, to]).await?;
        let balance_of = |id: AccountId| rows.iter().find(|(row, _)| *row == id).map(|(_, b)| *b);

        let pair = BalancePair {
            sender: balance_of(from),
            receiver: balance_of(to),
        };
        debug!(from, to, ?pair, "Balances reconciled");
        Ok(pair)
    }

    /// Retry loop around single attempts
    async fn run(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferError> {
        let mut attempt = 1;
        loop {
            match self.attempt(from, to, amount, attempt).await {
                Ok(receipt) => {
                    info!(
                        from,
                        to,
                        amount = %amount,
                        attempts = attempt,
                        sender_balance = %receipt.sender_balance,
                        receiver_balance = %receipt.receiver_balance,
                        "Transfer committed"
                    );
                    return Ok(receipt);
                }
                Err(e) if e.is_retryable() && attempt <= self.config.max_retries => {
                    let backoff = self.config.backoff(attempt);
                    warn!(
                        from,
                        to,
                        attempt,
                        sqlstate = ?e.sqlstate(),
                        ?backoff,
                        "Transfer aborted by conflict, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    match &e {
                        TransferError::Store(_) | TransferError::Commit { .. } => {
                            error!(from, to, amount = %amount, attempt, code = e.code(), error = %e, "Transfer failed")
                        }
                        _ => {
                            info!(from, to, amount = %amount, code = e.code(), error = %e, "Transfer rejected")
                        }
                    }
                    return Err(e);
                }
            }
        }
    }

    /// One transaction: begin, apply, commit; rollback on any failure
    async fn attempt(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
        attempt: u32,
    ) -> Result<TransferReceipt, TransferError> {
        let mut progress = TransferProgress::new(from, to, amount, attempt);

        let mut tx = match self.pool.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                progress.fail();
                return Err(e.into());
            }
        };

        let (sender_balance, receiver_balance) =
            match self.apply(&mut tx, &mut progress, from, to, amount).await {
                Ok(balances) => balances,
                Err(e) => {
                    progress.fail();
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(from, to, error = %rollback_err, original = %e, "Rollback failed");
                    }
                    return Err(e);
                }
            };

        if let Err(e) = tx.commit().await {
            progress.fail();
            // A server-side error aborts the transaction; anything else
            // (I/O, closed pool) leaves the outcome unknown.
            let rolled_back = matches!(e, sqlx::Error::Database(_));
            error!(from, to, rolled_back, error = %e, "Commit failed");
            return Err(TransferError::Commit {
                rolled_back,
                source: e,
            });
        }
        progress.advance(TransferState::Committed)?;

        Ok(TransferReceipt {
            from,
            to,
            amount,
            sender_balance,
            receiver_balance,
            attempts: attempt,
            state: progress.state(),
        })
    }

    /// Lock, validate, debit, credit. Returns post-transfer balances.
    async fn apply(
        &self,
        conn: &mut PgConnection,
        progress: &mut TransferProgress,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(Amount, Amount), TransferError> {
        sqlx::query(self.config.isolation.set_transaction_sql())
            .execute(&mut *conn)
            .await?;

        if !amount.is_positive() {
            return Err(TransferError::InvalidAmount(amount));
        }

        let ids = [from, to];
        let locked: Vec<(AccountId, Amount)> = sqlx::query_as(LOCK_ACCOUNTS_SQL)
            .bind(&ids[..])
            .fetch_all(&mut *conn)
            .await?;
        let balance_of =
            |id: AccountId| locked.iter().find(|(row, _)| *row == id).map(|(_, b)| *b);

        progress.advance(TransferState::ValidatingSender)?;
        let sender_balance = balance_of(from).ok_or(TransferError::AccountNotFound {
            who: Party::Sender,
            id: from,
        })?;
        if sender_balance < amount {
            return Err(TransferError::InsufficientFunds {
                have: sender_balance,
                need: amount,
            });
        }

        progress.advance(TransferState::ValidatingReceiver)?;
        let receiver_balance = balance_of(to).ok_or(TransferError::AccountNotFound {
            who: Party::Receiver,
            id: to,
        })?;
        if from != to && receiver_balance.checked_add(amount).is_none() {
            return Err(TransferError::Overflow(to));
        }

        progress.advance(TransferState::Debiting)?;
        let sender_after = adjust(conn, DEBIT_SQL, from, amount).await?;

        progress.advance(TransferState::Crediting)?;
        let receiver_after = adjust(conn, CREDIT_SQL, to, amount).await?;

        progress.advance(TransferState::Committing)?;

        // Self-transfer: both statements hit one row, the credit is final
        let sender_after = if from == to { receiver_after } else { sender_after };
        Ok((sender_after, receiver_after))
    }
}

async fn adjust(
    conn: &mut PgConnection,
    sql: &'static str,
    id: AccountId,
    amount: Amount,
) -> Result<Amount, sqlx::Error> {
    sqlx::query_scalar(sql)
        .bind(amount)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}
