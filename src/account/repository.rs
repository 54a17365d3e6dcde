//! Repository layer for account records
//!
//! Every method takes any PostgreSQL executor, so the same query runs on the
//! pool (its own implicit unit of work) or on `&mut *tx` inside a caller's
//! transaction.

use sqlx::postgres::PgExecutor;

use super::error::AccountError;
use super::models::{Account, AccountId, NewAccount};
use crate::money::Amount;

/// Account repository for CRUD operations
pub struct AccountRepository;

impl AccountRepository {
    /// Insert a new account and return it with its store-assigned id
    pub async fn create<'e, E>(executor: E, new: &NewAccount) -> Result<Account, AccountError>
    where
        E: PgExecutor<'e>,
    {
        let account: Account = sqlx::query_as(
            r#"INSERT INTO accounts (name, email, balance) VALUES ($1, $2, $3)
               RETURNING id, name, email, balance, created_at"#,
        )
        .bind(new.name())
        .bind(new.email())
        .bind(new.balance())
        .fetch_one(executor)
        .await?;

        tracing::debug!(id = account.id, balance = %account.balance, "Account created");
        Ok(account)
    }

    /// All accounts ordered by id ascending
    pub async fn list<'e, E>(executor: E) -> Result<Vec<Account>, AccountError>
    where
        E: PgExecutor<'e>,
    {
        let rows: Vec<Account> = sqlx::query_as(
            r#"SELECT id, name, email, balance, created_at FROM accounts ORDER BY id"#,
        )
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    /// Get account by ID, failing with `NotFound` if absent
    pub async fn get<'e, E>(executor: E, id: AccountId) -> Result<Account, AccountError>
    where
        E: PgExecutor<'e>,
    {
        Self::find(executor, id)
            .await?
            .ok_or(AccountError::NotFound(id))
    }

    /// Optional lookup by ID
    pub async fn find<'e, E>(executor: E, id: AccountId) -> Result<Option<Account>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r#"SELECT id, name, email, balance, created_at FROM accounts WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Current balances for the given ids, ordered by id
    ///
    /// Missing ids are simply absent from the result.
    pub async fn balances<'e, E>(
        executor: E,
        ids: &[AccountId],
    ) -> Result<Vec<(AccountId, Amount)>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(r#"SELECT id, balance FROM accounts WHERE id = ANY($1) ORDER BY id"#)
            .bind(ids)
            .fetch_all(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::connect_test_db;

    fn unique_email(tag: &str) -> String {
        format!("{}_{}@test.local", tag, chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_create_and_get() {
        let db = connect_test_db().await;

        let email = unique_email("create");
        let new = NewAccount::new("Gaukhar", &email, Amount::from_major(1000)).unwrap();
        let created = AccountRepository::create(db.pool(), &new)
            .await
            .expect("Should create account");

        assert!(created.id > 0, "Account ID should be positive");
        assert_eq!(created.name, "Gaukhar");
        assert_eq!(created.email, email);
        assert_eq!(created.balance, Amount::from_major(1000));

        let fetched = AccountRepository::get(db.pool(), created.id)
            .await
            .expect("Should fetch account");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_get_not_found() {
        let db = connect_test_db().await;

        let result = AccountRepository::get(db.pool(), i64::MAX).await;
        assert!(matches!(result, Err(AccountError::NotFound(id)) if id == i64::MAX));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_list_is_ordered_by_id() {
        let db = connect_test_db().await;

        for tag in ["list_a", "list_b", "list_c"] {
            let new = NewAccount::new(tag, &unique_email(tag), Amount::ZERO).unwrap();
            AccountRepository::create(db.pool(), &new).await.unwrap();
        }

        let accounts = AccountRepository::list(db.pool()).await.unwrap();
        assert!(accounts.len() >= 3);
        assert!(accounts.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_balances_skips_missing() {
        let db = connect_test_db().await;

        let new = NewAccount::new("Nuray", &unique_email("bal"), Amount::from_major(500)).unwrap();
        let acc = AccountRepository::create(db.pool(), &new).await.unwrap();

        let balances = AccountRepository::balances(db.pool(), &[acc.id, i64::MAX])
            .await
            .unwrap();
        assert_eq!(balances, vec![(acc.id, Amount::from_major(500))]);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_create_inside_rolled_back_transaction_leaves_no_row() {
        let db = connect_test_db().await;

        let mut tx = db.pool().begin().await.unwrap();
        let new = NewAccount::new("Ghost", &unique_email("tx"), Amount::ZERO).unwrap();
        let acc = AccountRepository::create(&mut *tx, &new).await.unwrap();
        tx.rollback().await.unwrap();

        let found = AccountRepository::find(db.pool(), acc.id).await.unwrap();
        assert!(found.is_none());
    }
}
