use sqlx::PgPool;

/// Create the `accounts` table if it does not exist yet
///
/// Idempotent; safe to run at every startup. Concurrent callers are
/// serialized on an advisory lock, since `CREATE TABLE IF NOT EXISTS` alone
/// can race on the catalog.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing PostgreSQL schema...");

    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    sqlx::query(CREATE_ACCOUNTS_TABLE).execute(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!("PostgreSQL schema initialized successfully");
    Ok(())
}

const SCHEMA_LOCK_KEY: i64 = 0x5452_414E_5346; // "TRANSF"

// =============================================================================
// accounts
// =============================================================================
//
// balance is BIGINT minor units (see money::SCALE). The CHECK constraint is a
// second line behind the transfer engine's sufficiency check: a commit that
// would leave a negative balance is rejected by the server itself.
//
// Length limits mirror account::validation.
// =============================================================================
const CREATE_ACCOUNTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id          BIGSERIAL PRIMARY KEY,
    name        VARCHAR(128) NOT NULL CHECK (length(name) > 0),
    email       VARCHAR(256) NOT NULL CHECK (length(email) > 0),
    balance     BIGINT NOT NULL DEFAULT 0 CHECK (balance >= 0),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;
