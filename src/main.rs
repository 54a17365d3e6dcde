//! pg_transfer demo
//!
//! Bootstraps the pool, opens two accounts, moves funds between them and
//! shows the rejection of an oversized transfer.
//!
//! ```text
//! cargo run -- --env dev
//! ```

use anyhow::Context;

use pg_transfer::{
    AccountRepository, Amount, AppConfig, Database, NewAccount, TransferEngine,
    logging::init_logging,
};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

async fn print_accounts(db: &Database) -> anyhow::Result<()> {
    for account in AccountRepository::list(db.pool()).await? {
        println!("{}", account);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = init_logging(&app_config);

    tracing::info!(
        "Starting pg_transfer in {} mode (build {})",
        env,
        env!("GIT_HASH")
    );

    let url = app_config
        .database_url()
        .context("No PostgreSQL URL: set DATABASE_URL or postgres_url")?;
    let db = Database::connect(&url, &app_config.database)
        .await
        .context("Error connecting to PostgreSQL")?;
    db.health_check().await.context("PostgreSQL ping failed")?;
    db.ensure_schema().await?;
    println!("Connected to PostgreSQL");

    let engine = TransferEngine::new(&db, app_config.transfer.clone());

    println!("\n--- Adding new accounts ---");
    let first = NewAccount::new("Gaukhar", "gaukhar@kbtu.kz", Amount::from_major(1000))?;
    let first = AccountRepository::create(db.pool(), &first).await?;
    println!("account {} added", first.id);

    let second = NewAccount::new("Nuray", "nuray@kbtu.kz", Amount::from_major(500))?;
    let second = AccountRepository::create(db.pool(), &second).await?;
    println!("account {} added", second.id);

    println!("\n--- All accounts ---");
    print_accounts(&db).await?;

    println!("\n--- Get account by ID ({}) ---", first.id);
    match AccountRepository::get(db.pool(), first.id).await {
        Ok(account) => println!(
            "found: {} (Email: {}, Balance: {})",
            account.name, account.email, account.balance
        ),
        Err(e) => println!("get by id: {}", e),
    }

    let amount = Amount::from_major(200);
    println!(
        "\n--- Transfer: ID {} -> ID {}, amount: {} ---",
        first.id, second.id, amount
    );
    match engine.transfer(first.id, second.id, amount).await {
        Ok(receipt) => println!("transaction succeeded: {}", receipt),
        Err(e) => println!("transfer error [{}]: {}", e.code(), e),
    }

    println!("\n--- Balances after transfer ---");
    print_accounts(&db).await?;

    println!("\n--- Try to send more than available ---");
    if let Err(e) = engine
        .transfer(first.id, second.id, Amount::from_major(10000))
        .await
    {
        println!("expected transaction error [{}]: {}", e.code(), e);
    }

    Ok(())
}
