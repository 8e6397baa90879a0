//! Back-office bootstrap: initializes logging and configuration, prepares the
//! database, seeds the capital account and logs the current book position.

use dotenvy::dotenv;
use microlend::{config, core, errors::Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing as early as possible
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load .env file; env vars can also be set externally
    dotenv().ok();

    let app_config = config::load_app_configuration()?;
    info!(database_url = %app_config.database_url, "Configuration loaded");

    let db = config::database::create_connection().await?;
    config::database::create_tables(&db).await?;
    info!("Database initialized");

    let capital =
        core::capital::ensure_capital(&db, app_config.starting_capital, None).await?;
    info!(balance = capital.current_balance, "Capital account ready");

    let stats = core::report::summary_statistics(&db).await?;
    info!(
        loans = stats.total_loans,
        active = stats.active_loans,
        outstanding = stats.total_remaining,
        realized_profit = stats.total_realized_profit,
        "Book position"
    );

    let delayed = core::report::delinquency_report(&db)
        .await?
        .into_iter()
        .filter(|row| row.delay > 0)
        .count();
    info!(delayed, "Delinquency check complete");

    Ok(())
}
