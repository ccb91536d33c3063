//! Ledger history migration binary
//!
//! Reads configuration from a TOML file (first argument) or from
//! `MIGRATE_*` environment variables, then runs all phases to completion.
//! Exits non-zero on the first fatal error, logging the last committed
//! cursor so the run can be diagnosed and restarted.

use ledger_client::RemoteCluster;
use migration_core::{Config, Migrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    tracing::info!(
        source = ?config.source.addresses,
        destination = ?config.destination.addresses,
        batch_limit = config.batch.limit,
        "starting ledger migration"
    );

    let source =
        RemoteCluster::connect(config.source.id()?, config.source.addresses.clone()).await?;
    let destination = RemoteCluster::connect(
        config.destination.id()?,
        config.destination.addresses.clone(),
    )
    .await?;

    let migrator = Migrator::new(&source, &destination, &config)?;
    let report = match migrator.run().await {
        Ok(report) => report,
        Err(error) => {
            tracing::error!(%error, "migration failed");
            std::process::exit(1);
        }
    };

    println!("Exported accounts: {}", report.accounts_exported);
    println!("Exported transfers: {}", report.transfers_exported);
    println!("Finished");
    Ok(())
}
