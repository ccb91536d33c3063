//! Migration driver
//!
//! Strictly sequential state machine: accounts first (transfers reference
//! them), then transfers, then balance verification. Each phase resolves
//! its own cursor from the destination and paginates until the source runs
//! dry. Any fatal error halts the whole run; recovery is a fresh run, which
//! the cursor resolver makes idempotent.

use crate::config::Config;
use crate::cursor::{resolve_account_cursor, resolve_transfer_cursor};
use crate::error::Result;
use crate::export::{export_accounts, export_transfers};
use crate::import::{import_accounts, import_transfers};
use crate::metrics::Metrics;
use crate::transform::{replay_accounts, replay_transfers};
use crate::verify::verify_balances;
use ledger_client::LedgerClient;

/// Migration phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Replaying account records
    ImportAccounts,
    /// Replaying transfer records
    ImportTransfers,
    /// Verifying balance equivalence
    Validate,
    /// Migration complete
    Done,
}

/// Counts reported by a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Accounts exported and committed
    pub accounts_exported: u64,

    /// Transfers exported and committed
    pub transfers_exported: u64,

    /// Accounts that passed balance verification
    pub accounts_verified: u64,
}

/// Drives a full history migration between two clusters.
pub struct Migrator<'a, S, D> {
    /// Cluster history is exported from
    source: &'a S,

    /// Cluster history is replayed into
    destination: &'a D,

    /// Records per page and per create call
    batch_limit: u32,

    /// Progress counters
    metrics: Metrics,
}

impl<'a, S: LedgerClient, D: LedgerClient> Migrator<'a, S, D> {
    /// Create a driver over the two clusters.
    pub fn new(source: &'a S, destination: &'a D, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            destination,
            batch_limit: config.batch.limit,
            metrics: Metrics::new()?,
        })
    }

    /// Metrics registry for scraping.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Run all phases to completion.
    ///
    /// Transitions to `Done` only after verification completes without
    /// mismatch.
    pub async fn run(&self) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();
        let mut phase = Phase::ImportAccounts;
        while phase != Phase::Done {
            phase = match phase {
                Phase::ImportAccounts => {
                    tracing::info!("importing accounts");
                    report.accounts_exported = self.import_accounts_phase().await?;
                    Phase::ImportTransfers
                }
                Phase::ImportTransfers => {
                    tracing::info!("importing transfers");
                    report.transfers_exported = self.import_transfers_phase().await?;
                    Phase::Validate
                }
                Phase::Validate => {
                    tracing::info!("validating balances");
                    let verified =
                        verify_balances(self.source, self.destination, self.batch_limit).await?;
                    self.metrics.record_accounts_verified(verified);
                    report.accounts_verified = verified;
                    Phase::Done
                }
                Phase::Done => Phase::Done,
            };
        }
        tracing::info!(
            accounts = report.accounts_exported,
            transfers = report.transfers_exported,
            "migration finished"
        );
        Ok(report)
    }

    async fn import_accounts_phase(&self) -> Result<u64> {
        let mut cursor = resolve_account_cursor(self.destination).await?;
        let mut exported = 0u64;
        loop {
            let mut page = export_accounts(self.source, cursor, self.batch_limit).await?;
            if page.is_empty() {
                break;
            }
            replay_accounts(&mut page);
            let len = page.len() as u64;
            cursor = import_accounts(self.destination, page, cursor).await?;
            exported += len;
            self.metrics.record_accounts_batch(len);
            tracing::info!(exported, cursor = %cursor, "accounts batch committed");
        }
        Ok(exported)
    }

    async fn import_transfers_phase(&self) -> Result<u64> {
        let mut cursor = resolve_transfer_cursor(self.destination).await?;
        let mut exported = 0u64;
        loop {
            let mut page = export_transfers(self.source, cursor, self.batch_limit).await?;
            if page.is_empty() {
                break;
            }
            replay_transfers(&mut page);
            let len = page.len() as u64;
            cursor = import_transfers(self.destination, page, cursor).await?;
            exported += len;
            self.metrics.record_transfers_batch(len);
            tracing::info!(exported, cursor = %cursor, "transfers batch committed");
        }
        Ok(exported)
    }
}
