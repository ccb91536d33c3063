//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `migrate_accounts_exported_total` - Accounts exported and committed
//! - `migrate_transfers_exported_total` - Transfers exported and committed
//! - `migrate_batches_committed_total` - Batches committed atomically
//! - `migrate_batch_size` - Histogram of committed batch sizes
//! - `migrate_accounts_verified_total` - Accounts that passed verification

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Accounts exported and committed
    pub accounts_exported: IntCounter,

    /// Transfers exported and committed
    pub transfers_exported: IntCounter,

    /// Batches committed atomically
    pub batches_committed: IntCounter,

    /// Committed batch size histogram
    pub batch_size: Histogram,

    /// Accounts that passed verification
    pub accounts_verified: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let accounts_exported = IntCounter::new(
            "migrate_accounts_exported_total",
            "Accounts exported and committed",
        )?;
        registry.register(Box::new(accounts_exported.clone()))?;

        let transfers_exported = IntCounter::new(
            "migrate_transfers_exported_total",
            "Transfers exported and committed",
        )?;
        registry.register(Box::new(transfers_exported.clone()))?;

        let batches_committed = IntCounter::new(
            "migrate_batches_committed_total",
            "Batches committed atomically",
        )?;
        registry.register(Box::new(batches_committed.clone()))?;

        let batch_size = Histogram::with_opts(
            HistogramOpts::new("migrate_batch_size", "Histogram of committed batch sizes")
                .buckets(vec![1.0, 64.0, 512.0, 2048.0, 4096.0, 8190.0]),
        )?;
        registry.register(Box::new(batch_size.clone()))?;

        let accounts_verified = IntCounter::new(
            "migrate_accounts_verified_total",
            "Accounts that passed verification",
        )?;
        registry.register(Box::new(accounts_verified.clone()))?;

        Ok(Self {
            accounts_exported,
            transfers_exported,
            batches_committed,
            batch_size,
            accounts_verified,
            registry,
        })
    }

    /// Record a committed account batch
    pub fn record_accounts_batch(&self, len: u64) {
        self.accounts_exported.inc_by(len);
        self.batches_committed.inc();
        self.batch_size.observe(len as f64);
    }

    /// Record a committed transfer batch
    pub fn record_transfers_batch(&self, len: u64) {
        self.transfers_exported.inc_by(len);
        self.batches_committed.inc();
        self.batch_size.observe(len as f64);
    }

    /// Record verified accounts
    pub fn record_accounts_verified(&self, count: u64) {
        self.accounts_verified.inc_by(count);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
