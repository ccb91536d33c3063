//! Ledgerport Migration Core
//!
//! Replicates the full transactional history of a double-entry ledger from
//! a source cluster into a destination cluster, preserving record identity,
//! chronological order, and resulting account balances.
//!
//! # Architecture
//!
//! - **Cursor pagination**: each phase resolves its starting point from the
//!   destination's newest record, making reruns idempotent
//! - **Replay chains**: every exported page is rewritten into one atomic
//!   linked batch with caller-supplied timestamps
//! - **Fatal-on-first-error**: no retries; atomic batches plus cursor
//!   resumption are the sole recovery mechanism
//! - **Lockstep verification**: both clusters are re-read page by page and
//!   every account's balances compared byte for byte

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod export;
pub mod import;
pub mod metrics;
pub mod transform;
pub mod verify;

// Re-exports
pub use config::{BatchConfig, ClusterConfig, Config};
pub use cursor::{resolve_account_cursor, resolve_transfer_cursor, Cursor};
pub use driver::{MigrationReport, Migrator, Phase};
pub use error::{Error, RecordKind, Rejection, Result, Side};
pub use import::{import_accounts, import_transfers, interpret, BatchOutcome};
pub use metrics::Metrics;
pub use transform::{chain, replay_accounts, replay_transfers};
pub use verify::verify_balances;
