//! Error types for the migration
//!
//! Every write-side error carries the last-known-good cursor so an operator
//! can diagnose the run and restart it; restart is the only recovery
//! mechanism.

use crate::cursor::Cursor;
use std::fmt;
use thiserror::Error;

/// Result type for migration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which cluster an operation was sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The cluster history is exported from
    Source,
    /// The cluster history is replayed into
    Destination,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Destination => write!(f, "destination"),
        }
    }
}

/// Record type being migrated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Account records
    Accounts,
    /// Transfer records
    Transfers,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Accounts => write!(f, "accounts"),
            RecordKind::Transfers => write!(f, "transfers"),
        }
    }
}

/// One genuine (non-cascading) rejection from a create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position of the record within the submitted batch
    pub index: u32,
    /// The rejection code, rendered
    pub code: String,
}

/// Migration errors
#[derive(Error, Debug)]
pub enum Error {
    /// A query against one of the clusters failed
    #[error("{side} query failed: {source}")]
    Query {
        /// Cluster the query was sent to
        side: Side,
        /// Underlying client error
        #[source]
        source: ledger_client::Error,
    },

    /// A create call could not be submitted at all
    #[error("{kind} create call failed; last timestamp was {cursor}: {source}")]
    CreateCall {
        /// Record type being imported
        kind: RecordKind,
        /// Last cursor known committed
        cursor: Cursor,
        /// Underlying client error
        #[source]
        source: ledger_client::Error,
    },

    /// The destination rejected at least one record in a batch
    #[error("{kind} batch rejected by destination; last timestamp was {cursor}")]
    BatchRejected {
        /// Record type being imported
        kind: RecordKind,
        /// Last cursor known committed
        cursor: Cursor,
        /// Genuine rejections, cascading chain failures filtered out
        rejections: Vec<Rejection>,
    },

    /// Verification read pages of different length from the two clusters
    #[error("account pages differ in length: {source_len} -> {destination_len}")]
    CountMismatch {
        /// Records in the source page
        source_len: usize,
        /// Records in the destination page
        destination_len: usize,
    },

    /// Verification found diverging balances
    #[error("account balances differ: {destination_timestamp} -> {source_timestamp}")]
    BalanceMismatch {
        /// Timestamp of the source account
        source_timestamp: u64,
        /// Timestamp of the destination account
        destination_timestamp: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
