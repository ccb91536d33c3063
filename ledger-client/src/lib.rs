//! Ledgerport Cluster Client
//!
//! Record model and client protocol for a double-entry ledger cluster.
//!
//! # Architecture
//!
//! - **Opaque values**: identifiers and amounts are 128-bit values compared
//!   byte-for-byte; no arithmetic happens outside the engine
//! - **Total ordering**: every committed record carries a cluster-unique,
//!   strictly increasing timestamp
//! - **Linked chains**: a batch may chain records so they commit all
//!   together or not at all
//! - **Sparse results**: create calls report only the records that did not
//!   commit; an empty result list is full success

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod client;
pub mod error;
pub mod memory;
pub mod remote;
pub mod types;

// Re-exports
pub use client::{CreateAccountsResult, CreateTransfersResult, LedgerClient};
pub use error::{Error, Result};
pub use memory::MemoryCluster;
pub use remote::RemoteCluster;
pub use types::{
    Account, AccountFlags, CreateAccountCode, CreateResult, CreateTransferCode, LedgerRecord,
    QueryFilter, ResultCode, Transfer, TransferFlags, U128, MAX_BATCH,
};
