//! Cluster client protocol
//!
//! The migration never talks to a cluster directly; it goes through this
//! trait so the same driver runs against a remote cluster and against the
//! in-process cluster used by the test suite.

use crate::types::{
    Account, CreateAccountCode, CreateResult, CreateTransferCode, QueryFilter, Transfer,
};
use crate::Result;
use async_trait::async_trait;

/// Sparse result list for an account create call.
pub type CreateAccountsResult = Vec<CreateResult<CreateAccountCode>>;

/// Sparse result list for a transfer create call.
pub type CreateTransfersResult = Vec<CreateResult<CreateTransferCode>>;

/// Client protocol spoken to a ledger cluster.
///
/// Queries return records in timestamp order (ascending unless the filter is
/// reversed). Create calls are atomic per link chain: an empty result list
/// means every record in the batch committed.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch a page of accounts matching the filter.
    async fn query_accounts(&self, filter: QueryFilter) -> Result<Vec<Account>>;

    /// Fetch a page of transfers matching the filter.
    async fn query_transfers(&self, filter: QueryFilter) -> Result<Vec<Transfer>>;

    /// Submit a batch of accounts.
    async fn create_accounts(&self, batch: Vec<Account>) -> Result<CreateAccountsResult>;

    /// Submit a batch of transfers.
    async fn create_transfers(&self, batch: Vec<Transfer>) -> Result<CreateTransfersResult>;
}
