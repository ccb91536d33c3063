//! Remote cluster client
//!
//! Client for a cluster reached over the network (scaffold for now - the
//! wire protocol lands separately; session setup and addressing already
//! follow the final shape).

use crate::client::{CreateAccountsResult, CreateTransfersResult, LedgerClient};
use crate::types::{Account, QueryFilter, Transfer, U128};
use crate::{Error, Result};
use async_trait::async_trait;

/// Cluster client over the network.
#[derive(Debug)]
pub struct RemoteCluster {
    cluster_id: U128,
    addresses: Vec<String>,
}

impl RemoteCluster {
    /// Connect to the cluster with the given id at the given replica
    /// addresses.
    pub async fn connect(cluster_id: U128, addresses: Vec<String>) -> Result<Self> {
        if addresses.is_empty() {
            return Err(Error::Connection("no replica addresses given".to_string()));
        }

        // TODO: open the replica sessions and run the handshake.
        tracing::debug!(%cluster_id, ?addresses, "remote cluster session created");

        Ok(Self {
            cluster_id,
            addresses,
        })
    }

    /// The cluster id this client is bound to.
    pub fn cluster_id(&self) -> U128 {
        self.cluster_id
    }

    /// Replica addresses this client cycles through.
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }
}

#[async_trait]
impl LedgerClient for RemoteCluster {
    async fn query_accounts(&self, _filter: QueryFilter) -> Result<Vec<Account>> {
        // TODO: encode the query over the wire protocol.
        Err(Error::Unsupported("remote query_accounts"))
    }

    async fn query_transfers(&self, _filter: QueryFilter) -> Result<Vec<Transfer>> {
        // TODO: encode the query over the wire protocol.
        Err(Error::Unsupported("remote query_transfers"))
    }

    async fn create_accounts(&self, _batch: Vec<Account>) -> Result<CreateAccountsResult> {
        // TODO: encode the create over the wire protocol.
        Err(Error::Unsupported("remote create_accounts"))
    }

    async fn create_transfers(&self, _batch: Vec<Transfer>) -> Result<CreateTransfersResult> {
        // TODO: encode the create over the wire protocol.
        Err(Error::Unsupported("remote create_transfers"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_keeps_addressing() {
        let client = RemoteCluster::connect(U128::from(0u64), vec!["3000".to_string()])
            .await
            .unwrap();
        assert_eq!(client.cluster_id(), U128::from(0u64));
        assert_eq!(client.addresses(), ["3000".to_string()]);
    }

    #[tokio::test]
    async fn test_connect_requires_addresses() {
        let result = RemoteCluster::connect(U128::from(0u64), vec![]).await;
        assert!(result.is_err());
    }
}
