//! Post-migration balance verification
//!
//! Re-reads both clusters in lockstep ascending-timestamp pages and asserts
//! byte-exact equality of every account's derived balances. The re-query
//! variant is used deliberately: memory stays constant no matter how long
//! the history is.

use crate::cursor::Cursor;
use crate::error::{Error, Result, Side};
use ledger_client::{LedgerClient, QueryFilter};

/// Verify that every account's balances match between the two clusters.
///
/// Both clusters are consumed fully; the sole success condition is
/// simultaneous exhaustion. Returns the number of accounts verified.
pub async fn verify_balances(
    source: &impl LedgerClient,
    destination: &impl LedgerClient,
    limit: u32,
) -> Result<u64> {
    let mut cursor = Cursor::ORIGIN;
    let mut verified = 0u64;
    loop {
        let filter = QueryFilter::ascending(cursor.timestamp_min(), limit);
        let expected = source
            .query_accounts(filter)
            .await
            .map_err(|error| Error::Query {
                side: Side::Source,
                source: error,
            })?;
        let actual = destination
            .query_accounts(filter)
            .await
            .map_err(|error| Error::Query {
                side: Side::Destination,
                source: error,
            })?;

        if expected.len() != actual.len() {
            return Err(Error::CountMismatch {
                source_len: expected.len(),
                destination_len: actual.len(),
            });
        }
        let Some(last) = expected.last() else {
            break;
        };

        for (want, got) in expected.iter().zip(actual.iter()) {
            if want.timestamp != got.timestamp || !want.balances_eq(got) {
                return Err(Error::BalanceMismatch {
                    source_timestamp: want.timestamp,
                    destination_timestamp: got.timestamp,
                });
            }
        }

        verified += expected.len() as u64;
        cursor = cursor.advance_past(last.timestamp);
        tracing::debug!(verified, cursor = %cursor, "account page verified");
    }
    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_client::{Account, MemoryCluster, Transfer, U128};

    async fn cluster_with_accounts(ids: &[u64]) -> MemoryCluster {
        let cluster = MemoryCluster::new();
        let batch: Vec<Account> = ids
            .iter()
            .map(|&id| Account::new(U128::from(id), 700, 10))
            .collect();
        assert!(cluster.create_accounts(batch).await.unwrap().is_empty());
        cluster
    }

    #[tokio::test]
    async fn test_two_empty_clusters_verify_trivially() {
        let source = MemoryCluster::new();
        let destination = MemoryCluster::new();
        assert_eq!(verify_balances(&source, &destination, 10).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_identical_clusters_verify() {
        let source = cluster_with_accounts(&[1, 2, 3]).await;
        let destination = cluster_with_accounts(&[1, 2, 3]).await;
        assert_eq!(verify_balances(&source, &destination, 2).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_count_mismatch_is_fatal() {
        let source = cluster_with_accounts(&[1, 2, 3]).await;
        let destination = cluster_with_accounts(&[1, 2]).await;
        let err = verify_balances(&source, &destination, 10).await.unwrap_err();
        assert!(matches!(
            err,
            Error::CountMismatch {
                source_len: 3,
                destination_len: 2,
            }
        ));
    }

    #[tokio::test]
    async fn test_balance_divergence_is_fatal() {
        let source = cluster_with_accounts(&[1, 2]).await;
        let destination = cluster_with_accounts(&[1, 2]).await;

        // Skew one side with a transfer the other never saw.
        let mut transfer = Transfer::new(
            U128::from(9u64),
            U128::from(1u64),
            U128::from(2u64),
            U128::from(100u64),
        );
        transfer.ledger = 700;
        assert!(destination
            .create_transfers(vec![transfer])
            .await
            .unwrap()
            .is_empty());

        let err = verify_balances(&source, &destination, 10).await.unwrap_err();
        assert!(matches!(err, Error::BalanceMismatch { .. }));
    }
}
