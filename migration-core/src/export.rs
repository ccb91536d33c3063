//! Paginated export from the source cluster

use crate::cursor::Cursor;
use crate::error::{Error, Result, Side};
use ledger_client::{Account, LedgerClient, QueryFilter, Transfer};

/// Fetch the next page of accounts at the cursor, ascending by timestamp.
///
/// An empty page is the sole termination signal for the phase, not an
/// error.
pub async fn export_accounts(
    source: &impl LedgerClient,
    cursor: Cursor,
    limit: u32,
) -> Result<Vec<Account>> {
    source
        .query_accounts(QueryFilter::ascending(cursor.timestamp_min(), limit))
        .await
        .map_err(|error| Error::Query {
            side: Side::Source,
            source: error,
        })
}

/// Fetch the next page of transfers at the cursor, ascending by timestamp.
pub async fn export_transfers(
    source: &impl LedgerClient,
    cursor: Cursor,
    limit: u32,
) -> Result<Vec<Transfer>> {
    source
        .query_transfers(QueryFilter::ascending(cursor.timestamp_min(), limit))
        .await
        .map_err(|error| Error::Query {
            side: Side::Source,
            source: error,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_client::{Account, MemoryCluster, U128};

    #[tokio::test]
    async fn test_export_pages_follow_the_cursor() {
        let source = MemoryCluster::new();
        let batch: Vec<Account> = (1..=5u64)
            .map(|id| Account::new(U128::from(id), 700, 10))
            .collect();
        assert!(source.create_accounts(batch).await.unwrap().is_empty());

        let first = export_accounts(&source, Cursor::ORIGIN, 3).await.unwrap();
        assert_eq!(first.len(), 3);

        let cursor = Cursor::ORIGIN.advance_past(first[2].timestamp);
        let second = export_accounts(&source, cursor, 3).await.unwrap();
        assert_eq!(second.len(), 2);
        assert!(second[0].timestamp > first[2].timestamp);

        let cursor = cursor.advance_past(second[1].timestamp);
        let empty = export_accounts(&source, cursor, 3).await.unwrap();
        assert!(empty.is_empty());
    }
}
