//! Replication cursor and its resolver
//!
//! The cursor is the migration's only checkpoint. It is never persisted by
//! this process: the destination's own newest timestamp acts as the durable
//! resume point, so a rerun picks up exactly where the last committed batch
//! left off.

use crate::error::{Error, Result, Side};
use ledger_client::{LedgerClient, LedgerRecord, QueryFilter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive lower bound of the next page to export.
///
/// Strictly non-decreasing across pages within a phase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Cursor(u64);

impl Cursor {
    /// Cursor at the start of history.
    pub const ORIGIN: Cursor = Cursor(0);

    /// Construct from a raw lower bound.
    pub const fn new(timestamp_min: u64) -> Self {
        Cursor(timestamp_min)
    }

    /// The inclusive lower bound this cursor stands for.
    pub const fn timestamp_min(self) -> u64 {
        self.0
    }

    /// Cursor for the page strictly after a record with the given
    /// timestamp.
    pub fn advance_past(self, timestamp: u64) -> Cursor {
        debug_assert!(timestamp >= self.0);
        Cursor(timestamp.saturating_add(1))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve the account phase starting point from the destination's most
/// recent account. A query error is fatal: nothing has been written yet, so
/// aborting here risks no partial state.
pub async fn resolve_account_cursor(destination: &impl LedgerClient) -> Result<Cursor> {
    let latest = destination
        .query_accounts(QueryFilter::latest())
        .await
        .map_err(|error| Error::Query {
            side: Side::Destination,
            source: error,
        })?;
    Ok(after_latest(latest.first()))
}

/// Resolve the transfer phase starting point from the destination's most
/// recent transfer.
pub async fn resolve_transfer_cursor(destination: &impl LedgerClient) -> Result<Cursor> {
    let latest = destination
        .query_transfers(QueryFilter::latest())
        .await
        .map_err(|error| Error::Query {
            side: Side::Destination,
            source: error,
        })?;
    Ok(after_latest(latest.first()))
}

/// A populated destination resumes strictly after its newest record; an
/// empty one starts from the origin.
fn after_latest<R: LedgerRecord>(latest: Option<&R>) -> Cursor {
    match latest {
        Some(record) => Cursor::ORIGIN.advance_past(record.timestamp()),
        None => Cursor::ORIGIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_client::{Account, AccountFlags, MemoryCluster, U128};

    #[test]
    fn test_advance_past_is_exclusive() {
        let cursor = Cursor::ORIGIN.advance_past(100);
        assert_eq!(cursor.timestamp_min(), 101);
        assert!(cursor > Cursor::ORIGIN);
    }

    #[test]
    fn test_advance_saturates_at_the_end_of_time() {
        let cursor = Cursor::new(u64::MAX).advance_past(u64::MAX);
        assert_eq!(cursor.timestamp_min(), u64::MAX);
    }

    #[tokio::test]
    async fn test_empty_destination_resolves_to_origin() {
        let destination = MemoryCluster::new();
        let cursor = resolve_account_cursor(&destination).await.unwrap();
        assert_eq!(cursor, Cursor::ORIGIN);
        let cursor = resolve_transfer_cursor(&destination).await.unwrap();
        assert_eq!(cursor, Cursor::ORIGIN);
    }

    #[tokio::test]
    async fn test_populated_destination_resolves_past_newest() {
        let destination = MemoryCluster::new();
        let mut account = Account::new(U128::from(1u64), 700, 10);
        account.flags.insert(AccountFlags::IMPORTED);
        account.timestamp = 42;
        assert!(destination
            .create_accounts(vec![account])
            .await
            .unwrap()
            .is_empty());

        let cursor = resolve_account_cursor(&destination).await.unwrap();
        assert_eq!(cursor.timestamp_min(), 43);
    }
}
