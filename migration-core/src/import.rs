//! Chained import into the destination cluster
//!
//! A transformed page is submitted as one create call. The destination
//! answers with a sparse result list: empty means the whole chain committed
//! atomically, anything else means none of it did.

use crate::cursor::Cursor;
use crate::error::{Error, RecordKind, Rejection, Result};
use ledger_client::{Account, CreateResult, LedgerClient, ResultCode, Transfer};

/// Outcome of one create call.
///
/// `LinkedEventFailed` entries are an expected symptom of a genuine failure
/// elsewhere in the chain; they are counted but kept out of `rejections`.
/// Their presence still means the chain did not commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome<C> {
    /// Every record in the batch committed atomically.
    Committed,
    /// The batch did not commit.
    Failed {
        /// Genuine rejections, in batch order.
        rejections: Vec<(u32, C)>,
        /// Records that failed only because their chain failed.
        cascades: usize,
    },
}

/// Interpret a sparse create result list.
pub fn interpret<C: ResultCode>(results: &[CreateResult<C>]) -> BatchOutcome<C> {
    if results.is_empty() {
        return BatchOutcome::Committed;
    }
    let mut rejections = Vec::new();
    let mut cascades = 0;
    for result in results {
        if result.code.is_cascade() {
            cascades += 1;
        } else {
            rejections.push((result.index, result.code));
        }
    }
    BatchOutcome::Failed {
        rejections,
        cascades,
    }
}

/// Submit a transformed account batch to the destination.
///
/// On success, returns the cursor advanced past the batch. On rejection the
/// error carries the cursor that was last known good, for the operator.
pub async fn import_accounts(
    destination: &impl LedgerClient,
    batch: Vec<Account>,
    cursor: Cursor,
) -> Result<Cursor> {
    let Some(last_timestamp) = batch.last().map(|record| record.timestamp) else {
        return Ok(cursor);
    };
    let results = destination
        .create_accounts(batch)
        .await
        .map_err(|error| Error::CreateCall {
            kind: RecordKind::Accounts,
            cursor,
            source: error,
        })?;
    match interpret(&results) {
        BatchOutcome::Committed => Ok(cursor.advance_past(last_timestamp)),
        BatchOutcome::Failed {
            rejections,
            cascades,
        } => Err(rejected(RecordKind::Accounts, cursor, rejections, cascades)),
    }
}

/// Submit a transformed transfer batch to the destination.
pub async fn import_transfers(
    destination: &impl LedgerClient,
    batch: Vec<Transfer>,
    cursor: Cursor,
) -> Result<Cursor> {
    let Some(last_timestamp) = batch.last().map(|record| record.timestamp) else {
        return Ok(cursor);
    };
    let results = destination
        .create_transfers(batch)
        .await
        .map_err(|error| Error::CreateCall {
            kind: RecordKind::Transfers,
            cursor,
            source: error,
        })?;
    match interpret(&results) {
        BatchOutcome::Committed => Ok(cursor.advance_past(last_timestamp)),
        BatchOutcome::Failed {
            rejections,
            cascades,
        } => Err(rejected(RecordKind::Transfers, cursor, rejections, cascades)),
    }
}

fn rejected<C: ResultCode>(
    kind: RecordKind,
    cursor: Cursor,
    rejections: Vec<(u32, C)>,
    cascades: usize,
) -> Error {
    for (index, code) in &rejections {
        tracing::error!(%kind, index, code = ?code, "record rejected");
    }
    tracing::debug!(%kind, cascades, "chained records failed with their chain");
    Error::BatchRejected {
        kind,
        cursor,
        rejections: rejections
            .into_iter()
            .map(|(index, code)| Rejection {
                index,
                code: format!("{code:?}"),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_client::{CreateAccountCode, U128};

    fn result(index: u32, code: CreateAccountCode) -> CreateResult<CreateAccountCode> {
        CreateResult { index, code }
    }

    #[test]
    fn test_empty_result_list_means_committed() {
        let results: Vec<CreateResult<CreateAccountCode>> = vec![];
        assert_eq!(interpret(&results), BatchOutcome::Committed);
    }

    #[test]
    fn test_cascades_are_filtered_but_still_fail_the_batch() {
        let results = vec![
            result(0, CreateAccountCode::LinkedEventFailed),
            result(1, CreateAccountCode::ExistsWithDifferentFields),
            result(2, CreateAccountCode::LinkedEventFailed),
        ];
        let outcome = interpret(&results);
        assert_eq!(
            outcome,
            BatchOutcome::Failed {
                rejections: vec![(1, CreateAccountCode::ExistsWithDifferentFields)],
                cascades: 2,
            }
        );
    }

    #[test]
    fn test_all_cascade_result_still_fails() {
        let results = vec![result(0, CreateAccountCode::LinkedEventFailed)];
        match interpret(&results) {
            BatchOutcome::Failed {
                rejections,
                cascades,
            } => {
                assert!(rejections.is_empty());
                assert_eq!(cascades, 1);
            }
            BatchOutcome::Committed => panic!("non-empty result must not commit"),
        }
    }

    #[tokio::test]
    async fn test_import_empty_batch_leaves_cursor_alone() {
        let destination = ledger_client::MemoryCluster::new();
        let cursor = Cursor::new(7);
        let advanced = import_accounts(&destination, Vec::new(), cursor)
            .await
            .unwrap();
        assert_eq!(advanced, cursor);
    }

    #[tokio::test]
    async fn test_import_advances_past_last_record() {
        use ledger_client::{Account, AccountFlags};

        let destination = ledger_client::MemoryCluster::new();
        let mut batch = Vec::new();
        for (i, timestamp) in [100u64, 101, 102].iter().enumerate() {
            let mut account = Account::new(U128::from(i as u64 + 1), 700, 10);
            account.flags.insert(AccountFlags::IMPORTED);
            account.flags.set(AccountFlags::LINKED, i != 2);
            account.timestamp = *timestamp;
            batch.push(account);
        }

        let cursor = import_accounts(&destination, batch, Cursor::ORIGIN)
            .await
            .unwrap();
        assert_eq!(cursor.timestamp_min(), 103);
        assert_eq!(destination.account_count(), 3);
    }
}
