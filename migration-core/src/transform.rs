//! Batch transformation for replay
//!
//! Turns a page read from the source into a batch the destination accepts
//! as one atomic chain. Pure and total: no error conditions, and record
//! order is preserved exactly as read.

use ledger_client::{Account, LedgerRecord, Transfer, U128};

/// Chain a page into one atomic unit.
///
/// Every record is marked imported (its timestamp is caller-supplied, taken
/// verbatim from the source) and every record except the last links to its
/// successor, so the destination commits the whole page or none of it.
pub fn chain<R: LedgerRecord>(records: &mut [R]) {
    let last = records.len().saturating_sub(1);
    for (i, record) in records.iter_mut().enumerate() {
        record.set_imported(true);
        record.set_linked(i != last);
    }
}

/// Prepare an account page for replay.
///
/// Balances restart from zero: the destination recomputes them from the
/// replayed transfer history, and importing the source's derived values
/// would double-count.
pub fn replay_accounts(page: &mut [Account]) {
    for account in page.iter_mut() {
        account.debits_pending = U128::ZERO;
        account.debits_posted = U128::ZERO;
        account.credits_pending = U128::ZERO;
        account.credits_posted = U128::ZERO;
    }
    chain(page);
}

/// Prepare a transfer page for replay.
pub fn replay_transfers(page: &mut [Transfer]) {
    chain(page);
}
