//! In-process ledger cluster
//!
//! A single-node cluster that speaks the full client protocol: timestamp
//! assignment, verbatim imported timestamps, linked-chain all-or-nothing
//! commit, and balance recomputation from replayed transfers. The migration
//! test suite runs against two of these.

use crate::client::{CreateAccountsResult, CreateTransfersResult, LedgerClient};
use crate::types::{
    Account, AccountFlags, CreateAccountCode, CreateResult, CreateTransferCode, QueryFilter,
    Transfer, TransferFlags, U128, MAX_BATCH,
};
use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// An in-process ledger cluster.
#[derive(Debug, Default)]
pub struct MemoryCluster {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    /// Accounts in ascending timestamp order.
    accounts: Vec<Account>,

    /// Transfers in ascending timestamp order.
    transfers: Vec<Transfer>,

    account_index: HashMap<U128, usize>,
    transfer_index: HashMap<U128, usize>,

    /// Last timestamp assigned or accepted; every new record gets a
    /// strictly greater one.
    timestamp: u64,
}

impl MemoryCluster {
    /// Create an empty cluster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed accounts.
    pub fn account_count(&self) -> usize {
        self.state.lock().accounts.len()
    }

    /// Number of committed transfers.
    pub fn transfer_count(&self) -> usize {
        self.state.lock().transfers.len()
    }
}

#[async_trait]
impl LedgerClient for MemoryCluster {
    async fn query_accounts(&self, filter: QueryFilter) -> Result<Vec<Account>> {
        let state = self.state.lock();
        Ok(page(&state.accounts, filter, |a| a.timestamp))
    }

    async fn query_transfers(&self, filter: QueryFilter) -> Result<Vec<Transfer>> {
        let state = self.state.lock();
        Ok(page(&state.transfers, filter, |t| t.timestamp))
    }

    async fn create_accounts(&self, batch: Vec<Account>) -> Result<CreateAccountsResult> {
        if batch.len() > MAX_BATCH {
            return Err(Error::BatchTooLarge {
                len: batch.len(),
                limit: MAX_BATCH,
            });
        }
        Ok(self.state.lock().create_accounts(&batch))
    }

    async fn create_transfers(&self, batch: Vec<Transfer>) -> Result<CreateTransfersResult> {
        if batch.len() > MAX_BATCH {
            return Err(Error::BatchTooLarge {
                len: batch.len(),
                limit: MAX_BATCH,
            });
        }
        Ok(self.state.lock().create_transfers(&batch))
    }
}

/// Records are stored in ascending timestamp order, so a page is a filtered
/// prefix scan (or suffix scan when reversed).
fn page<T: Clone>(records: &[T], filter: QueryFilter, timestamp: impl Fn(&T) -> u64) -> Vec<T> {
    let limit = filter.limit as usize;
    let matches = |record: &&T| timestamp(record) >= filter.timestamp_min;
    if filter.reversed {
        records.iter().rev().filter(matches).take(limit).cloned().collect()
    } else {
        records.iter().filter(matches).take(limit).cloned().collect()
    }
}

impl State {
    fn create_accounts(&mut self, batch: &[Account]) -> CreateAccountsResult {
        let mut results = Vec::new();
        let mut start = 0;
        while start < batch.len() {
            let Some(end) = chain_end(batch, start, |a: &Account| {
                a.flags.contains(AccountFlags::LINKED)
            }) else {
                fail_open_chain(&mut results, start, batch.len(), |last| {
                    if last {
                        CreateAccountCode::LinkedEventChainOpen
                    } else {
                        CreateAccountCode::LinkedEventFailed
                    }
                });
                break;
            };

            let chain = &batch[start..=end];
            let mut failures: Vec<(usize, CreateAccountCode)> = Vec::new();
            let mut accepted: Vec<Account> = Vec::with_capacity(chain.len());
            let mut cursor = self.timestamp;
            for (offset, record) in chain.iter().enumerate() {
                match self.validate_account(record, cursor) {
                    Ok(ts) => {
                        cursor = ts;
                        let mut stored = record.clone();
                        stored.timestamp = ts;
                        accepted.push(stored);
                    }
                    Err(code) => failures.push((start + offset, code)),
                }
            }

            if failures.is_empty() {
                for stored in accepted {
                    self.timestamp = stored.timestamp;
                    self.account_index.insert(stored.id, self.accounts.len());
                    self.accounts.push(stored);
                }
            } else {
                fail_chain(&mut results, start, end, &failures, CreateAccountCode::LinkedEventFailed);
            }
            start = end + 1;
        }
        results
    }

    fn create_transfers(&mut self, batch: &[Transfer]) -> CreateTransfersResult {
        let mut results = Vec::new();
        let mut start = 0;
        while start < batch.len() {
            let Some(end) = chain_end(batch, start, |t: &Transfer| {
                t.flags.contains(TransferFlags::LINKED)
            }) else {
                fail_open_chain(&mut results, start, batch.len(), |last| {
                    if last {
                        CreateTransferCode::LinkedEventChainOpen
                    } else {
                        CreateTransferCode::LinkedEventFailed
                    }
                });
                break;
            };

            let chain = &batch[start..=end];
            let mut failures: Vec<(usize, CreateTransferCode)> = Vec::new();
            let mut accepted: Vec<Transfer> = Vec::with_capacity(chain.len());
            let mut cursor = self.timestamp;
            for (offset, record) in chain.iter().enumerate() {
                match self.validate_transfer(record, cursor) {
                    Ok(ts) => {
                        cursor = ts;
                        let mut stored = record.clone();
                        stored.timestamp = ts;
                        accepted.push(stored);
                    }
                    Err(code) => failures.push((start + offset, code)),
                }
            }

            if failures.is_empty() {
                for stored in accepted {
                    self.timestamp = stored.timestamp;
                    self.apply_transfer(&stored);
                    self.transfer_index.insert(stored.id, self.transfers.len());
                    self.transfers.push(stored);
                }
            } else {
                fail_chain(&mut results, start, end, &failures, CreateTransferCode::LinkedEventFailed);
            }
            start = end + 1;
        }
        results
    }

    /// Validate one account against committed state plus the chain-local
    /// timestamp cursor. Returns the timestamp the record commits under.
    fn validate_account(
        &self,
        record: &Account,
        cursor: u64,
    ) -> std::result::Result<u64, CreateAccountCode> {
        if record.id.is_zero() {
            return Err(CreateAccountCode::IdMustNotBeZero);
        }
        if let Some(&existing) = self.account_index.get(&record.id) {
            let existing = &self.accounts[existing];
            return if existing.ledger == record.ledger
                && existing.code == record.code
                && existing.user_data_128 == record.user_data_128
            {
                Err(CreateAccountCode::Exists)
            } else {
                Err(CreateAccountCode::ExistsWithDifferentFields)
            };
        }
        if !(record.debits_pending.is_zero()
            && record.debits_posted.is_zero()
            && record.credits_pending.is_zero()
            && record.credits_posted.is_zero())
        {
            return Err(CreateAccountCode::BalancesMustBeZero);
        }
        self.accept_timestamp(
            record.flags.contains(AccountFlags::IMPORTED),
            record.timestamp,
            cursor,
        )
        .ok_or(if record.flags.contains(AccountFlags::IMPORTED) {
            CreateAccountCode::ImportedEventTimestampMustNotRegress
        } else {
            CreateAccountCode::TimestampMustBeZero
        })
    }

    fn validate_transfer(
        &self,
        record: &Transfer,
        cursor: u64,
    ) -> std::result::Result<u64, CreateTransferCode> {
        if record.id.is_zero() {
            return Err(CreateTransferCode::IdMustNotBeZero);
        }
        if let Some(&existing) = self.transfer_index.get(&record.id) {
            let existing = &self.transfers[existing];
            return if existing.debit_account_id == record.debit_account_id
                && existing.credit_account_id == record.credit_account_id
                && existing.amount == record.amount
                && existing.ledger == record.ledger
                && existing.code == record.code
            {
                Err(CreateTransferCode::Exists)
            } else {
                Err(CreateTransferCode::ExistsWithDifferentFields)
            };
        }
        if record.debit_account_id == record.credit_account_id {
            return Err(CreateTransferCode::AccountsMustBeDifferent);
        }
        let Some(&debit) = self.account_index.get(&record.debit_account_id) else {
            return Err(CreateTransferCode::DebitAccountNotFound);
        };
        let Some(&credit) = self.account_index.get(&record.credit_account_id) else {
            return Err(CreateTransferCode::CreditAccountNotFound);
        };
        if self.accounts[debit].ledger != record.ledger
            || self.accounts[credit].ledger != record.ledger
        {
            return Err(CreateTransferCode::TransferMustHaveTheSameLedgerAsAccounts);
        }
        self.accept_timestamp(
            record.flags.contains(TransferFlags::IMPORTED),
            record.timestamp,
            cursor,
        )
        .ok_or(if record.flags.contains(TransferFlags::IMPORTED) {
            CreateTransferCode::ImportedEventTimestampMustNotRegress
        } else {
            CreateTransferCode::TimestampMustBeZero
        })
    }

    /// Imported records keep their caller-supplied timestamp, which must be
    /// nonzero and strictly advance the cluster clock. Everything else must
    /// submit zero and gets the next clock tick.
    fn accept_timestamp(&self, imported: bool, submitted: u64, cursor: u64) -> Option<u64> {
        if imported {
            (submitted > cursor).then_some(submitted)
        } else {
            (submitted == 0).then_some(cursor + 1)
        }
    }

    /// Replay one committed transfer into the account balances.
    fn apply_transfer(&mut self, transfer: &Transfer) {
        let amount = u128::from(transfer.amount);
        let pending = transfer.flags.contains(TransferFlags::PENDING);
        if let Some(&debit) = self.account_index.get(&transfer.debit_account_id) {
            let account = &mut self.accounts[debit];
            if pending {
                account.debits_pending = add(account.debits_pending, amount);
            } else {
                account.debits_posted = add(account.debits_posted, amount);
            }
        }
        if let Some(&credit) = self.account_index.get(&transfer.credit_account_id) {
            let account = &mut self.accounts[credit];
            if pending {
                account.credits_pending = add(account.credits_pending, amount);
            } else {
                account.credits_posted = add(account.credits_posted, amount);
            }
        }
    }
}

fn add(balance: U128, amount: u128) -> U128 {
    U128::from(u128::from(balance).wrapping_add(amount))
}

/// Index of the record that closes the chain starting at `start`, or `None`
/// if the batch ends while the chain is still open.
fn chain_end<T>(batch: &[T], start: usize, linked: impl Fn(&T) -> bool) -> Option<usize> {
    let mut end = start;
    while end < batch.len() {
        if !linked(&batch[end]) {
            return Some(end);
        }
        end += 1;
    }
    None
}

fn fail_open_chain<C: Copy>(
    results: &mut Vec<CreateResult<C>>,
    start: usize,
    len: usize,
    code: impl Fn(bool) -> C,
) {
    for i in start..len {
        results.push(CreateResult {
            index: i as u32,
            code: code(i == len - 1),
        });
    }
}

/// Every record in a failed chain gets a result entry: the genuine failures
/// keep their code, the rest cascade.
fn fail_chain<C: Copy>(
    results: &mut Vec<CreateResult<C>>,
    start: usize,
    end: usize,
    failures: &[(usize, C)],
    cascade: C,
) {
    for i in start..=end {
        let code = failures
            .iter()
            .find(|(index, _)| *index == i)
            .map(|(_, code)| *code)
            .unwrap_or(cascade);
        results.push(CreateResult {
            index: i as u32,
            code,
        });
    }
}
