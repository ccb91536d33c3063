//! Property-based tests for replication invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Chain shape: imported everywhere, linked everywhere but the last
//! - Order preservation: transformation never reorders a page
//! - Cursor monotonicity: pagination lower bounds strictly advance
//! - Result interpretation: cascades filtered, genuine rejections kept

use ledger_client::{
    Account, AccountFlags, CreateAccountCode, CreateResult, Transfer, TransferFlags, U128,
};
use migration_core::{chain, interpret, replay_accounts, replay_transfers, BatchOutcome, Cursor};
use proptest::prelude::*;

/// Strategy for generating account pages with ascending timestamps and
/// arbitrary pre-existing flags and balances.
fn account_page_strategy() -> impl Strategy<Value = Vec<Account>> {
    prop::collection::vec((any::<u64>(), any::<u16>(), 1u64..1_000_000), 1..100).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (id, flag_bits, balance))| {
                    let mut account = Account::new(U128::from(id), 700, 10);
                    account.flags = AccountFlags::from_bits(flag_bits);
                    account.timestamp = 1000 + i as u64;
                    account.debits_posted = U128::from(balance);
                    account.credits_posted = U128::from(balance);
                    account
                })
                .collect()
        },
    )
}

/// Strategy for generating transfer pages with ascending timestamps.
fn transfer_page_strategy() -> impl Strategy<Value = Vec<Transfer>> {
    prop::collection::vec((any::<u64>(), 1u64..1_000_000), 1..100).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (id, amount))| {
                let mut transfer = Transfer::new(
                    U128::from(id),
                    U128::from(1u64),
                    U128::from(2u64),
                    U128::from(amount),
                );
                transfer.timestamp = 5000 + i as u64;
                transfer
            })
            .collect()
    })
}

/// Strategy for generating sparse create result lists.
fn results_strategy() -> impl Strategy<Value = Vec<CreateResult<CreateAccountCode>>> {
    prop::collection::vec(
        (
            0u32..8190,
            prop_oneof![
                Just(CreateAccountCode::LinkedEventFailed),
                Just(CreateAccountCode::Exists),
                Just(CreateAccountCode::ExistsWithDifferentFields),
                Just(CreateAccountCode::ImportedEventTimestampMustNotRegress),
            ],
        )
            .prop_map(|(index, code)| CreateResult { index, code }),
        0..50,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: every transformed record is imported and exactly the last
    /// record of a page is unchained
    #[test]
    fn prop_chain_shape(mut page in account_page_strategy()) {
        replay_accounts(&mut page);

        let last = page.len() - 1;
        for (i, account) in page.iter().enumerate() {
            prop_assert!(account.flags.contains(AccountFlags::IMPORTED));
            prop_assert_eq!(account.flags.contains(AccountFlags::LINKED), i != last);
        }
    }

    /// Property: account transformation zeroes all four balances and keeps
    /// identity and order intact
    #[test]
    fn prop_accounts_zeroed_and_order_preserved(mut page in account_page_strategy()) {
        let ids: Vec<U128> = page.iter().map(|a| a.id).collect();
        let timestamps: Vec<u64> = page.iter().map(|a| a.timestamp).collect();

        replay_accounts(&mut page);

        prop_assert_eq!(page.iter().map(|a| a.id).collect::<Vec<_>>(), ids);
        prop_assert_eq!(page.iter().map(|a| a.timestamp).collect::<Vec<_>>(), timestamps);
        for account in &page {
            prop_assert!(account.debits_pending.is_zero());
            prop_assert!(account.debits_posted.is_zero());
            prop_assert!(account.credits_pending.is_zero());
            prop_assert!(account.credits_posted.is_zero());
        }
    }

    /// Property: transfer transformation touches only the flags
    #[test]
    fn prop_transfers_keep_amounts(mut page in transfer_page_strategy()) {
        let amounts: Vec<U128> = page.iter().map(|t| t.amount).collect();
        let ids: Vec<U128> = page.iter().map(|t| t.id).collect();

        replay_transfers(&mut page);

        prop_assert_eq!(page.iter().map(|t| t.amount).collect::<Vec<_>>(), amounts);
        prop_assert_eq!(page.iter().map(|t| t.id).collect::<Vec<_>>(), ids);
        for transfer in &page {
            prop_assert!(transfer.flags.contains(TransferFlags::IMPORTED));
        }
    }

    /// Property: chaining is idempotent
    #[test]
    fn prop_chain_idempotent(mut page in account_page_strategy()) {
        replay_accounts(&mut page);
        let once = page.clone();
        chain(&mut page);
        prop_assert_eq!(page, once);
    }

    /// Property: folding a cursor over ascending timestamps yields strictly
    /// increasing lower bounds, each one past the record it follows
    #[test]
    fn prop_cursor_strictly_advances(mut timestamps in prop::collection::vec(0u64..u64::MAX - 1, 1..50)) {
        timestamps.sort_unstable();
        timestamps.dedup();

        let mut cursor = Cursor::ORIGIN;
        for &timestamp in &timestamps {
            let advanced = cursor.advance_past(timestamp);
            prop_assert!(advanced > cursor);
            prop_assert_eq!(advanced.timestamp_min(), timestamp + 1);
            cursor = advanced;
        }
    }

    /// Property: interpretation filters cascades, keeps genuine rejections
    /// in order, and only an empty result list commits
    #[test]
    fn prop_interpret_partitions_results(results in results_strategy()) {
        match interpret(&results) {
            BatchOutcome::Committed => prop_assert!(results.is_empty()),
            BatchOutcome::Failed { rejections, cascades } => {
                prop_assert!(!results.is_empty());
                prop_assert_eq!(rejections.len() + cascades, results.len());

                let expected: Vec<(u32, CreateAccountCode)> = results
                    .iter()
                    .filter(|r| r.code != CreateAccountCode::LinkedEventFailed)
                    .map(|r| (r.index, r.code))
                    .collect();
                prop_assert_eq!(rejections, expected);
            }
        }
    }
}
