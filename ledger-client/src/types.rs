//! Record types shared by the cluster client protocol
//!
//! All types are designed for:
//! - Byte-exact equality (identifiers and amounts are opaque 128-bit values)
//! - Cluster-assigned total ordering (the `timestamp` field is unique and
//!   strictly increasing across a cluster)
//! - Deterministic serialization (serde)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of records a single query or create call may carry.
pub const MAX_BATCH: usize = 8190;

/// Opaque 128-bit value (identifier or amount), little-endian bytes.
///
/// Equality is byte equality. The replication path never performs arithmetic
/// on these values; only the ledger engine itself does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct U128([u8; 16]);

impl U128 {
    /// The all-zero value.
    pub const ZERO: U128 = U128([0u8; 16]);

    /// Construct from raw little-endian bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Raw little-endian bytes.
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Whether every byte is zero.
    pub const fn is_zero(self) -> bool {
        u128::from_le_bytes(self.0) == 0
    }
}

impl From<u64> for U128 {
    fn from(value: u64) -> Self {
        Self((value as u128).to_le_bytes())
    }
}

impl From<u128> for U128 {
    fn from(value: u128) -> Self {
        Self(value.to_le_bytes())
    }
}

impl From<U128> for u128 {
    fn from(value: U128) -> u128 {
        u128::from_le_bytes(value.0)
    }
}

impl fmt::Display for U128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u128::from_le_bytes(self.0))
    }
}

impl FromStr for U128 {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>().map(U128::from)
    }
}

/// Account flags bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountFlags(u16);

impl AccountFlags {
    /// Chain this record to the next one in the same batch: both commit
    /// atomically or neither does.
    pub const LINKED: AccountFlags = AccountFlags(1 << 0);
    /// The engine rejects transfers that would make debits exceed credits.
    pub const DEBITS_MUST_NOT_EXCEED_CREDITS: AccountFlags = AccountFlags(1 << 1);
    /// The engine rejects transfers that would make credits exceed debits.
    pub const CREDITS_MUST_NOT_EXCEED_DEBITS: AccountFlags = AccountFlags(1 << 2);
    /// Retain balance history for this account.
    pub const HISTORY: AccountFlags = AccountFlags(1 << 3);
    /// The timestamp is caller-supplied and must be taken verbatim.
    pub const IMPORTED: AccountFlags = AccountFlags(1 << 4);

    /// No flags set.
    pub const fn empty() -> Self {
        AccountFlags(0)
    }

    /// Raw bit representation.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Construct from a raw bit representation.
    pub const fn from_bits(bits: u16) -> Self {
        AccountFlags(bits)
    }

    /// Whether all bits of `other` are set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set all bits of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear all bits of `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Set or clear all bits of `other`.
    pub fn set(&mut self, other: Self, enabled: bool) {
        if enabled {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

/// Transfer flags bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransferFlags(u16);

impl TransferFlags {
    /// Chain this record to the next one in the same batch.
    pub const LINKED: TransferFlags = TransferFlags(1 << 0);
    /// Two-phase transfer: amounts move to the pending balances until the
    /// transfer is posted or voided.
    pub const PENDING: TransferFlags = TransferFlags(1 << 1);
    /// The timestamp is caller-supplied and must be taken verbatim.
    pub const IMPORTED: TransferFlags = TransferFlags(1 << 2);

    /// No flags set.
    pub const fn empty() -> Self {
        TransferFlags(0)
    }

    /// Raw bit representation.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Construct from a raw bit representation.
    pub const fn from_bits(bits: u16) -> Self {
        TransferFlags(bits)
    }

    /// Whether all bits of `other` are set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set all bits of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear all bits of `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Set or clear all bits of `other`.
    pub fn set(&mut self, other: Self, enabled: bool) {
        if enabled {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

/// A double-entry account.
///
/// The four balance fields are derived state: the engine computes them from
/// the transfer history and rejects attempts to write them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: U128,

    /// Amount of pending debits.
    pub debits_pending: U128,

    /// Amount of posted debits.
    pub debits_posted: U128,

    /// Amount of pending credits.
    pub credits_pending: U128,

    /// Amount of posted credits.
    pub credits_posted: U128,

    /// Opaque user data (128-bit).
    pub user_data_128: U128,

    /// Opaque user data (64-bit).
    pub user_data_64: u64,

    /// Opaque user data (32-bit).
    pub user_data_32: u32,

    /// Ledger partition this account belongs to.
    pub ledger: u32,

    /// Chart-of-accounts code.
    pub code: u16,

    /// Account flags.
    pub flags: AccountFlags,

    /// Cluster-assigned creation timestamp (nanoseconds), unique and
    /// strictly increasing across the cluster. Zero on submission unless
    /// the `IMPORTED` flag is set.
    pub timestamp: u64,
}

impl Account {
    /// An account with the given id and ledger/code metadata, everything
    /// else zeroed.
    pub fn new(id: U128, ledger: u32, code: u16) -> Self {
        Self {
            id,
            debits_pending: U128::ZERO,
            debits_posted: U128::ZERO,
            credits_pending: U128::ZERO,
            credits_posted: U128::ZERO,
            user_data_128: U128::ZERO,
            user_data_64: 0,
            user_data_32: 0,
            ledger,
            code,
            flags: AccountFlags::empty(),
            timestamp: 0,
        }
    }

    /// Byte-exact equality of the four balance fields.
    pub fn balances_eq(&self, other: &Account) -> bool {
        self.debits_pending == other.debits_pending
            && self.debits_posted == other.debits_posted
            && self.credits_pending == other.credits_pending
            && self.credits_posted == other.credits_posted
    }
}

/// A transfer between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Unique transfer identifier.
    pub id: U128,

    /// Account to debit.
    pub debit_account_id: U128,

    /// Account to credit.
    pub credit_account_id: U128,

    /// Transfer amount.
    pub amount: U128,

    /// For two-phase transfers, the id of the pending transfer being
    /// posted or voided.
    pub pending_id: U128,

    /// Opaque user data (128-bit).
    pub user_data_128: U128,

    /// Opaque user data (64-bit).
    pub user_data_64: u64,

    /// Opaque user data (32-bit).
    pub user_data_32: u32,

    /// Two-phase transfer timeout (seconds).
    pub timeout: u32,

    /// Ledger partition; must match both accounts.
    pub ledger: u32,

    /// Reason code for the transfer.
    pub code: u16,

    /// Transfer flags.
    pub flags: TransferFlags,

    /// Cluster-assigned creation timestamp (nanoseconds). Zero on
    /// submission unless the `IMPORTED` flag is set.
    pub timestamp: u64,
}

impl Transfer {
    /// A transfer with the given endpoints and amount, everything else
    /// zeroed.
    pub fn new(id: U128, debit_account_id: U128, credit_account_id: U128, amount: U128) -> Self {
        Self {
            id,
            debit_account_id,
            credit_account_id,
            amount,
            pending_id: U128::ZERO,
            user_data_128: U128::ZERO,
            user_data_64: 0,
            user_data_32: 0,
            timeout: 0,
            ledger: 0,
            code: 0,
            flags: TransferFlags::empty(),
            timestamp: 0,
        }
    }
}

/// Common surface of account and transfer records used by replication.
pub trait LedgerRecord {
    /// Record identifier.
    fn id(&self) -> U128;

    /// Cluster-assigned timestamp.
    fn timestamp(&self) -> u64;

    /// Whether the record is chained to its successor.
    fn is_linked(&self) -> bool;

    /// Chain or unchain the record from its successor.
    fn set_linked(&mut self, linked: bool);

    /// Mark the timestamp as caller-supplied.
    fn set_imported(&mut self, imported: bool);
}

impl LedgerRecord for Account {
    fn id(&self) -> U128 {
        self.id
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn is_linked(&self) -> bool {
        self.flags.contains(AccountFlags::LINKED)
    }

    fn set_linked(&mut self, linked: bool) {
        self.flags.set(AccountFlags::LINKED, linked);
    }

    fn set_imported(&mut self, imported: bool) {
        self.flags.set(AccountFlags::IMPORTED, imported);
    }
}

impl LedgerRecord for Transfer {
    fn id(&self) -> U128 {
        self.id
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn is_linked(&self) -> bool {
        self.flags.contains(TransferFlags::LINKED)
    }

    fn set_linked(&mut self, linked: bool) {
        self.flags.set(TransferFlags::LINKED, linked);
    }

    fn set_imported(&mut self, imported: bool) {
        self.flags.set(TransferFlags::IMPORTED, imported);
    }
}

/// Pagination filter for record queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Inclusive lower bound on the record timestamp.
    pub timestamp_min: u64,

    /// Maximum number of records to return.
    pub limit: u32,

    /// Return the newest records first instead of the oldest.
    pub reversed: bool,
}

impl QueryFilter {
    /// Ascending page starting at `timestamp_min`.
    pub fn ascending(timestamp_min: u64, limit: u32) -> Self {
        Self {
            timestamp_min,
            limit,
            reversed: false,
        }
    }

    /// The single most recent record.
    pub fn latest() -> Self {
        Self {
            timestamp_min: 0,
            limit: 1,
            reversed: true,
        }
    }
}

/// One entry of the sparse result list returned by a create call.
///
/// Records that committed cleanly are absent; an empty list means the whole
/// batch committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResult<C> {
    /// Position of the record within the submitted batch.
    pub index: u32,

    /// Why the record did not commit.
    pub code: C,
}

/// Classification shared by both result-code taxonomies.
pub trait ResultCode: fmt::Debug + Copy {
    /// Whether this code means "failed only because another record in the
    /// same link chain failed".
    fn is_cascade(self) -> bool;
}

/// Why an account in a create batch did not commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateAccountCode {
    /// Another record in this record's link chain failed.
    LinkedEventFailed,
    /// The batch ended while a link chain was still open.
    LinkedEventChainOpen,
    /// An identical account already exists.
    Exists,
    /// An account with this id but different fields already exists.
    ExistsWithDifferentFields,
    /// An imported timestamp must be nonzero and greater than every
    /// timestamp already in the cluster.
    ImportedEventTimestampMustNotRegress,
    /// Only imported records may carry a nonzero timestamp.
    TimestampMustBeZero,
    /// Balance fields must be zero on submission.
    BalancesMustBeZero,
    /// The id must be nonzero.
    IdMustNotBeZero,
}

impl ResultCode for CreateAccountCode {
    fn is_cascade(self) -> bool {
        matches!(self, CreateAccountCode::LinkedEventFailed)
    }
}

/// Why a transfer in a create batch did not commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateTransferCode {
    /// Another record in this record's link chain failed.
    LinkedEventFailed,
    /// The batch ended while a link chain was still open.
    LinkedEventChainOpen,
    /// An identical transfer already exists.
    Exists,
    /// A transfer with this id but different fields already exists.
    ExistsWithDifferentFields,
    /// An imported timestamp must be nonzero and greater than every
    /// timestamp already in the cluster.
    ImportedEventTimestampMustNotRegress,
    /// Only imported records may carry a nonzero timestamp.
    TimestampMustBeZero,
    /// The id must be nonzero.
    IdMustNotBeZero,
    /// The debit account does not exist.
    DebitAccountNotFound,
    /// The credit account does not exist.
    CreditAccountNotFound,
    /// A transfer must move funds between two distinct accounts.
    AccountsMustBeDifferent,
    /// The transfer's ledger must match both accounts' ledger.
    TransferMustHaveTheSameLedgerAsAccounts,
}

impl ResultCode for CreateTransferCode {
    fn is_cascade(self) -> bool {
        matches!(self, CreateTransferCode::LinkedEventFailed)
    }
}
