//! Contract-specific error types
//!
//! Error taxonomy for the stake, unstake, recovery and admin paths, plus the
//! errors surfaced by asset registries and the transfer-acceptance guard.

use ledger_types::ids::{Address, CollectionId, TokenId};
use thiserror::Error;

/// Ledger errors returned by every public operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Empty batch: at least one token id is required")]
    EmptyBatch,

    #[error("Batch too large: {len} token ids, maximum is {max}")]
    BatchTooLarge { len: usize, max: usize },

    #[error("Staking is paused")]
    Paused,

    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Unauthorized: caller is not admin")]
    Unauthorized,

    #[error("Token already staked: {token_id}")]
    AlreadyStaked { token_id: TokenId },

    #[error("Caller does not own token {token_id}")]
    NotTokenOwner { token_id: TokenId },

    #[error("Duplicate token id in batch: {token_id}")]
    DuplicateToken { token_id: TokenId },

    #[error("Caller is not the staker of token {token_id}")]
    NotStaker { token_id: TokenId },

    #[error("Token {token_id} is not recorded in the staker's position")]
    NotRecorded { token_id: TokenId },

    #[error("Position mismatch for {owner}: counter {count}, recorded tokens {recorded}")]
    PositionMismatch {
        owner: Address,
        count: u64,
        recorded: usize,
    },

    #[error("Global total mismatch: counter {total}, sum of positions {sum}")]
    TotalMismatch { total: u64, sum: u64 },

    #[error("Token {token_id} is staked and cannot be recovered")]
    TokenIsStaked { token_id: TokenId },

    #[error("Token {token_id} is not held by the ledger")]
    NotInCustody { token_id: TokenId },

    #[error("Bad receiver: the zero address cannot receive assets")]
    BadReceiver,

    #[error("Recovery amount must be positive")]
    ZeroAmount,

    #[error("Invalid batch size {requested}: must be within 1..=200")]
    InvalidBatchSize { requested: usize },

    #[error("Registry {collection} is not the managed collection")]
    UnknownCollection { collection: CollectionId },

    #[error("Arithmetic overflow in stake counters")]
    Overflow,

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by an asset registry during queries or transfers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Token does not exist: {token_id}")]
    NonexistentToken { token_id: TokenId },

    #[error("Operator {operator} is not approved to move token {token_id}")]
    NotApproved { operator: Address, token_id: TokenId },

    #[error("Token {token_id} is not owned by {from}")]
    WrongOwner { from: Address, token_id: TokenId },

    #[error("Receiver rejected token {token_id}: {reason}")]
    ReceiverRejected { token_id: TokenId, reason: String },

    #[error("Receiver refused token {token_id}: {guard}")]
    ReceiverRefused { token_id: TokenId, guard: GuardError },

    #[error("Receiver returned an invalid receipt for token {token_id}")]
    InvalidReceipt { token_id: TokenId },

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },
}

/// Transfer-acceptance guard rejections
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GuardError {
    #[error("Ledger is not expecting an inbound transfer")]
    Closed,

    #[error("Inbound transfer initiated by foreign operator {operator}")]
    ForeignOperator { operator: Address },
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Max batch size {value} out of range {min}..={max}")]
    BatchSizeOutOfRange { value: usize, min: usize, max: usize },

    #[error("Failed to parse config: {reason}")]
    Parse { reason: String },
}
