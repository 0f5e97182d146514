//! NFT Custody Ledger
//!
//! This crate implements the stake/unstake accounting engine: it takes
//! custody of NFTs, records who deposited each one, and guarantees that only
//! the original depositor can withdraw it.
//!
//! # Modules
//! - `errors`: Ledger, registry, guard and config error types
//! - `events`: Contract events and the append-only event log
//! - `config`: Ledger configuration (batch bounds, initial pause)
//! - `security`: Reentrancy guard, transfer-acceptance gate, pause, access control
//! - `registry`: Asset registry traits and in-memory registries
//! - `book`: Stake records, owner positions and global counter
//! - `ledger`: `CustodyLedger` state and admin surface
//! - `stake`: Deposit path
//! - `unstake`: Withdrawal path
//! - `recovery`: Admin recovery of untracked and foreign assets
//! - `queries`: Read-only queries
//! - `commitment`: State digest for off-chain reconciliation

pub mod errors;
pub mod events;
pub mod config;
pub mod security;
pub mod registry;
pub mod book;
pub mod ledger;
pub mod stake;
pub mod unstake;
pub mod recovery;
pub mod queries;
pub mod commitment;

pub use ledger::CustodyLedger;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
