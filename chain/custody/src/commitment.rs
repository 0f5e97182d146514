//! State digest for off-chain reconciliation
//!
//! Indexers rebuild the stake book from `Staked`/`Unstaked` events. Comparing
//! their digest with the ledger's tells them whether they missed anything.
//!
//! Layout hashed with SHA-256, records ascending by token id:
//! `for each record: token_id (u64 BE) || owner (20 bytes)`, then
//! `total_staked (u64 BE)`.

use ledger_types::ids::{Address, TokenId};
use sha2::{Digest, Sha256};

use crate::book::StakeBook;
use crate::ledger::CustodyLedger;

/// Digest over sorted `(token, owner)` records and the global total.
pub fn digest_records(records: &[(TokenId, Address)], total_staked: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for (token_id, owner) in records {
        hasher.update(token_id.value().to_be_bytes());
        hasher.update(owner.as_bytes());
    }
    hasher.update(total_staked.to_be_bytes());
    hasher.finalize().into()
}

pub fn book_digest(book: &StakeBook) -> [u8; 32] {
    digest_records(&book.records(), book.total_staked())
}

impl CustodyLedger {
    pub fn state_digest(&self) -> [u8; 32] {
        book_digest(&self.book)
    }
}
