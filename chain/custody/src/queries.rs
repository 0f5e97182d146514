//! Read-only queries for frontends and indexers

use ledger_types::ids::{Address, CollectionId, LedgerId, TokenId};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::ledger::CustodyLedger;
use crate::registry::NftRegistry;

/// One page of an owner's staked token ids, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub token_ids: Vec<TokenId>,
    /// Size of the owner's whole position
    pub total: usize,
    /// Offset of the next page, `None` on the last page
    pub next_offset: Option<usize>,
}

/// Global totals and configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub ledger_id: LedgerId,
    pub collection: CollectionId,
    pub custody: Address,
    pub admin: Address,
    pub total_staked: u64,
    pub max_batch_size: usize,
    pub paused: bool,
}

impl CustodyLedger {
    pub fn staked_count(&self, owner: Address) -> u64 {
        self.book.position(owner).map_or(0, |position| position.count())
    }

    pub fn staked_tokens_of(&self, owner: Address) -> Vec<TokenId> {
        self.book
            .position(owner)
            .map(|position| position.tokens().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Page through an owner's tokens. A zero `limit` yields an empty page.
    pub fn staked_tokens_page(&self, owner: Address, offset: usize, limit: usize) -> Page {
        let Some(position) = self.book.position(owner) else {
            return Page {
                token_ids: Vec::new(),
                total: 0,
                next_offset: None,
            };
        };
        let total = position.tokens().len();
        let token_ids: Vec<TokenId> = position
            .tokens()
            .iter()
            .skip(offset)
            .take(limit)
            .copied()
            .collect();
        let end = offset.saturating_add(token_ids.len());
        let next_offset = (limit > 0 && end < total).then_some(end);
        Page {
            token_ids,
            total,
            next_offset,
        }
    }

    /// Staked counts for several owners, in input order.
    pub fn staked_counts(&self, owners: &[Address]) -> Vec<u64> {
        owners.iter().map(|owner| self.staked_count(*owner)).collect()
    }

    pub fn staker_of(&self, token_id: TokenId) -> Option<Address> {
        self.book.staker_of(token_id)
    }

    pub fn is_staked(&self, token_id: TokenId) -> bool {
        self.book.staker_of(token_id).is_some()
    }

    pub fn total_staked(&self) -> u64 {
        self.book.total_staked()
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            ledger_id: self.id,
            collection: self.collection,
            custody: self.address,
            admin: self.admin(),
            total_staked: self.book.total_staked(),
            max_batch_size: self.max_batch_size,
            paused: self.is_paused(),
        }
    }

    /// Check every bookkeeping invariant across all owners.
    pub fn verify_invariants(&self) -> Result<(), LedgerError> {
        self.book.verify()
    }

    /// Check that the registry shows the ledger holding every staked token.
    pub fn verify_custody(&self, registry: &dyn NftRegistry) -> Result<(), LedgerError> {
        self.check_collection(registry)?;
        for (token_id, _) in self.book.records() {
            if registry.owner_of(token_id)? != self.address {
                return Err(LedgerError::NotInCustody { token_id });
            }
        }
        Ok(())
    }
}
