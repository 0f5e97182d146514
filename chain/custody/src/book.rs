//! Stake book — the ledger's bookkeeping
//!
//! Three structures kept in lockstep:
//! - `token_owner`: stake record per token (who deposited it)
//! - `positions`: per-owner token set plus a redundant counter
//! - `total_staked`: global counter
//!
//! Invariants checked by `verify`:
//! - every position's set size equals its counter
//! - the sum of position counters equals `total_staked`
//! - every stake record points at an owner whose set contains the token,
//!   and no token sits in more than one set

use ledger_types::ids::{Address, TokenId};
use std::collections::{BTreeSet, HashMap};
use tracing::error;

use crate::errors::LedgerError;

/// One owner's staked tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    tokens: BTreeSet<TokenId>,
    count: u64,
}

impl Position {
    pub fn tokens(&self) -> &BTreeSet<TokenId> {
        &self.tokens
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_consistent(&self) -> bool {
        self.tokens.len() as u64 == self.count
    }
}

/// Snapshot of everything one batch operation may touch.
///
/// Taken before effects so a failed call can be rolled back.
#[derive(Debug, Clone)]
pub(crate) struct Checkpoint {
    owner: Address,
    position: Option<Position>,
    records: Vec<(TokenId, Option<Address>)>,
    total_staked: u64,
}

#[derive(Debug, Default)]
pub struct StakeBook {
    token_owner: HashMap<TokenId, Address>,
    positions: HashMap<Address, Position>,
    total_staked: u64,
}

impl StakeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staker_of(&self, token_id: TokenId) -> Option<Address> {
        self.token_owner.get(&token_id).copied()
    }

    pub fn position(&self, owner: Address) -> Option<&Position> {
        self.positions.get(&owner)
    }

    pub fn total_staked(&self) -> u64 {
        self.total_staked
    }

    /// All stake records ordered by token id.
    pub fn records(&self) -> Vec<(TokenId, Address)> {
        let mut records: Vec<(TokenId, Address)> =
            self.token_owner.iter().map(|(t, o)| (*t, *o)).collect();
        records.sort();
        records
    }

    /// Raise the owner's counter and the global counter by `n`.
    pub(crate) fn add_counts(&mut self, owner: Address, n: u64) -> Result<(), LedgerError> {
        let total = self.total_staked.checked_add(n).ok_or(LedgerError::Overflow)?;
        let position = self.positions.entry(owner).or_default();
        position.count = position.count.checked_add(n).ok_or(LedgerError::Overflow)?;
        self.total_staked = total;
        Ok(())
    }

    /// Lower the owner's counter and the global counter by `n`.
    ///
    /// Drops the position entry once it is empty.
    pub(crate) fn sub_counts(&mut self, owner: Address, n: u64) -> Result<(), LedgerError> {
        let position = self
            .positions
            .get_mut(&owner)
            .ok_or(LedgerError::PositionMismatch {
                owner,
                count: 0,
                recorded: 0,
            })?;
        let count = position.count.checked_sub(n).ok_or(LedgerError::PositionMismatch {
            owner,
            count: position.count,
            recorded: position.tokens.len(),
        })?;
        let total = self.total_staked.checked_sub(n).ok_or(LedgerError::Overflow)?;
        position.count = count;
        if position.count == 0 && position.tokens.is_empty() {
            self.positions.remove(&owner);
        }
        self.total_staked = total;
        Ok(())
    }

    /// Create the stake record for `token_id` and add it to the owner's set.
    ///
    /// The caller has already checked that the token is untracked; finding
    /// it in the set here means the book is corrupt.
    pub(crate) fn record(&mut self, owner: Address, token_id: TokenId) -> Result<(), LedgerError> {
        self.token_owner.insert(token_id, owner);
        let inserted = self.positions.entry(owner).or_default().tokens.insert(token_id);
        if !inserted {
            error!(%owner, %token_id, "token already present in owner's position");
            return Err(LedgerError::AlreadyStaked { token_id });
        }
        Ok(())
    }

    /// Clear the stake record for `token_id` and remove it from the set.
    pub(crate) fn release(&mut self, owner: Address, token_id: TokenId) -> Result<(), LedgerError> {
        self.token_owner.remove(&token_id);
        let removed = self
            .positions
            .get_mut(&owner)
            .map_or(false, |position| position.tokens.remove(&token_id));
        if !removed {
            error!(%owner, %token_id, "token missing from owner's position");
            return Err(LedgerError::NotRecorded { token_id });
        }
        Ok(())
    }

    /// Set size must equal counter for `owner`.
    pub(crate) fn check_position(&self, owner: Address) -> Result<(), LedgerError> {
        match self.positions.get(&owner) {
            Some(position) if !position.is_consistent() => {
                error!(%owner, count = position.count, recorded = position.tokens.len(), "position out of sync");
                Err(LedgerError::PositionMismatch {
                    owner,
                    count: position.count,
                    recorded: position.tokens.len(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Check every invariant across the whole book.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let mut sum: u64 = 0;
        let mut set_members: usize = 0;
        for owner in self.positions.keys() {
            self.check_position(*owner)?;
        }
        for position in self.positions.values() {
            sum = sum.checked_add(position.count).ok_or(LedgerError::Overflow)?;
            set_members += position.tokens.len();
        }
        if sum != self.total_staked {
            return Err(LedgerError::TotalMismatch {
                total: self.total_staked,
                sum,
            });
        }
        for (token_id, owner) in &self.token_owner {
            let held = self
                .positions
                .get(owner)
                .map_or(false, |position| position.tokens.contains(token_id));
            if !held {
                return Err(LedgerError::NotRecorded { token_id: *token_id });
            }
        }
        // Every record is in its owner's set; equal sizes rule out strays.
        if set_members != self.token_owner.len() {
            return Err(LedgerError::TotalMismatch {
                total: self.token_owner.len() as u64,
                sum: set_members as u64,
            });
        }
        Ok(())
    }

    pub(crate) fn checkpoint(&self, owner: Address, token_ids: &[TokenId]) -> Checkpoint {
        Checkpoint {
            owner,
            position: self.positions.get(&owner).cloned(),
            records: token_ids
                .iter()
                .map(|token_id| (*token_id, self.staker_of(*token_id)))
                .collect(),
            total_staked: self.total_staked,
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        match checkpoint.position {
            Some(position) => {
                self.positions.insert(checkpoint.owner, position);
            }
            None => {
                self.positions.remove(&checkpoint.owner);
            }
        }
        for (token_id, staker) in checkpoint.records {
            match staker {
                Some(owner) => {
                    self.token_owner.insert(token_id, owner);
                }
                None => {
                    self.token_owner.remove(&token_id);
                }
            }
        }
        self.total_staked = checkpoint.total_staked;
    }
}
