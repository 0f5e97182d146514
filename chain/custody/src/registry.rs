//! Asset registry collaborators
//!
//! The ledger never owns asset state itself; it queries and moves assets
//! through these traits. `MemoryNftRegistry` and `MemoryFungibleRegistry`
//! are in-memory registries for off-chain simulation and tests.
//!
//! Transfers into a ledger go through `NftRegistry::transfer_from` with a
//! receiver. The registry moves the token, notifies the receiver, and undoes
//! the move if the receiver rejects it or answers with anything other than
//! `TOKEN_RECEIVED`.

use ledger_types::ids::{Address, CollectionId, TokenId};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use crate::errors::{GuardError, LedgerError, RegistryError};
use crate::events::EventRecord;

/// Acceptance token returned by a receiver that takes an inbound transfer.
pub type Receipt = [u8; 4];

/// The only receipt a registry accepts.
pub const TOKEN_RECEIVED: Receipt = [0x15, 0x0b, 0x7a, 0x02];

/// Callback invoked by a registry when a token is transferred to the
/// implementor.
pub trait TransferObserver {
    /// Accept or reject an inbound token.
    ///
    /// `operator` is the account that started the transfer, `from` the
    /// previous owner.
    fn on_token_received(
        &mut self,
        operator: Address,
        from: Address,
        token_id: TokenId,
    ) -> Result<Receipt, GuardError>;
}

/// The externally callable surface of a custody ledger.
///
/// Registries receive it during transfer callbacks, so a hostile registry
/// is able to attempt re-entry through it.
pub trait CustodyEndpoint: TransferObserver {
    /// Account that holds custody of staked tokens.
    fn custody_address(&self) -> Address;

    fn stake(
        &mut self,
        caller: Address,
        token_ids: &[TokenId],
        registry: &mut dyn NftRegistry,
    ) -> Result<EventRecord, LedgerError>;

    fn unstake(
        &mut self,
        caller: Address,
        token_ids: &[TokenId],
        registry: &mut dyn NftRegistry,
    ) -> Result<EventRecord, LedgerError>;
}

/// A non-fungible token collection.
pub trait NftRegistry {
    fn collection(&self) -> CollectionId;

    fn owner_of(&self, token_id: TokenId) -> Result<Address, RegistryError>;

    fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool;

    /// Move `token_id` from `from` to `to` on behalf of `operator`.
    ///
    /// With `receiver` set, the receiver must be the account at `to` and is
    /// notified after the move; the move is undone if it does not accept.
    fn transfer_from(
        &mut self,
        operator: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
        receiver: Option<&mut dyn CustodyEndpoint>,
    ) -> Result<(), RegistryError>;
}

/// A fungible token contract.
pub trait FungibleRegistry {
    fn token(&self) -> CollectionId;

    fn balance_of(&self, holder: Address) -> Decimal;

    /// Transfer `amount` from `from` (the calling account) to `to`.
    fn transfer(&mut self, from: Address, to: Address, amount: Decimal) -> Result<(), RegistryError>;
}

/// In-memory non-fungible collection.
#[derive(Debug, Clone)]
pub struct MemoryNftRegistry {
    collection: CollectionId,
    owners: HashMap<TokenId, Address>,
    operator_approvals: HashSet<(Address, Address)>,
}

impl MemoryNftRegistry {
    pub fn new(collection: CollectionId) -> Self {
        Self {
            collection,
            owners: HashMap::new(),
            operator_approvals: HashSet::new(),
        }
    }

    /// Mint a fresh token. Returns `false` if the id is already taken.
    pub fn mint(&mut self, to: Address, token_id: TokenId) -> bool {
        if to.is_zero() || self.owners.contains_key(&token_id) {
            return false;
        }
        self.owners.insert(token_id, to);
        true
    }

    /// Grant or revoke `operator` the right to move every token of `owner`.
    pub fn set_approval_for_all(&mut self, owner: Address, operator: Address, approved: bool) {
        if approved {
            self.operator_approvals.insert((owner, operator));
        } else {
            self.operator_approvals.remove(&(owner, operator));
        }
    }

    /// Tokens currently owned by `owner`, ascending.
    pub fn tokens_of(&self, owner: Address) -> Vec<TokenId> {
        let mut tokens: Vec<TokenId> = self
            .owners
            .iter()
            .filter(|(_, held_by)| **held_by == owner)
            .map(|(token_id, _)| *token_id)
            .collect();
        tokens.sort();
        tokens
    }
}

impl NftRegistry for MemoryNftRegistry {
    fn collection(&self) -> CollectionId {
        self.collection
    }

    fn owner_of(&self, token_id: TokenId) -> Result<Address, RegistryError> {
        self.owners
            .get(&token_id)
            .copied()
            .ok_or(RegistryError::NonexistentToken { token_id })
    }

    fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.operator_approvals.contains(&(owner, operator))
    }

    fn transfer_from(
        &mut self,
        operator: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
        receiver: Option<&mut dyn CustodyEndpoint>,
    ) -> Result<(), RegistryError> {
        let current = self.owner_of(token_id)?;
        if current != from {
            return Err(RegistryError::WrongOwner { from, token_id });
        }
        if operator != from && !self.is_approved_for_all(from, operator) {
            return Err(RegistryError::NotApproved { operator, token_id });
        }
        if to.is_zero() {
            return Err(RegistryError::ReceiverRejected {
                token_id,
                reason: "zero address".to_string(),
            });
        }

        self.owners.insert(token_id, to);

        let Some(receiver) = receiver else {
            return Ok(());
        };

        let verdict = if receiver.custody_address() != to {
            Err(RegistryError::ReceiverRejected {
                token_id,
                reason: "receiver is not the destination account".to_string(),
            })
        } else {
            match receiver.on_token_received(operator, from, token_id) {
                Ok(receipt) if receipt == TOKEN_RECEIVED => Ok(()),
                Ok(_) => Err(RegistryError::InvalidReceipt { token_id }),
                Err(guard) => Err(RegistryError::ReceiverRefused { token_id, guard }),
            }
        };

        if verdict.is_err() {
            self.owners.insert(token_id, from);
        }
        verdict
    }
}

/// In-memory fungible token.
#[derive(Debug, Clone)]
pub struct MemoryFungibleRegistry {
    token: CollectionId,
    balances: HashMap<Address, Decimal>,
}

impl MemoryFungibleRegistry {
    pub fn new(token: CollectionId) -> Self {
        Self {
            token,
            balances: HashMap::new(),
        }
    }

    pub fn mint(&mut self, to: Address, amount: Decimal) {
        *self.balances.entry(to).or_insert(Decimal::ZERO) += amount;
    }
}

impl FungibleRegistry for MemoryFungibleRegistry {
    fn token(&self) -> CollectionId {
        self.token
    }

    fn balance_of(&self, holder: Address) -> Decimal {
        self.balances.get(&holder).copied().unwrap_or(Decimal::ZERO)
    }

    fn transfer(&mut self, from: Address, to: Address, amount: Decimal) -> Result<(), RegistryError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(RegistryError::InsufficientBalance {
                required: amount.to_string(),
                available: available.to_string(),
            });
        }
        self.balances.insert(from, available - amount);
        *self.balances.entry(to).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }
}
