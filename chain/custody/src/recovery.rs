//! Recovery — admin paths for assets sent to the ledger by mistake
//!
//! Tracked tokens are never recoverable: any token of the managed
//! collection with a stake record is refused unconditionally. Everything
//! the ledger holds without a record (stray tokens of the managed
//! collection, foreign NFTs, fungible balances) can be swept out.

use ledger_types::ids::{Address, TokenId};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::errors::LedgerError;
use crate::events::{
    ContractEvent, EventRecord, ForeignTokenRecovered, FungibleRecovered, UntrackedTokenRecovered,
};
use crate::ledger::CustodyLedger;
use crate::registry::{FungibleRegistry, NftRegistry};

impl CustodyLedger {
    /// Return an untracked token of the managed collection to `to`.
    ///
    /// The token must have no stake record and be held by the ledger.
    pub fn recover_untracked_token(
        &mut self,
        caller: Address,
        token_id: TokenId,
        to: Address,
        registry: &mut dyn NftRegistry,
    ) -> Result<EventRecord, LedgerError> {
        self.guarded("recover_untracked_token", |ledger| {
            ledger.only_admin(caller)?;
            if to.is_zero() {
                return Err(LedgerError::BadReceiver);
            }
            ledger.check_collection(registry)?;
            ledger.release_untracked(token_id, to, registry)?;

            info!(%token_id, %to, "untracked token recovered");
            Ok(ledger
                .events
                .emit(ContractEvent::UntrackedTokenRecovered(UntrackedTokenRecovered {
                    token_id,
                    to,
                })))
        })
    }

    /// Sweep `amount` of a fungible token out of the ledger.
    ///
    /// The ledger holds no fungible balances of its own, so this is
    /// unconditional beyond admin, receiver and amount checks.
    pub fn recover_fungible(
        &mut self,
        caller: Address,
        token: &mut dyn FungibleRegistry,
        to: Address,
        amount: Decimal,
    ) -> Result<EventRecord, LedgerError> {
        self.guarded("recover_fungible", |ledger| {
            ledger.only_admin(caller)?;
            if to.is_zero() {
                return Err(LedgerError::BadReceiver);
            }
            if amount <= Decimal::ZERO {
                return Err(LedgerError::ZeroAmount);
            }
            token.transfer(ledger.address, to, amount)?;

            let contract = token.token();
            info!(token = %contract, %to, %amount, "fungible balance recovered");
            Ok(ledger
                .events
                .emit(ContractEvent::FungibleRecovered(FungibleRecovered {
                    token: contract,
                    to,
                    amount,
                })))
        })
    }

    /// Sweep the ledger's entire balance of a fungible token.
    pub fn recover_fungible_balance(
        &mut self,
        caller: Address,
        token: &mut dyn FungibleRegistry,
        to: Address,
    ) -> Result<EventRecord, LedgerError> {
        let amount = token.balance_of(self.address);
        self.recover_fungible(caller, token, to, amount)
    }

    /// Recover a token of any collection.
    ///
    /// Tokens of the managed collection get the same checks as
    /// `recover_untracked_token`; other collections are unconditional.
    pub fn recover_foreign_token(
        &mut self,
        caller: Address,
        registry: &mut dyn NftRegistry,
        token_id: TokenId,
        to: Address,
    ) -> Result<EventRecord, LedgerError> {
        self.guarded("recover_foreign_token", |ledger| {
            ledger.only_admin(caller)?;
            if to.is_zero() {
                return Err(LedgerError::BadReceiver);
            }
            let collection = registry.collection();
            if collection == ledger.collection {
                ledger.release_untracked(token_id, to, registry)?;
            } else {
                let custody = ledger.address;
                registry.transfer_from(custody, custody, to, token_id, None)?;
            }

            info!(%collection, %token_id, %to, "foreign token recovered");
            Ok(ledger
                .events
                .emit(ContractEvent::ForeignTokenRecovered(ForeignTokenRecovered {
                    collection,
                    token_id,
                    to,
                })))
        })
    }

    /// Move a managed-collection token that has no stake record out of custody.
    fn release_untracked(
        &mut self,
        token_id: TokenId,
        to: Address,
        registry: &mut dyn NftRegistry,
    ) -> Result<(), LedgerError> {
        if let Some(staker) = self.book.staker_of(token_id) {
            warn!(%token_id, %staker, "recovery of staked token refused");
            return Err(LedgerError::TokenIsStaked { token_id });
        }
        let custody = self.address;
        if registry.owner_of(token_id)? != custody {
            return Err(LedgerError::NotInCustody { token_id });
        }
        registry.transfer_from(custody, custody, to, token_id, None)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{LedgerError, RegistryError};
    use crate::events::{ContractEvent, FungibleRecovered};
    use crate::ledger::fixtures::*;
    use crate::registry::{FungibleRegistry, MemoryFungibleRegistry, MemoryNftRegistry, NftRegistry};
    use ledger_types::ids::{Address, CollectionId, TokenId};
    use rust_decimal::Decimal;

    fn stray_token(registry: &mut MemoryNftRegistry, id: u64) {
        registry.mint(alice(), TokenId::new(id));
        registry
            .transfer_from(alice(), alice(), ledger_address(), TokenId::new(id), None)
            .unwrap();
    }

    #[test]
    fn test_recover_untracked_token() {
        let (mut ledger, mut registry) = setup();
        stray_token(&mut registry, 99);

        ledger
            .recover_untracked_token(admin(), TokenId::new(99), alice(), &mut registry)
            .unwrap();
        assert_eq!(registry.owner_of(TokenId::new(99)), Ok(alice()));
        assert_eq!(ledger.events().len(), 1);
    }

    #[test]
    fn test_recover_staked_token_refused() {
        let (mut ledger, mut registry) = setup();
        ledger.stake(alice(), &ids(&[1]), &mut registry).unwrap();

        assert_eq!(
            ledger.recover_untracked_token(admin(), TokenId::new(1), admin(), &mut registry),
            Err(LedgerError::TokenIsStaked {
                token_id: TokenId::new(1)
            })
        );
        assert_eq!(registry.owner_of(TokenId::new(1)), Ok(ledger_address()));
        assert_eq!(ledger.staker_of(TokenId::new(1)), Some(alice()));
    }

    #[test]
    fn test_recover_token_not_held() {
        let (mut ledger, mut registry) = setup();
        assert_eq!(
            ledger.recover_untracked_token(admin(), TokenId::new(2), admin(), &mut registry),
            Err(LedgerError::NotInCustody {
                token_id: TokenId::new(2)
            })
        );
        assert_eq!(registry.owner_of(TokenId::new(2)), Ok(alice()));
    }

    #[test]
    fn test_recover_requires_admin() {
        let (mut ledger, mut registry) = setup();
        stray_token(&mut registry, 99);
        assert_eq!(
            ledger.recover_untracked_token(alice(), TokenId::new(99), alice(), &mut registry),
            Err(LedgerError::Unauthorized)
        );
    }

    #[test]
    fn test_recover_to_zero_address() {
        let (mut ledger, mut registry) = setup();
        stray_token(&mut registry, 99);
        assert_eq!(
            ledger.recover_untracked_token(admin(), TokenId::new(99), Address::ZERO, &mut registry),
            Err(LedgerError::BadReceiver)
        );
    }

    #[test]
    fn test_recover_fungible() {
        let (mut ledger, _) = setup();
        let mut erc20 = MemoryFungibleRegistry::new(CollectionId::new(Address::from_low_u64(0x4000)));
        erc20.mint(ledger_address(), Decimal::new(12_345, 2));

        let record = ledger
            .recover_fungible(admin(), &mut erc20, bob(), Decimal::new(12_345, 2))
            .unwrap();
        assert_eq!(erc20.balance_of(bob()), Decimal::new(12_345, 2));
        assert_eq!(erc20.balance_of(ledger_address()), Decimal::ZERO);
        assert_eq!(
            record.event,
            ContractEvent::FungibleRecovered(FungibleRecovered {
                token: erc20.token(),
                to: bob(),
                amount: Decimal::new(12_345, 2),
            })
        );
    }

    #[test]
    fn test_recover_fungible_balance_sweeps_all() {
        let (mut ledger, _) = setup();
        let mut erc20 = MemoryFungibleRegistry::new(CollectionId::new(Address::from_low_u64(0x4000)));
        erc20.mint(ledger_address(), Decimal::from(7));
        ledger
            .recover_fungible_balance(admin(), &mut erc20, bob())
            .unwrap();
        assert_eq!(erc20.balance_of(bob()), Decimal::from(7));
    }

    #[test]
    fn test_recover_fungible_zero_amount() {
        let (mut ledger, _) = setup();
        let mut erc20 = MemoryFungibleRegistry::new(CollectionId::new(Address::from_low_u64(0x4000)));
        assert_eq!(
            ledger.recover_fungible(admin(), &mut erc20, bob(), Decimal::ZERO),
            Err(LedgerError::ZeroAmount)
        );
        assert_eq!(
            ledger.recover_fungible_balance(admin(), &mut erc20, bob()),
            Err(LedgerError::ZeroAmount)
        );
    }

    #[test]
    fn test_recover_fungible_insufficient() {
        let (mut ledger, _) = setup();
        let mut erc20 = MemoryFungibleRegistry::new(CollectionId::new(Address::from_low_u64(0x4000)));
        erc20.mint(ledger_address(), Decimal::from(1));
        let result = ledger.recover_fungible(admin(), &mut erc20, bob(), Decimal::from(2));
        assert!(matches!(
            result,
            Err(LedgerError::Registry(RegistryError::InsufficientBalance { .. }))
        ));
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_recover_foreign_token_other_collection() {
        let (mut ledger, _) = setup();
        let mut other = MemoryNftRegistry::new(CollectionId::new(Address::from_low_u64(0x3000)));
        other.mint(ledger_address(), TokenId::new(1));

        ledger
            .recover_foreign_token(admin(), &mut other, TokenId::new(1), bob())
            .unwrap();
        assert_eq!(other.owner_of(TokenId::new(1)), Ok(bob()));
    }

    #[test]
    fn test_recover_foreign_token_same_collection_staked() {
        let (mut ledger, mut registry) = setup();
        ledger.stake(alice(), &ids(&[1]), &mut registry).unwrap();
        assert_eq!(
            ledger.recover_foreign_token(admin(), &mut registry, TokenId::new(1), admin()),
            Err(LedgerError::TokenIsStaked {
                token_id: TokenId::new(1)
            })
        );
    }

    #[test]
    fn test_recover_foreign_token_same_collection_untracked() {
        let (mut ledger, mut registry) = setup();
        stray_token(&mut registry, 77);
        ledger
            .recover_foreign_token(admin(), &mut registry, TokenId::new(77), bob())
            .unwrap();
        assert_eq!(registry.owner_of(TokenId::new(77)), Ok(bob()));
    }

    #[test]
    fn test_recover_untracked_wrong_registry() {
        let (mut ledger, _) = setup();
        let mut other = MemoryNftRegistry::new(CollectionId::new(Address::from_low_u64(0x3000)));
        other.mint(ledger_address(), TokenId::new(1));
        let result = ledger.recover_untracked_token(admin(), TokenId::new(1), bob(), &mut other);
        assert!(matches!(result, Err(LedgerError::UnknownCollection { .. })));
    }
}
