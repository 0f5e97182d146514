//! Unstake — withdrawal path
//!
//! Only the recorded staker can withdraw a token; there is no delegate or
//! admin override. Each token is validated and released from the book
//! before any transfer leaves custody. Pause does not apply here.

use ledger_types::ids::{Address, TokenId};
use tracing::{error, info};

use crate::book::Checkpoint;
use crate::errors::LedgerError;
use crate::events::{ContractEvent, EventRecord, Unstaked};
use crate::ledger::CustodyLedger;
use crate::registry::{CustodyEndpoint, NftRegistry};

impl CustodyLedger {
    /// Withdraw `token_ids` back to `caller`, their staker.
    ///
    /// Emits `Unstaked`.
    pub fn unstake(
        &mut self,
        caller: Address,
        token_ids: &[TokenId],
        registry: &mut dyn NftRegistry,
    ) -> Result<EventRecord, LedgerError> {
        self.guarded("unstake", |ledger| {
            ledger.unstake_locked(caller, token_ids, registry)
        })
    }

    /// Withdraw the caller's whole position in one batch.
    ///
    /// Subject to the same batch bounds as `unstake`.
    pub fn unstake_all(
        &mut self,
        caller: Address,
        registry: &mut dyn NftRegistry,
    ) -> Result<EventRecord, LedgerError> {
        let token_ids = self.staked_tokens_of(caller);
        self.unstake(caller, &token_ids, registry)
    }

    fn unstake_locked(
        &mut self,
        caller: Address,
        token_ids: &[TokenId],
        registry: &mut dyn NftRegistry,
    ) -> Result<EventRecord, LedgerError> {
        self.check_batch(token_ids)?;
        self.check_collection(registry)?;

        // Checks + effects, one token at a time
        let checkpoint = self.book.checkpoint(caller, token_ids);
        if let Err(e) = self.release_batch(caller, token_ids, registry) {
            self.book.restore(checkpoint);
            return Err(e);
        }

        // Interactions
        let mut sent = Vec::with_capacity(token_ids.len());
        let transfers = self.send_tokens(caller, token_ids, registry, &mut sent);
        let outcome = transfers.and_then(|()| self.book.check_position(caller));
        if let Err(e) = outcome {
            self.rollback_unstake(caller, checkpoint, &sent, registry);
            return Err(e);
        }

        info!(owner = %caller, count = token_ids.len(), total = self.book.total_staked(), "tokens unstaked");
        Ok(self.events.emit(ContractEvent::Unstaked(Unstaked {
            owner: caller,
            token_ids: token_ids.to_vec(),
        })))
    }

    fn release_batch(
        &mut self,
        caller: Address,
        token_ids: &[TokenId],
        registry: &dyn NftRegistry,
    ) -> Result<(), LedgerError> {
        for &token_id in token_ids {
            if self.book.staker_of(token_id) != Some(caller) {
                return Err(LedgerError::NotStaker { token_id });
            }
            let recorded = self
                .book
                .position(caller)
                .map_or(false, |position| position.tokens().contains(&token_id));
            if !recorded {
                error!(owner = %caller, %token_id, "stake record without position entry");
                return Err(LedgerError::NotRecorded { token_id });
            }
            if registry.owner_of(token_id)? != self.address {
                error!(owner = %caller, %token_id, "staked token missing from custody");
                return Err(LedgerError::NotInCustody { token_id });
            }
            self.book.release(caller, token_id)?;
        }
        self.book.sub_counts(caller, token_ids.len() as u64)
    }

    fn send_tokens(
        &mut self,
        caller: Address,
        token_ids: &[TokenId],
        registry: &mut dyn NftRegistry,
        sent: &mut Vec<TokenId>,
    ) -> Result<(), LedgerError> {
        let custody = self.address;
        for &token_id in token_ids {
            registry.transfer_from(custody, custody, caller, token_id, None)?;
            sent.push(token_id);
        }
        Ok(())
    }

    /// Pull back whatever was sent and restore the book.
    ///
    /// A token that cannot be pulled back is with its staker again, so its
    /// record is dropped rather than claiming custody the ledger lacks.
    fn rollback_unstake(
        &mut self,
        caller: Address,
        checkpoint: Checkpoint,
        sent: &[TokenId],
        registry: &mut dyn NftRegistry,
    ) {
        self.book.restore(checkpoint);
        let custody = self.address;
        let mut lost = Vec::new();

        // Reclaims arrive through the receiver hook, same as deposits.
        self.gate.open();
        for &token_id in sent.iter().rev() {
            let receiver: &mut dyn CustodyEndpoint = &mut *self;
            let reclaimed = registry
                .transfer_from(custody, caller, custody, token_id, Some(receiver))
                .and_then(|()| registry.owner_of(token_id));
            match reclaimed {
                Ok(holder) if holder == custody => {}
                Ok(holder) => {
                    error!(owner = %caller, %token_id, %holder, "reclaim reported but token not in custody");
                    lost.push(token_id);
                }
                Err(e) => {
                    error!(owner = %caller, %token_id, error = %e, "failed to reclaim token during unstake rollback");
                    lost.push(token_id);
                }
            }
        }
        self.gate.close();

        for token_id in lost {
            let dropped = self
                .book
                .release(caller, token_id)
                .and_then(|()| self.book.sub_counts(caller, 1));
            if let Err(e) = dropped {
                error!(owner = %caller, %token_id, error = %e, "failed to drop record of unreclaimed token");
            }
        }
    }
}
