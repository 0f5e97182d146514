//! Stake — deposit path
//!
//! Checks, then effects, then interactions:
//! - every token is untracked, owned by the caller and unique in the batch
//! - counters and stake records are written for the whole batch
//! - with the transfer gate open, each token is pulled into custody
//! - the caller's position is re-checked before success is reported
//!
//! Any failure leaves bookkeeping and custody as they were.

use ledger_types::ids::{Address, TokenId};
use tracing::{error, info};

use crate::book::Checkpoint;
use crate::errors::LedgerError;
use crate::events::{ContractEvent, EventRecord, Staked};
use crate::ledger::CustodyLedger;
use crate::registry::{CustodyEndpoint, NftRegistry};

impl CustodyLedger {
    /// Deposit `token_ids` owned by `caller` into custody.
    ///
    /// The caller must have approved the ledger as operator on `registry`.
    /// Emits `Staked`.
    pub fn stake(
        &mut self,
        caller: Address,
        token_ids: &[TokenId],
        registry: &mut dyn NftRegistry,
    ) -> Result<EventRecord, LedgerError> {
        self.guarded("stake", |ledger| ledger.stake_locked(caller, token_ids, registry))
    }

    fn stake_locked(
        &mut self,
        caller: Address,
        token_ids: &[TokenId],
        registry: &mut dyn NftRegistry,
    ) -> Result<EventRecord, LedgerError> {
        if self.pause_guard.is_paused() {
            return Err(LedgerError::Paused);
        }
        self.check_batch(token_ids)?;
        self.check_collection(registry)?;

        // Checks
        for (i, &token_id) in token_ids.iter().enumerate() {
            if self.book.staker_of(token_id).is_some() {
                return Err(LedgerError::AlreadyStaked { token_id });
            }
            if registry.owner_of(token_id)? != caller {
                return Err(LedgerError::NotTokenOwner { token_id });
            }
            // Batches are small and bounded, pairwise is fine.
            if token_ids[..i].contains(&token_id) {
                return Err(LedgerError::DuplicateToken { token_id });
            }
        }

        // Effects
        let checkpoint = self.book.checkpoint(caller, token_ids);
        if let Err(e) = self.record_batch(caller, token_ids) {
            self.book.restore(checkpoint);
            return Err(e);
        }

        // Interactions
        let mut pulled = Vec::with_capacity(token_ids.len());
        self.gate.open();
        let transfers = self.pull_tokens(caller, token_ids, registry, &mut pulled);
        self.gate.close();

        let outcome = transfers.and_then(|()| self.book.check_position(caller));
        if let Err(e) = outcome {
            self.rollback_stake(caller, checkpoint, &pulled, registry);
            return Err(e);
        }

        info!(owner = %caller, count = token_ids.len(), total = self.book.total_staked(), "tokens staked");
        Ok(self.events.emit(ContractEvent::Staked(Staked {
            owner: caller,
            token_ids: token_ids.to_vec(),
        })))
    }

    fn record_batch(&mut self, caller: Address, token_ids: &[TokenId]) -> Result<(), LedgerError> {
        self.book.add_counts(caller, token_ids.len() as u64)?;
        for &token_id in token_ids {
            self.book.record(caller, token_id)?;
        }
        Ok(())
    }

    /// Pull each token from `caller` into custody, recording what moved.
    ///
    /// A transfer only counts once the registry reports the ledger as owner.
    fn pull_tokens(
        &mut self,
        caller: Address,
        token_ids: &[TokenId],
        registry: &mut dyn NftRegistry,
        pulled: &mut Vec<TokenId>,
    ) -> Result<(), LedgerError> {
        let custody = self.address;
        for &token_id in token_ids {
            let receiver: &mut dyn CustodyEndpoint = &mut *self;
            registry.transfer_from(custody, caller, custody, token_id, Some(receiver))?;
            let holder = registry.owner_of(token_id)?;
            if holder != custody {
                error!(owner = %caller, %token_id, %holder, "registry reported transfer but did not move token");
                return Err(LedgerError::NotInCustody { token_id });
            }
            pulled.push(token_id);
        }
        Ok(())
    }

    /// Send back whatever was pulled and restore the book.
    ///
    /// A token that cannot be returned stays in custody untracked, where the
    /// admin can still recover it.
    fn rollback_stake(
        &mut self,
        caller: Address,
        checkpoint: Checkpoint,
        pulled: &[TokenId],
        registry: &mut dyn NftRegistry,
    ) {
        self.book.restore(checkpoint);
        let custody = self.address;
        for &token_id in pulled.iter().rev() {
            if let Err(e) = registry.transfer_from(custody, custody, caller, token_id, None) {
                error!(owner = %caller, %token_id, error = %e, "failed to return token during stake rollback");
            }
        }
    }
}
