//! Custody ledger — shared state and admin surface
//!
//! `CustodyLedger` owns the stake book and every guard. The stake, unstake,
//! recovery and query paths are implemented in their own modules as further
//! `impl CustodyLedger` blocks.
//!
//! All state-changing entry points check, in order:
//! 1. Reentrancy guard
//! 2. Pause state (stake only)
//! 3. Access control (admin paths)
//! 4. Batch bounds and per-token preconditions

use ledger_types::ids::{Address, CollectionId, LedgerId, TokenId};
use tracing::{info, warn};

use crate::book::StakeBook;
use crate::config::{validate_batch_size, LedgerConfig};
use crate::errors::{GuardError, LedgerError};
use crate::events::{AdminTransferred, ContractEvent, EventLog, EventRecord, MaxBatchSizeUpdated};
use crate::registry::{CustodyEndpoint, NftRegistry, Receipt, TransferObserver, TOKEN_RECEIVED};
use crate::security::{AccessControl, GateState, PauseGuard, ReentrancyGuard, TransferGate};

/// NFT custody ledger for one managed collection.
#[derive(Debug)]
pub struct CustodyLedger {
    pub(crate) id: LedgerId,
    /// Account holding custody of staked tokens
    pub(crate) address: Address,
    /// Collection whose tokens can be staked
    pub(crate) collection: CollectionId,
    pub(crate) max_batch_size: usize,
    pub(crate) book: StakeBook,
    /// Security: reentrancy guard
    pub(crate) reentrancy_guard: ReentrancyGuard,
    /// Security: transfer-acceptance gate
    pub(crate) gate: TransferGate,
    /// Security: pause guard (stake path only)
    pub(crate) pause_guard: PauseGuard,
    /// Security: admin access control
    pub(crate) access_control: AccessControl,
    /// Emitted events log (append-only)
    pub(crate) events: EventLog,
}

impl CustodyLedger {
    /// Create a ledger with the default configuration.
    pub fn new(address: Address, collection: CollectionId, admin: Address) -> Self {
        let id = LedgerId::new();
        Self {
            id,
            address,
            collection,
            max_batch_size: LedgerConfig::default().max_batch_size,
            book: StakeBook::new(),
            reentrancy_guard: ReentrancyGuard::new(),
            gate: TransferGate::new(),
            pause_guard: PauseGuard::new(),
            access_control: AccessControl::new(admin),
            events: EventLog::new(id),
        }
    }

    /// Create a ledger from a validated configuration.
    pub fn with_config(
        address: Address,
        collection: CollectionId,
        admin: Address,
        config: &LedgerConfig,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        let mut ledger = Self::new(address, collection, admin);
        ledger.max_batch_size = config.max_batch_size;
        if config.start_paused {
            ledger.pause_guard.pause();
        }
        Ok(ledger)
    }

    // ───────────────────────── Accessors ─────────────────────────

    pub fn id(&self) -> LedgerId {
        self.id
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    pub fn admin(&self) -> Address {
        self.access_control.admin()
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Check if the stake path is paused.
    pub fn is_paused(&self) -> bool {
        self.pause_guard.is_paused()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn book(&self) -> &StakeBook {
        &self.book
    }

    // ───────────────────────── Admin ─────────────────────────

    /// Retune the max batch size. Admin-only, bounded to 1..=200.
    pub fn set_max_batch_size(
        &mut self,
        caller: Address,
        size: usize,
    ) -> Result<EventRecord, LedgerError> {
        self.only_admin(caller)?;
        if validate_batch_size(size).is_err() {
            return Err(LedgerError::InvalidBatchSize { requested: size });
        }
        let previous = self.max_batch_size;
        self.max_batch_size = size;
        info!(previous, current = size, "max batch size updated");
        Ok(self
            .events
            .emit(ContractEvent::MaxBatchSizeUpdated(MaxBatchSizeUpdated {
                previous,
                current: size,
            })))
    }

    /// Pause the stake path. Admin-only. Unstake stays available.
    pub fn pause(&mut self, caller: Address) -> Result<EventRecord, LedgerError> {
        self.only_admin(caller)?;
        self.pause_guard.pause();
        info!(by = %caller, "staking paused");
        Ok(self.events.emit(ContractEvent::Paused { by: caller }))
    }

    /// Unpause the stake path. Admin-only.
    pub fn unpause(&mut self, caller: Address) -> Result<EventRecord, LedgerError> {
        self.only_admin(caller)?;
        self.pause_guard.unpause();
        info!(by = %caller, "staking unpaused");
        Ok(self.events.emit(ContractEvent::Unpaused { by: caller }))
    }

    /// Hand the admin role to `new_admin`.
    pub fn transfer_admin(
        &mut self,
        caller: Address,
        new_admin: Address,
    ) -> Result<EventRecord, LedgerError> {
        self.only_admin(caller)?;
        if new_admin.is_zero() {
            return Err(LedgerError::BadReceiver);
        }
        if !self.access_control.transfer_admin(caller, new_admin) {
            return Err(LedgerError::Unauthorized);
        }
        info!(previous = %caller, current = %new_admin, "admin transferred");
        Ok(self
            .events
            .emit(ContractEvent::AdminTransferred(AdminTransferred {
                previous: caller,
                current: new_admin,
            })))
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    // ───────────────────────── Internal Guards ─────────────────────────

    /// Run `op` under the reentrancy lock, releasing it on every exit path.
    pub(crate) fn guarded<T>(
        &mut self,
        op: &'static str,
        body: impl FnOnce(&mut Self) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        if !self.reentrancy_guard.acquire() {
            warn!(op, "reentrant call rejected");
            return Err(LedgerError::Reentrancy);
        }
        let result = body(self);
        self.reentrancy_guard.release();
        result
    }

    pub(crate) fn only_admin(&self, caller: Address) -> Result<(), LedgerError> {
        if !self.access_control.is_admin(caller) {
            warn!(%caller, "admin operation rejected");
            return Err(LedgerError::Unauthorized);
        }
        Ok(())
    }

    pub(crate) fn check_batch(&self, token_ids: &[TokenId]) -> Result<(), LedgerError> {
        if token_ids.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }
        if token_ids.len() > self.max_batch_size {
            return Err(LedgerError::BatchTooLarge {
                len: token_ids.len(),
                max: self.max_batch_size,
            });
        }
        Ok(())
    }

    /// The registry handed in must be the managed collection.
    pub(crate) fn check_collection(&self, registry: &dyn NftRegistry) -> Result<(), LedgerError> {
        let collection = registry.collection();
        if collection != self.collection {
            return Err(LedgerError::UnknownCollection { collection });
        }
        Ok(())
    }
}

impl TransferObserver for CustodyLedger {
    fn on_token_received(
        &mut self,
        operator: Address,
        from: Address,
        token_id: TokenId,
    ) -> Result<Receipt, GuardError> {
        if let Err(e) = self.gate.check(operator, self.address) {
            warn!(%operator, %from, %token_id, error = %e, "inbound transfer rejected");
            return Err(e);
        }
        Ok(TOKEN_RECEIVED)
    }
}

impl CustodyEndpoint for CustodyLedger {
    fn custody_address(&self) -> Address {
        self.address
    }

    fn stake(
        &mut self,
        caller: Address,
        token_ids: &[TokenId],
        registry: &mut dyn NftRegistry,
    ) -> Result<EventRecord, LedgerError> {
        CustodyLedger::stake(self, caller, token_ids, registry)
    }

    fn unstake(
        &mut self,
        caller: Address,
        token_ids: &[TokenId],
        registry: &mut dyn NftRegistry,
    ) -> Result<EventRecord, LedgerError> {
        CustodyLedger::unstake(self, caller, token_ids, registry)
    }
}
