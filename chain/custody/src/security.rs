//! Shared security primitives for the ledger
//!
//! Reentrancy lock, transfer-acceptance gate, pause flag and admin access
//! control. Each is a small state machine owned by `CustodyLedger`.

use ledger_types::ids::Address;

use crate::errors::GuardError;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// A ledger entry point acquires the guard before executing state-changing
/// logic and releases it on completion. Any nested call attempt fails.
#[derive(Debug, Clone)]
pub struct ReentrancyGuard {
    locked: bool,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self { locked: false }
    }

    /// Acquire the guard. Returns `true` if successfully acquired.
    /// Returns `false` if already locked (reentrancy attempt).
    pub fn acquire(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    /// Release the guard.
    pub fn release(&mut self) {
        self.locked = false;
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// State of the transfer-acceptance gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Default: every inbound transfer notification is rejected.
    Closed,
    /// Only during the interaction phase of a stake call.
    Open,
}

/// Transfer-acceptance gate.
///
/// Inbound transfer notifications are accepted only while the gate is open
/// and only when the ledger itself initiated the underlying transfer.
/// Never persisted; it is closed again before every stake call returns.
#[derive(Debug, Clone)]
pub struct TransferGate {
    state: GateState,
}

impl TransferGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Closed,
        }
    }

    pub fn open(&mut self) {
        self.state = GateState::Open;
    }

    pub fn close(&mut self) {
        self.state = GateState::Closed;
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Decide whether an inbound transfer started by `operator` is expected.
    pub fn check(&self, operator: Address, ledger: Address) -> Result<(), GuardError> {
        match self.state {
            GateState::Closed => Err(GuardError::Closed),
            GateState::Open if operator != ledger => Err(GuardError::ForeignOperator { operator }),
            GateState::Open => Ok(()),
        }
    }
}

impl Default for TransferGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-admin access control.
///
/// The admin may pause staking, retune the batch size and run recovery. It
/// has no say over staked tokens.
#[derive(Debug, Clone)]
pub struct AccessControl {
    admin: Address,
}

impl AccessControl {
    /// Create access control with an initial admin.
    pub fn new(admin: Address) -> Self {
        Self { admin }
    }

    /// Check if a caller is admin.
    pub fn is_admin(&self, caller: Address) -> bool {
        caller == self.admin
    }

    /// Transfer admin to a new address. The zero address is refused.
    pub fn transfer_admin(&mut self, current_admin: Address, new_admin: Address) -> bool {
        if !self.is_admin(current_admin) || new_admin.is_zero() {
            return false;
        }
        self.admin = new_admin;
        true
    }

    /// Get the current admin.
    pub fn admin(&self) -> Address {
        self.admin
    }
}

/// Composable pause modifier.
///
/// When paused, the stake path must be rejected. Unstake ignores it.
#[derive(Debug, Clone)]
pub struct PauseGuard {
    paused: bool,
}

impl PauseGuard {
    /// Create a new unpaused guard.
    pub fn new() -> Self {
        Self { paused: false }
    }

    /// Pause operations.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Unpause operations.
    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// Check if currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Default for PauseGuard {
    fn default() -> Self {
        Self::new()
    }
}
