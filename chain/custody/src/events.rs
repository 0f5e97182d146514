//! Contract events for off-chain indexers
//!
//! Events are immutable records emitted by successful ledger operations.
//! A failed call never emits anything.

use chrono::{DateTime, Utc};
use ledger_types::ids::{Address, CollectionId, LedgerId, TokenId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tokens deposited into custody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staked {
    pub owner: Address,
    pub token_ids: Vec<TokenId>,
}

/// Tokens released back to their staker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unstaked {
    pub owner: Address,
    pub token_ids: Vec<TokenId>,
}

/// Untracked token of the managed collection returned by the admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntrackedTokenRecovered {
    pub token_id: TokenId,
    pub to: Address,
}

/// Fungible balance swept out of the ledger by the admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleRecovered {
    pub token: CollectionId,
    pub to: Address,
    pub amount: Decimal,
}

/// Non-fungible token of any collection recovered by the admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignTokenRecovered {
    pub collection: CollectionId,
    pub token_id: TokenId,
    pub to: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxBatchSizeUpdated {
    pub previous: usize,
    pub current: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminTransferred {
    pub previous: Address,
    pub current: Address,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    Staked(Staked),
    Unstaked(Unstaked),
    UntrackedTokenRecovered(UntrackedTokenRecovered),
    FungibleRecovered(FungibleRecovered),
    ForeignTokenRecovered(ForeignTokenRecovered),
    MaxBatchSizeUpdated(MaxBatchSizeUpdated),
    Paused { by: Address },
    Unpaused { by: Address },
    AdminTransferred(AdminTransferred),
}

/// Envelope stored in the ledger's append-only event log.
///
/// `sequence` is gapless per ledger instance and starts at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub ledger_id: LedgerId,
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: ContractEvent,
}

/// Append-only event log for one ledger instance.
#[derive(Debug)]
pub struct EventLog {
    ledger_id: LedgerId,
    next_sequence: u64,
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new(ledger_id: LedgerId) -> Self {
        Self {
            ledger_id,
            next_sequence: 0,
            records: Vec::new(),
        }
    }

    /// Append an event, returning a copy of the stored envelope.
    pub fn emit(&mut self, event: ContractEvent) -> EventRecord {
        let record = EventRecord {
            ledger_id: self.ledger_id,
            sequence: self.next_sequence,
            recorded_at: Utc::now(),
            event,
        };
        self.next_sequence += 1;
        self.records.push(record.clone());
        record
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Drain all records. Sequence numbers keep counting afterwards.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }
}
