//! Ledger configuration
//!
//! Loaded from JSON at construction time; `max_batch_size` can be retuned at
//! runtime through the admin surface with the same bounds.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Smallest accepted max batch size.
pub const MIN_BATCH_SIZE: usize = 1;
/// Largest accepted max batch size.
pub const MAX_BATCH_SIZE_LIMIT: usize = 200;
/// Max batch size used when none is configured.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 50;

/// Tunable ledger parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum number of token ids accepted by one stake or unstake call.
    pub max_batch_size: usize,
    /// Start with the deposit path paused.
    pub start_paused: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            start_paused: false,
        }
    }
}

impl LedgerConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig = serde_json::from_str(raw).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_batch_size(self.max_batch_size)
    }
}

/// Check a max batch size against `MIN_BATCH_SIZE..=MAX_BATCH_SIZE_LIMIT`.
pub fn validate_batch_size(value: usize) -> Result<(), ConfigError> {
    if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE_LIMIT).contains(&value) {
        return Err(ConfigError::BatchSizeOutOfRange {
            value,
            min: MIN_BATCH_SIZE,
            max: MAX_BATCH_SIZE_LIMIT,
        });
    }
    Ok(())
}
