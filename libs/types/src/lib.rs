//! Types library for the custody ledger
//!
//! Identifier types shared between the ledger, the asset registries it talks
//! to, and off-chain indexers reading its events.
//!
//! # Modules
//! - `ids`: Identifiers (Address, TokenId, CollectionId, LedgerId)
//! - `errors`: Identifier parse errors

pub mod ids;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::errors::*;
}
