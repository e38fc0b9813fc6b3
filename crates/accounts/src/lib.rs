//! # accounts: brokerage account management
//!
//! The [`AccountManager`] trait is the storage boundary the broker consumes;
//! [`MemoryAccountManager`] is the in-memory implementation. Validation
//! limits come from an explicit [`AccountConfig`].

pub mod account;
pub mod manager;

use order_queue::Price;
use thiserror::Error;

pub use account::{Account, AccountConfig};
pub use manager::{AccountManager, MemoryAccountManager};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("account name '{name}' is shorter than the minimum of {min_len}")]
    NameTooShort { name: String, min_len: usize },

    #[error("initial balance {balance} is below the minimum of {min_balance}")]
    BelowMinimumBalance { balance: Price, min_balance: Price },

    #[error("account already exists: {0}")]
    AlreadyExists(String),

    #[error("account not found: {0}")]
    NotFound(String),

    #[error("account manager is closed")]
    Closed,
}
