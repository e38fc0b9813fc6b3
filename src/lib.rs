//! # StockTrader: Simulated Brokerage Trading Engine
//!
//! A simulated brokerage built in Rust featuring:
//! - Concurrent priority order queues with single-flight dispatch
//! - Price-triggered stop order management per symbol
//! - Exchange event driven market open/close gating
//! - In-memory account management with balance tracking

pub mod config;

pub use accounts;
pub use broker;
pub use exchange;
pub use order_queue;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
