//! # broker: order routing and exchange event orchestration
//!
//! The [`Broker`] owns the shared market queue and one [`OrderManager`] per
//! traded symbol, routes client orders into them, and keeps queue thresholds
//! in step with exchange open/close and price events.

pub mod broker;
pub mod manager;
pub mod processors;

pub use broker::{Broker, BrokerConfig, BrokerError};
pub use manager::OrderManager;
pub use processors::{MoveToMarketQueue, TradeExecutor};
