//! # exchange: stock exchange contract and simulator
//!
//! The [`Exchange`] trait is the boundary the dispatch core consumes:
//! open/closed state, quotes, trade execution, and an event subscription.
//! [`SimulatedExchange`] is the in-process implementation used by the demo
//! binary and the test suites.

pub mod sim;
pub mod types;

pub use sim::SimulatedExchange;
pub use types::{Exchange, ExchangeError, ExchangeEvent, ExchangeListener, ListenerId, StockQuote};
