//! # order-queue: concurrent order dispatch core
//!
//! Priority-ordered queues that release orders through a swappable dispatch
//! filter, drained single-flight on a shared worker pool.

pub mod filter;
pub mod pool;
pub mod priority;
pub mod processor;
pub mod queue;
pub mod types;

pub use filter::{DispatchFilter, MarketFilter, StopBuyFilter, StopSellFilter};
pub use pool::WorkerPool;
pub use priority::{ArrivalPriority, OrderPriority, StopBuyPriority, StopSellPriority};
pub use processor::OrderProcessor;
pub use queue::{MarketOrderQueue, OrderQueue, StopBuyQueue, StopSellQueue};
pub use types::{Order, OrderId, OrderKind, Price, Side};
