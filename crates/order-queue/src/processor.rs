use crate::types::Order;
use anyhow::Result;

/// Terminal sink for dispatched orders.
///
/// A processor either executes the order or relays it into another queue.
/// Errors are contained by the calling drain: the failed order is dropped
/// and the drain continues with the remaining eligible orders.
pub trait OrderProcessor: Send + Sync {
    fn process(&self, order: Order) -> Result<()>;
}
