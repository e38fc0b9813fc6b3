//! Per-symbol home for stop orders.

use order_queue::{
    Order, OrderProcessor, OrderQueue, Price, Side, StopBuyFilter, StopBuyQueue, StopSellFilter,
    StopSellQueue, WorkerPool,
};
use std::sync::Arc;
use tracing::debug;

/// Owns the stop-buy and stop-sell queues for one ticker symbol and keeps
/// their filter thresholds in step with the market price.
pub struct OrderManager {
    symbol: String,
    stop_buys: Arc<StopBuyQueue>,
    stop_sells: Arc<StopSellQueue>,
}

impl OrderManager {
    /// Creates the manager for `symbol` with both filters seeded at the
    /// symbol's current price.
    pub fn new(symbol: impl Into<String>, price: Price, pool: Arc<WorkerPool>) -> Self {
        let symbol = symbol.into();
        Self {
            symbol,
            stop_buys: OrderQueue::new(StopBuyFilter::new(price), Arc::clone(&pool)),
            stop_sells: OrderQueue::new(StopSellFilter::new(price), pool),
        }
    }

    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Routes a stop order to the queue for its side.
    pub fn queue_order(&self, order: Order) {
        debug!(symbol = %self.symbol, order = %order.id(), "stop order queued");
        match order.side() {
            Side::Buy => self.stop_buys.enqueue(order),
            Side::Sell => self.stop_sells.enqueue(order),
        }
    }

    /// Moves both filter thresholds to the new price, re-triggering dispatch
    /// on each queue.
    pub fn adjust_price(&self, price: Price) {
        self.stop_buys.set_threshold(price);
        self.stop_sells.set_threshold(price);
    }

    /// Registers the processor on both queues; the broker passes the relay
    /// that feeds triggered orders into the market queue.
    pub fn set_order_processor(&self, processor: Option<Arc<dyn OrderProcessor>>) {
        self.stop_buys.set_order_processor(processor.clone());
        self.stop_sells.set_order_processor(processor);
    }

    #[inline]
    pub fn pending_orders(&self) -> usize {
        self.stop_buys.len() + self.stop_sells.len()
    }
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("symbol", &self.symbol)
            .field("stop_buys", &self.stop_buys.len())
            .field("stop_sells", &self.stop_sells.len())
            .finish()
    }
}
