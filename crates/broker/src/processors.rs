//! Order processors: the terminal executor and the stop-to-market relay.

use accounts::AccountManager;
use anyhow::{Context, Result};
use exchange::Exchange;
use order_queue::{MarketOrderQueue, Order, OrderProcessor};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Terminal processor for the market queue: executes the trade against the
/// exchange and reflects the execution price onto the account. A failure
/// affects only the order being processed; the balance is left untouched.
pub struct TradeExecutor {
    accounts: Arc<dyn AccountManager>,
    exchange: Arc<dyn Exchange>,
}

impl TradeExecutor {
    pub fn new(accounts: Arc<dyn AccountManager>, exchange: Arc<dyn Exchange>) -> Self {
        Self { accounts, exchange }
    }
}

impl OrderProcessor for TradeExecutor {
    fn process(&self, order: Order) -> Result<()> {
        if !self.exchange.is_open() {
            warn!(order = %order.id(), "exchange closed, order not executed");
            return Ok(());
        }
        let execution_price = self
            .exchange
            .execute_trade(&order)
            .with_context(|| format!("trade failed for order {}", order.id()))?;
        let account = self
            .accounts
            .get_account(order.account())
            .with_context(|| format!("no account for order {}", order.id()))?;
        account.reflect_order(&order, execution_price);
        info!(order = %order.id(), %execution_price, "order executed");
        Ok(())
    }
}

/// Relay processor for stop queues: a triggered stop order is moved into the
/// broker's shared market queue to execute as a market order.
pub struct MoveToMarketQueue {
    market_orders: Arc<MarketOrderQueue>,
}

impl MoveToMarketQueue {
    pub fn new(market_orders: Arc<MarketOrderQueue>) -> Self {
        Self { market_orders }
    }
}

impl OrderProcessor for MoveToMarketQueue {
    fn process(&self, order: Order) -> Result<()> {
        debug!(order = %order.id(), "stop order triggered, moving to market queue");
        self.market_orders.enqueue(order);
        Ok(())
    }
}
