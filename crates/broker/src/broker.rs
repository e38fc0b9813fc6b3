//! Broker orchestration: client order placement, account operations, and
//! routing of exchange events into queue thresholds.

use crate::manager::OrderManager;
use crate::processors::{MoveToMarketQueue, TradeExecutor};
use accounts::{Account, AccountError, AccountManager};
use exchange::{Exchange, ExchangeError, ExchangeListener, ListenerId, StockQuote};
use order_queue::{
    MarketFilter, MarketOrderQueue, Order, OrderKind, OrderProcessor, OrderQueue, Price,
    WorkerPool,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("account operation failed: {0}")]
    Account(#[from] AccountError),

    #[error("exchange operation failed: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("invalid credentials for account: {0}")]
    InvalidLogin(String),

    #[error("broker is closed")]
    Closed,

    #[error("failed to start worker pool: {0}")]
    Pool(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub worker_threads: usize,
    pub shutdown_grace_ms: u64,
}

impl BrokerConfig {
    #[inline]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            worker_threads: 32,
            shutdown_grace_ms: 1_000,
        }
    }
}

/// Exchange listener registered by the broker. Open/close flips the market
/// queue's threshold; price changes are forwarded to the symbol's manager.
struct EventRouter {
    market_orders: Arc<MarketOrderQueue>,
    managers: Arc<HashMap<String, OrderManager>>,
}

impl ExchangeListener for EventRouter {
    fn exchange_opened(&self) {
        info!("exchange opened, releasing market orders");
        self.market_orders.set_threshold(true);
    }

    fn exchange_closed(&self) {
        info!("exchange closed, holding market orders");
        self.market_orders.set_threshold(false);
    }

    fn price_changed(&self, ticker: &str, price: Price) {
        match self.managers.get(ticker) {
            Some(manager) => manager.adjust_price(price),
            None => warn!(%ticker, "price update for unknown ticker ignored"),
        }
    }
}

pub struct Broker {
    name: String,
    accounts: Arc<dyn AccountManager>,
    exchange: Arc<dyn Exchange>,
    market_orders: Arc<MarketOrderQueue>,
    managers: Arc<HashMap<String, OrderManager>>,
    pool: Arc<WorkerPool>,
    listener: ListenerId,
    shutdown_grace: Duration,
    closed: AtomicBool,
}

impl Broker {
    /// Builds the broker: the shared worker pool, the market queue wired to
    /// a [`TradeExecutor`], and one [`OrderManager`] per exchange ticker
    /// wired to the market-queue relay. The exchange subscription is
    /// registered last so no event arrives before the queues exist.
    pub fn new(
        name: impl Into<String>,
        accounts: Arc<dyn AccountManager>,
        exchange: Arc<dyn Exchange>,
        config: &BrokerConfig,
    ) -> Result<Self, BrokerError> {
        let name = name.into();
        let pool = WorkerPool::new(config.worker_threads)?;

        let market_orders = OrderQueue::new(MarketFilter::new(exchange.is_open()), Arc::clone(&pool));
        market_orders.set_order_processor(Some(Arc::new(TradeExecutor::new(
            Arc::clone(&accounts),
            Arc::clone(&exchange),
        ))));

        let relay: Arc<dyn OrderProcessor> =
            Arc::new(MoveToMarketQueue::new(Arc::clone(&market_orders)));
        let mut managers = HashMap::new();
        for ticker in exchange.tickers() {
            let quote = exchange.quote(&ticker)?;
            let manager = OrderManager::new(&ticker, quote.price(), Arc::clone(&pool));
            manager.set_order_processor(Some(Arc::clone(&relay)));
            managers.insert(ticker, manager);
        }
        let managers = Arc::new(managers);

        let listener = exchange.subscribe(Arc::new(EventRouter {
            market_orders: Arc::clone(&market_orders),
            managers: Arc::clone(&managers),
        }));

        info!(broker = %name, symbols = managers.len(), "broker started");
        Ok(Self {
            name,
            accounts,
            exchange,
            market_orders,
            managers,
            pool,
            listener,
            shutdown_grace: config.shutdown_grace(),
            closed: AtomicBool::new(false),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn ensure_open(&self) -> Result<(), BrokerError> {
        if self.closed.load(Ordering::Acquire) {
            Err(BrokerError::Closed)
        } else {
            Ok(())
        }
    }

    pub fn create_account(
        &self,
        username: &str,
        password: &str,
        balance: Price,
    ) -> Result<Arc<Account>, BrokerError> {
        self.ensure_open()?;
        Ok(self.accounts.create_account(username, password, balance)?)
    }

    pub fn delete_account(&self, username: &str) -> Result<(), BrokerError> {
        self.ensure_open()?;
        Ok(self.accounts.delete_account(username)?)
    }

    /// Looks up an account, validating the credentials first.
    pub fn get_account(&self, username: &str, password: &str) -> Result<Arc<Account>, BrokerError> {
        self.ensure_open()?;
        if !self.accounts.validate_login(username, password)? {
            return Err(BrokerError::InvalidLogin(username.to_string()));
        }
        Ok(self.accounts.get_account(username)?)
    }

    pub fn request_quote(&self, ticker: &str) -> Result<StockQuote, BrokerError> {
        self.ensure_open()?;
        Ok(self.exchange.quote(ticker)?)
    }

    /// Accepts an order: market orders go straight to the shared market
    /// queue, stop orders to their symbol's manager. A stop order for an
    /// unknown ticker is dropped with a diagnostic; the broker stays usable.
    pub fn place_order(&self, order: Order) -> Result<(), BrokerError> {
        self.ensure_open()?;
        match order.kind() {
            OrderKind::Market => self.market_orders.enqueue(order),
            OrderKind::Stop(_) => match self.managers.get(order.symbol()) {
                Some(manager) => manager.queue_order(order),
                None => {
                    error!(symbol = order.symbol(), order = %order.id(), "no order manager for ticker, order dropped");
                }
            },
        }
        Ok(())
    }

    /// Tears the broker down: stops the worker pool with a bounded grace
    /// period, detaches every queue's processor so late drains reach
    /// nothing, unsubscribes from the exchange, and closes the account
    /// manager. Further operations fail with [`BrokerError::Closed`].
    pub fn close(&self) -> Result<(), BrokerError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(BrokerError::Closed);
        }
        self.pool.shutdown(self.shutdown_grace);
        self.market_orders.set_order_processor(None);
        for manager in self.managers.values() {
            manager.set_order_processor(None);
        }
        self.exchange.unsubscribe(self.listener);
        self.accounts.close()?;
        info!(broker = %self.name, "broker closed");
        Ok(())
    }
}

impl std::fmt::Debug for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("name", &self.name)
            .field("symbols", &self.managers.len())
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}
