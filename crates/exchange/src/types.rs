use order_queue::{Order, Price};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("unknown ticker symbol: {0}")]
    UnknownTicker(String),

    #[error("exchange is closed")]
    Closed,
}

/// Current trading price for a ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockQuote {
    ticker: String,
    price: Price,
}

impl StockQuote {
    #[inline]
    pub fn new(ticker: impl Into<String>, price: Price) -> Self {
        Self {
            ticker: ticker.into(),
            price,
        }
    }

    #[inline]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }
}

impl fmt::Display for StockQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.ticker, self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeEvent {
    Opened,
    Closed,
    PriceChanged { ticker: String, price: Price },
}

/// Receives exchange lifecycle and price notifications. Callbacks run on the
/// thread delivering the event and must not block beyond updating thresholds
/// and scheduling dispatch.
pub trait ExchangeListener: Send + Sync {
    fn exchange_opened(&self);

    fn exchange_closed(&self);

    fn price_changed(&self, ticker: &str, price: Price);
}

/// Handle returned by [`Exchange::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Contract the dispatch core requires from an exchange.
pub trait Exchange: Send + Sync {
    fn is_open(&self) -> bool;

    fn tickers(&self) -> Vec<String>;

    fn quote(&self, ticker: &str) -> Result<StockQuote, ExchangeError>;

    /// Executes the order at the current market price and returns the
    /// execution price.
    fn execute_trade(&self, order: &Order) -> Result<Price, ExchangeError>;

    fn subscribe(&self, listener: Arc<dyn ExchangeListener>) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);
}
