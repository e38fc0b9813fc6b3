//! In-process simulated exchange.
//!
//! Prices move only through [`SimulatedExchange::set_price`]; there is no
//! price-simulation engine. Listeners are notified synchronously on the
//! calling thread, which mirrors how a real exchange adapter would deliver
//! events from its own I/O thread.

use crate::types::{Exchange, ExchangeError, ExchangeListener, ListenerId, StockQuote};
use order_queue::{Order, Price};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SimulatedExchange {
    open: AtomicBool,
    prices: RwLock<HashMap<String, Price>>,
    listeners: RwLock<HashMap<u64, Arc<dyn ExchangeListener>>>,
    next_listener: AtomicU64,
}

impl SimulatedExchange {
    /// Creates a closed exchange trading the given symbols.
    pub fn new(initial_prices: impl IntoIterator<Item = (String, Price)>) -> Self {
        Self {
            open: AtomicBool::new(false),
            prices: RwLock::new(initial_prices.into_iter().collect()),
            listeners: RwLock::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    pub fn open(&self) {
        if !self.open.swap(true, Ordering::AcqRel) {
            info!("exchange opened");
            for listener in self.snapshot_listeners() {
                listener.exchange_opened();
            }
        }
    }

    pub fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            info!("exchange closed");
            for listener in self.snapshot_listeners() {
                listener.exchange_closed();
            }
        }
    }

    /// Moves a symbol's price and notifies listeners.
    pub fn set_price(&self, ticker: &str, price: Price) -> Result<(), ExchangeError> {
        {
            let mut prices = self.prices.write();
            match prices.get_mut(ticker) {
                Some(current) => *current = price,
                None => return Err(ExchangeError::UnknownTicker(ticker.to_string())),
            }
        }
        info!(%ticker, %price, "price changed");
        for listener in self.snapshot_listeners() {
            listener.price_changed(ticker, price);
        }
        Ok(())
    }

    fn snapshot_listeners(&self) -> Vec<Arc<dyn ExchangeListener>> {
        self.listeners.read().values().cloned().collect()
    }
}

impl Exchange for SimulatedExchange {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.prices.read().keys().cloned().collect();
        tickers.sort();
        tickers
    }

    fn quote(&self, ticker: &str) -> Result<StockQuote, ExchangeError> {
        self.prices
            .read()
            .get(ticker)
            .map(|price| StockQuote::new(ticker, *price))
            .ok_or_else(|| ExchangeError::UnknownTicker(ticker.to_string()))
    }

    fn execute_trade(&self, order: &Order) -> Result<Price, ExchangeError> {
        if !self.is_open() {
            warn!(order = %order.id(), "trade rejected, exchange closed");
            return Err(ExchangeError::Closed);
        }
        let price = self
            .prices
            .read()
            .get(order.symbol())
            .copied()
            .ok_or_else(|| ExchangeError::UnknownTicker(order.symbol().to_string()))?;
        info!(order = %order.id(), symbol = order.symbol(), %price, "trade executed");
        Ok(price)
    }

    fn subscribe(&self, listener: Arc<dyn ExchangeListener>) -> ListenerId {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().insert(id, listener);
        ListenerId(id)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.write().remove(&id.0);
    }
}

impl std::fmt::Debug for SimulatedExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedExchange")
            .field("open", &self.is_open())
            .field("symbols", &self.prices.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExchangeEvent;
    use crossbeam_channel::{unbounded, Sender};
    use order_queue::Side;

    struct EventRecorder {
        tx: Sender<ExchangeEvent>,
    }

    impl ExchangeListener for EventRecorder {
        fn exchange_opened(&self) {
            let _ = self.tx.send(ExchangeEvent::Opened);
        }

        fn exchange_closed(&self) {
            let _ = self.tx.send(ExchangeEvent::Closed);
        }

        fn price_changed(&self, ticker: &str, price: Price) {
            let _ = self.tx.send(ExchangeEvent::PriceChanged {
                ticker: ticker.to_string(),
                price,
            });
        }
    }

    fn exchange() -> SimulatedExchange {
        SimulatedExchange::new([
            ("BA".to_string(), Price::from_cents(5000)),
            ("F".to_string(), Price::from_cents(1200)),
        ])
    }

    #[test]
    fn test_starts_closed_with_seeded_quotes() {
        let exchange = exchange();

        assert!(!exchange.is_open());
        assert_eq!(exchange.tickers(), vec!["BA".to_string(), "F".to_string()]);
        assert_eq!(exchange.quote("BA").unwrap().price(), Price::from_cents(5000));
        assert_eq!(
            exchange.quote("XYZ"),
            Err(ExchangeError::UnknownTicker("XYZ".to_string()))
        );
    }

    #[test]
    fn test_open_close_notifies_listeners() {
        let exchange = exchange();
        let (tx, rx) = unbounded();
        exchange.subscribe(Arc::new(EventRecorder { tx }));

        exchange.open();
        assert!(exchange.is_open());
        assert_eq!(rx.try_recv().unwrap(), ExchangeEvent::Opened);

        // Opening an already-open exchange is a no-op.
        exchange.open();
        assert!(rx.try_recv().is_err());

        exchange.close();
        assert!(!exchange.is_open());
        assert_eq!(rx.try_recv().unwrap(), ExchangeEvent::Closed);
    }

    #[test]
    fn test_set_price_updates_quote_and_notifies() {
        let exchange = exchange();
        let (tx, rx) = unbounded();
        exchange.subscribe(Arc::new(EventRecorder { tx }));

        exchange.set_price("BA", Price::from_cents(5500)).unwrap();

        assert_eq!(exchange.quote("BA").unwrap().price(), Price::from_cents(5500));
        assert_eq!(
            rx.try_recv().unwrap(),
            ExchangeEvent::PriceChanged {
                ticker: "BA".to_string(),
                price: Price::from_cents(5500),
            }
        );
        assert_eq!(
            exchange.set_price("XYZ", Price::from_cents(1)),
            Err(ExchangeError::UnknownTicker("XYZ".to_string()))
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let exchange = exchange();
        let (tx, rx) = unbounded();
        let id = exchange.subscribe(Arc::new(EventRecorder { tx }));

        exchange.unsubscribe(id);
        exchange.open();

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_execute_trade_requires_open_exchange() {
        let exchange = exchange();
        let order = Order::market("acct", "BA", Side::Buy, 10);

        assert_eq!(exchange.execute_trade(&order), Err(ExchangeError::Closed));

        exchange.open();
        assert_eq!(exchange.execute_trade(&order), Ok(Price::from_cents(5000)));

        let unknown = Order::market("acct", "XYZ", Side::Buy, 10);
        assert_eq!(
            exchange.execute_trade(&unknown),
            Err(ExchangeError::UnknownTicker("XYZ".to_string()))
        );
    }
}
