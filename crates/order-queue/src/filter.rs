//! Dispatch filters gate which pending orders a queue may release.
//!
//! Each filter holds one atomic threshold. Threshold updates arrive through
//! [`crate::queue::OrderQueue::set_threshold`], which re-triggers the bound
//! queue so previously-ineligible orders are reconsidered without polling.

use crate::types::{Order, Price};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

pub trait DispatchFilter: Send + Sync + 'static {
    type Threshold;

    /// Reports whether the order may be dispatched right now.
    fn check(&self, order: &Order) -> bool;

    fn set_threshold(&self, value: Self::Threshold);

    fn threshold(&self) -> Self::Threshold;
}

/// Gates the market queue on exchange state: every order is dispatchable
/// while the exchange is open, none while it is closed.
#[derive(Debug)]
pub struct MarketFilter {
    open: AtomicBool,
}

impl MarketFilter {
    #[inline]
    pub fn new(open: bool) -> Self {
        Self {
            open: AtomicBool::new(open),
        }
    }
}

impl DispatchFilter for MarketFilter {
    type Threshold = bool;

    #[inline]
    fn check(&self, _order: &Order) -> bool {
        self.open.load(Ordering::Acquire)
    }

    #[inline]
    fn set_threshold(&self, value: bool) {
        self.open.store(value, Ordering::Release);
    }

    #[inline]
    fn threshold(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

/// Gates stop-buy orders on the market price: dispatchable iff the order's
/// trigger price is at or below the threshold.
#[derive(Debug)]
pub struct StopBuyFilter {
    price: AtomicI64,
}

impl StopBuyFilter {
    #[inline]
    pub fn new(price: Price) -> Self {
        Self {
            price: AtomicI64::new(price.cents()),
        }
    }
}

impl DispatchFilter for StopBuyFilter {
    type Threshold = Price;

    #[inline]
    fn check(&self, order: &Order) -> bool {
        order
            .trigger_price()
            .is_some_and(|trigger| trigger.cents() <= self.price.load(Ordering::Acquire))
    }

    #[inline]
    fn set_threshold(&self, value: Price) {
        self.price.store(value.cents(), Ordering::Release);
    }

    #[inline]
    fn threshold(&self) -> Price {
        Price::from_cents(self.price.load(Ordering::Acquire))
    }
}

/// Gates stop-sell orders on the market price: dispatchable iff the order's
/// trigger price is at or above the threshold.
#[derive(Debug)]
pub struct StopSellFilter {
    price: AtomicI64,
}

impl StopSellFilter {
    #[inline]
    pub fn new(price: Price) -> Self {
        Self {
            price: AtomicI64::new(price.cents()),
        }
    }
}

impl DispatchFilter for StopSellFilter {
    type Threshold = Price;

    #[inline]
    fn check(&self, order: &Order) -> bool {
        order
            .trigger_price()
            .is_some_and(|trigger| trigger.cents() >= self.price.load(Ordering::Acquire))
    }

    #[inline]
    fn set_threshold(&self, value: Price) {
        self.price.store(value.cents(), Ordering::Release);
    }

    #[inline]
    fn threshold(&self) -> Price {
        Price::from_cents(self.price.load(Ordering::Acquire))
    }
}
