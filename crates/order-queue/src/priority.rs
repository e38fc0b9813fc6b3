//! Priority policies for order queues.
//!
//! A policy defines a total order over orders; the least order under the
//! policy is the next to dispatch. Every policy falls back to the order id,
//! so ties are broken by arrival and the ordering is always total.

use crate::types::Order;
use std::cmp::Ordering;

pub trait OrderPriority: Send + Sync + 'static {
    fn compare(a: &Order, b: &Order) -> Ordering;
}

/// Arrival order only. Used by the market queue, which has no price-based
/// priority.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrivalPriority;

impl OrderPriority for ArrivalPriority {
    #[inline]
    fn compare(a: &Order, b: &Order) -> Ordering {
        a.id().cmp(&b.id())
    }
}

/// Stop-buy priority: lowest trigger first (cheapest buy dispatches first),
/// then larger share count, then arrival.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopBuyPriority;

impl OrderPriority for StopBuyPriority {
    #[inline]
    fn compare(a: &Order, b: &Order) -> Ordering {
        a.trigger_price()
            .cmp(&b.trigger_price())
            .then_with(|| b.shares().cmp(&a.shares()))
            .then_with(|| a.id().cmp(&b.id()))
    }
}

/// Stop-sell priority: highest trigger first (most profitable sell
/// dispatches first), then larger share count, then arrival.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopSellPriority;

impl OrderPriority for StopSellPriority {
    #[inline]
    fn compare(a: &Order, b: &Order) -> Ordering {
        b.trigger_price()
            .cmp(&a.trigger_price())
            .then_with(|| b.shares().cmp(&a.shares()))
            .then_with(|| a.id().cmp(&b.id()))
    }
}
