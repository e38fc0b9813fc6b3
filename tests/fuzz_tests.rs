//! Fuzzing tests to discover edge cases and ensure system robustness
//!
//! These tests use property-based testing over random order sets. A shut
//! down worker pool keeps the queue from draining on its own, so the tests
//! can step `dequeue` deterministically.

use order_queue::{
    Order, OrderPriority, OrderQueue, Price, Side, StopBuyFilter, StopBuyPriority, StopBuyQueue,
    StopSellFilter, StopSellPriority, StopSellQueue, WorkerPool,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

prop_compose! {
    fn order_spec()(shares in 1u32..1_000, trigger in 1i64..50_000) -> (u32, i64) {
        (shares, trigger)
    }
}

fn idle_pool() -> Arc<WorkerPool> {
    let pool = WorkerPool::new(1).unwrap();
    pool.shutdown(Duration::from_millis(10));
    pool
}

proptest! {
    #[test]
    fn fuzz_stop_buy_queue_drains_in_policy_order(
        specs in prop::collection::vec(order_spec(), 1..50)
    ) {
        let queue: Arc<StopBuyQueue> = OrderQueue::new(
            StopBuyFilter::new(Price::from_cents(100_000)),
            idle_pool(),
        );

        let mut orders = Vec::new();
        for (shares, trigger) in specs {
            let order = Order::stop("acct", "BA", Side::Buy, shares, Price::from_cents(trigger));
            queue.enqueue(order.clone());
            orders.push(order);
        }
        orders.sort_by(StopBuyPriority::compare);

        for expected in &orders {
            let dispatched = queue.dequeue().expect("queue drained early");
            prop_assert_eq!(dispatched.id(), expected.id());
        }
        prop_assert!(queue.dequeue().is_none());
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn fuzz_stop_sell_queue_drains_in_policy_order(
        specs in prop::collection::vec(order_spec(), 1..50)
    ) {
        let queue: Arc<StopSellQueue> = OrderQueue::new(StopSellFilter::new(Price::ZERO), idle_pool());

        let mut orders = Vec::new();
        for (shares, trigger) in specs {
            let order = Order::stop("acct", "BA", Side::Sell, shares, Price::from_cents(trigger));
            queue.enqueue(order.clone());
            orders.push(order);
        }
        orders.sort_by(StopSellPriority::compare);

        for expected in &orders {
            let dispatched = queue.dequeue().expect("queue drained early");
            prop_assert_eq!(dispatched.id(), expected.id());
        }
        prop_assert!(queue.dequeue().is_none());
    }

    #[test]
    fn fuzz_only_eligible_orders_dequeue(
        specs in prop::collection::vec(order_spec(), 1..50),
        threshold in 1i64..50_000,
    ) {
        let threshold = Price::from_cents(threshold);
        let queue: Arc<StopBuyQueue> = OrderQueue::new(StopBuyFilter::new(threshold), idle_pool());

        let mut eligible = 0;
        for (shares, trigger) in specs {
            let trigger = Price::from_cents(trigger);
            if trigger <= threshold {
                eligible += 1;
            }
            queue.enqueue(Order::stop("acct", "BA", Side::Buy, shares, trigger));
        }

        let mut dispatched = 0;
        while let Some(order) = queue.dequeue() {
            prop_assert!(order.trigger_price().expect("stop order") <= threshold);
            dispatched += 1;
        }
        prop_assert_eq!(dispatched, eligible);
    }

    #[test]
    fn fuzz_duplicate_enqueues_collapse(
        specs in prop::collection::vec(order_spec(), 1..30),
        repeats in 2usize..5,
    ) {
        let queue: Arc<StopBuyQueue> = OrderQueue::new(StopBuyFilter::new(Price::ZERO), idle_pool());

        let orders: Vec<Order> = specs
            .into_iter()
            .map(|(shares, trigger)| {
                Order::stop("acct", "BA", Side::Buy, shares, Price::from_cents(trigger))
            })
            .collect();
        for _ in 0..repeats {
            for order in &orders {
                queue.enqueue(order.clone());
            }
        }

        prop_assert_eq!(queue.len(), orders.len());
    }
}
