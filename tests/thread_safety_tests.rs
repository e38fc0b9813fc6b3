//! Thread safety validation tests for the order dispatch core
//!
//! These tests verify queue behavior under concurrent enqueue and
//! threshold changes: every order dispatched exactly once, none lost.

use anyhow::anyhow;
use crossbeam_channel::{unbounded, Receiver, Sender};
use order_queue::{
    MarketFilter, MarketOrderQueue, Order, OrderId, OrderProcessor, OrderQueue, Price, Side,
    StopBuyFilter, StopBuyQueue, WorkerPool,
};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const QUIET_PERIOD: Duration = Duration::from_millis(200);

struct RecordingProcessor {
    tx: Sender<OrderId>,
}

impl OrderProcessor for RecordingProcessor {
    fn process(&self, order: Order) -> anyhow::Result<()> {
        self.tx
            .send(order.id())
            .map_err(|e| anyhow!("send failed: {e}"))
    }
}

fn recording() -> (Arc<RecordingProcessor>, Receiver<OrderId>) {
    let (tx, rx) = unbounded();
    (Arc::new(RecordingProcessor { tx }), rx)
}

fn collect_exactly(rx: &Receiver<OrderId>, expected: usize) -> HashSet<OrderId> {
    let mut seen = HashSet::new();
    for _ in 0..expected {
        let id = rx
            .recv_timeout(RECV_TIMEOUT)
            .expect("dispatch stalled before all orders arrived");
        assert!(seen.insert(id), "order {id} dispatched twice");
    }
    assert!(
        rx.recv_timeout(QUIET_PERIOD).is_err(),
        "more dispatches than orders enqueued"
    );
    seen
}

#[test]
fn test_concurrent_enqueue_then_open_dispatches_each_once() {
    let num_threads = 8;
    let orders_per_thread = 250;

    let pool = WorkerPool::new(8).unwrap();
    let queue: Arc<MarketOrderQueue> =
        OrderQueue::new(MarketFilter::new(false), Arc::clone(&pool));
    let (processor, rx) = recording();
    queue.set_order_processor(Some(processor));

    let barrier = Arc::new(Barrier::new(num_threads));
    let mut handles = Vec::new();
    for _ in 0..num_threads {
        let queue = Arc::clone(&queue);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..orders_per_thread {
                queue.enqueue(Order::market("acct", "BA", Side::Buy, 1));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    queue.set_threshold(true);

    let seen = collect_exactly(&rx, num_threads * orders_per_thread);
    assert_eq!(seen.len(), num_threads * orders_per_thread);
    assert!(queue.is_empty());
    pool.shutdown(Duration::from_millis(200));
}

#[test]
fn test_concurrent_enqueue_while_open() {
    let num_threads = 8;
    let orders_per_thread = 250;

    let pool = WorkerPool::new(8).unwrap();
    let queue: Arc<MarketOrderQueue> =
        OrderQueue::new(MarketFilter::new(true), Arc::clone(&pool));
    let (processor, rx) = recording();
    queue.set_order_processor(Some(processor));

    let barrier = Arc::new(Barrier::new(num_threads));
    let mut handles = Vec::new();
    for _ in 0..num_threads {
        let queue = Arc::clone(&queue);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..orders_per_thread {
                queue.enqueue(Order::market("acct", "BA", Side::Buy, 1));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    collect_exactly(&rx, num_threads * orders_per_thread);
    assert!(queue.is_empty());
    pool.shutdown(Duration::from_millis(200));
}

#[test]
fn test_concurrent_duplicate_enqueue_dispatches_once_per_order() {
    let num_threads = 8;
    let distinct_orders = 100;

    let pool = WorkerPool::new(8).unwrap();
    let queue: Arc<MarketOrderQueue> =
        OrderQueue::new(MarketFilter::new(false), Arc::clone(&pool));
    let (processor, rx) = recording();
    queue.set_order_processor(Some(processor));

    let orders: Vec<Order> = (0..distinct_orders)
        .map(|_| Order::market("acct", "BA", Side::Buy, 1))
        .collect();

    // Every thread enqueues the same hundred orders.
    let barrier = Arc::new(Barrier::new(num_threads));
    let mut handles = Vec::new();
    for _ in 0..num_threads {
        let queue = Arc::clone(&queue);
        let barrier = Arc::clone(&barrier);
        let orders = orders.clone();
        handles.push(thread::spawn(move || {
            barrier.wait();
            for order in orders {
                queue.enqueue(order);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    queue.set_threshold(true);

    let seen = collect_exactly(&rx, distinct_orders);
    let expected: HashSet<OrderId> = orders.iter().map(|o| o.id()).collect();
    assert_eq!(seen, expected);
    pool.shutdown(Duration::from_millis(200));
}

#[test]
fn test_enqueue_races_with_threshold_changes() {
    let num_threads = 4;
    let orders_per_thread = 200;

    let pool = WorkerPool::new(8).unwrap();
    let queue: Arc<StopBuyQueue> =
        OrderQueue::new(StopBuyFilter::new(Price::ZERO), Arc::clone(&pool));
    let (processor, rx) = recording();
    queue.set_order_processor(Some(processor));

    let barrier = Arc::new(Barrier::new(num_threads + 1));
    let mut handles = Vec::new();
    for thread_id in 0..num_threads {
        let queue = Arc::clone(&queue);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..orders_per_thread {
                let trigger =
                    Price::from_cents(((thread_id * orders_per_thread + i) % 500) as i64 + 1);
                queue.enqueue(Order::stop("acct", "BA", Side::Buy, 1, trigger));
            }
        }));
    }

    // A competing thread sweeps the threshold up and down while orders land.
    {
        let queue = Arc::clone(&queue);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for sweep in 0..50 {
                let cents = if sweep % 2 == 0 { 250 } else { 0 };
                queue.set_threshold(Price::from_cents(cents));
                thread::sleep(Duration::from_millis(1));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // A final threshold above every trigger releases whatever remains.
    queue.set_threshold(Price::from_cents(1_000));

    collect_exactly(&rx, num_threads * orders_per_thread);
    assert!(queue.is_empty());
    pool.shutdown(Duration::from_millis(200));
}
