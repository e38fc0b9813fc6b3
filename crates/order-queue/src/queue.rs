//! Concurrent priority order queue with filtered, single-flight dispatch.
//!
//! Clients enqueue from any thread; a drain job on the shared worker pool
//! hands eligible orders to the processor in priority order. At most one
//! drain per queue runs at a time, and an enqueue or threshold change always
//! results in a drain observing the queue afterwards (no lost wake-ups).

use crate::filter::{DispatchFilter, MarketFilter, StopBuyFilter, StopSellFilter};
use crate::pool::WorkerPool;
use crate::priority::{ArrivalPriority, OrderPriority, StopBuyPriority, StopSellPriority};
use crate::processor::OrderProcessor;
use crate::types::Order;
use parking_lot::{Mutex, RwLock};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, warn};

/// Pending-set element: an order ranked by the queue's priority policy.
/// Policies tie-break on the unique order id, so two entries compare equal
/// exactly when they hold the same order — inserting an order that is
/// already pending is a no-op.
struct Ranked<P> {
    order: Order,
    _priority: PhantomData<P>,
}

impl<P: OrderPriority> Ranked<P> {
    #[inline]
    fn new(order: Order) -> Self {
        Self {
            order,
            _priority: PhantomData,
        }
    }
}

impl<P: OrderPriority> PartialEq for Ranked<P> {
    fn eq(&self, other: &Self) -> bool {
        P::compare(&self.order, &other.order) == CmpOrdering::Equal
    }
}

impl<P: OrderPriority> Eq for Ranked<P> {}

impl<P: OrderPriority> PartialOrd for Ranked<P> {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl<P: OrderPriority> Ord for Ranked<P> {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        P::compare(&self.order, &other.order)
    }
}

pub struct OrderQueue<P: OrderPriority, F: DispatchFilter> {
    pending: Mutex<BTreeSet<Ranked<P>>>,
    filter: F,
    processor: RwLock<Option<Arc<dyn OrderProcessor>>>,
    scheduled: AtomicBool,
    pool: Arc<WorkerPool>,
    // Handle to this queue for drain jobs; set once at construction.
    this: Weak<Self>,
}

pub type MarketOrderQueue = OrderQueue<ArrivalPriority, MarketFilter>;
pub type StopBuyQueue = OrderQueue<StopBuyPriority, StopBuyFilter>;
pub type StopSellQueue = OrderQueue<StopSellPriority, StopSellFilter>;

impl<P: OrderPriority, F: DispatchFilter> OrderQueue<P, F> {
    pub fn new(filter: F, pool: Arc<WorkerPool>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            pending: Mutex::new(BTreeSet::new()),
            filter,
            processor: RwLock::new(None),
            scheduled: AtomicBool::new(false),
            pool,
            this: this.clone(),
        })
    }

    /// Adds the order unless it is already pending, then triggers dispatch.
    /// Returns after scheduling; never waits for processing.
    pub fn enqueue(&self, order: Order) {
        {
            let mut pending = self.pending.lock();
            if !pending.insert(Ranked::new(order)) {
                debug!("duplicate enqueue ignored");
            }
        }
        self.dispatch_orders();
    }

    /// Removes and returns the highest-priority order if the filter lets it
    /// dispatch. Peek, filter check, and removal are one critical section.
    pub fn dequeue(&self) -> Option<Order> {
        let mut pending = self.pending.lock();
        let dispatchable = pending
            .first()
            .map_or(false, |head| self.filter.check(&head.order));
        if dispatchable {
            pending.pop_first().map(|ranked| ranked.order)
        } else {
            None
        }
    }

    /// Schedules the drain onto the worker pool unless one is already
    /// scheduled or running.
    pub fn dispatch_orders(&self) {
        if self
            .scheduled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let Some(queue) = self.this.upgrade() else {
                self.scheduled.store(false, Ordering::Release);
                return;
            };
            if !self.pool.execute(move || queue.drain()) {
                self.scheduled.store(false, Ordering::Release);
                warn!("worker pool is shut down, drain not scheduled");
            }
        }
    }

    /// Replaces the processor dispatched orders are handed to. With `None`,
    /// dispatched orders are dropped (teardown only).
    pub fn set_order_processor(&self, processor: Option<Arc<dyn OrderProcessor>>) {
        *self.processor.write() = processor;
    }

    /// Updates the filter threshold and re-triggers dispatch so orders that
    /// just became eligible are picked up promptly.
    pub fn set_threshold(&self, value: F::Threshold) {
        self.filter.set_threshold(value);
        self.dispatch_orders();
    }

    #[inline]
    pub fn filter(&self) -> &F {
        &self.filter
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    fn head_dispatchable(&self) -> bool {
        let pending = self.pending.lock();
        pending
            .first()
            .map_or(false, |head| self.filter.check(&head.order))
    }

    /// Drain loop, run on a pool worker. Processes eligible orders until the
    /// queue is exhausted, then clears the single-flight flag. The re-check
    /// afterwards catches an enqueue that raced with the flag clear: either
    /// this drain re-claims the flag and keeps going, or the racing enqueue
    /// won the flag and scheduled its own drain.
    fn drain(&self) {
        loop {
            while let Some(order) = self.dequeue() {
                let processor = self.processor.read().clone();
                match processor {
                    Some(processor) => {
                        let id = order.id();
                        if let Err(err) = processor.process(order) {
                            error!(order = %id, "order processing failed: {err:#}");
                        }
                    }
                    None => debug!(order = %order.id(), "no processor registered, order dropped"),
                }
            }
            self.scheduled.store(false, Ordering::Release);
            if !self.head_dispatchable() {
                break;
            }
            if self
                .scheduled
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                break;
            }
        }
    }
}

impl<P: OrderPriority, F: DispatchFilter + std::fmt::Debug> std::fmt::Debug for OrderQueue<P, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderQueue")
            .field("pending", &self.len())
            .field("filter", &self.filter)
            .finish()
    }
}
