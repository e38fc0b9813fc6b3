//! Shared worker pool that runs queue drains.
//!
//! One pool is shared by every queue a broker owns. Drains are short-lived:
//! each processes the currently-eligible orders and returns the worker, so
//! no queue can hold a worker indefinitely.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, info};

pub struct WorkerPool {
    runtime: Mutex<Option<Runtime>>,
    handle: Handle,
    accepting: AtomicBool,
}

impl WorkerPool {
    pub fn new(worker_threads: usize) -> std::io::Result<Arc<Self>> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .thread_name("order-dispatch")
            .enable_time()
            .build()?;
        let handle = runtime.handle().clone();

        debug!(worker_threads, "worker pool started");
        Ok(Arc::new(Self {
            runtime: Mutex::new(Some(runtime)),
            handle,
            accepting: AtomicBool::new(true),
        }))
    }

    /// Submits a job for execution. Returns false without running the job if
    /// the pool has been shut down; never blocks the caller.
    pub fn execute<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.accepting.load(Ordering::Acquire) {
            return false;
        }
        self.handle.spawn(async move { job() });
        true
    }

    #[inline]
    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Stops accepting work and waits up to `grace` for in-flight jobs to
    /// finish, then returns regardless. Idempotent.
    ///
    /// Must be called from outside the pool's own workers.
    pub fn shutdown(&self, grace: Duration) {
        self.accepting.store(false, Ordering::Release);
        if let Some(runtime) = self.runtime.lock().take() {
            runtime.shutdown_timeout(grace);
            info!("worker pool shut down");
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("accepting", &self.is_accepting())
            .finish()
    }
}
