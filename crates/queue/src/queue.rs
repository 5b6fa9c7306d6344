//! In-process FIFO task queue with a cooperative drain loop.
//!
//! The queue decouples request handling from slow side effects: callers
//! enqueue a [`Task`] and return immediately, and a single drain loop
//! executes tasks one at a time in enqueue order. Cooperative tasks are
//! awaited on the runtime; blocking tasks go through a fixed-size worker
//! pool so they never stall the loop itself.
//!
//! Nothing is persisted. A process restart abandons whatever was pending.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, warn};

use crate::task::{ExecutionMode, Task, TaskHandler};

/// Sizing knobs for a [`TaskQueue`].
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Worker threads reserved for blocking tasks. Exhaustion makes the
    /// next blocking dispatch wait for a free worker (backpressure).
    pub blocking_workers: usize,
    /// Pending depth at which enqueue logs a warning. The deque itself is
    /// unbounded; sustained overload grows it without limit.
    pub high_water: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            blocking_workers: 4,
            high_water: 10_000,
        }
    }
}

/// Handle to the queue. Cheap to clone; all clones share one pending deque
/// and one drain loop. Constructed once at process startup and passed to
/// whatever needs to enqueue work.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    pending: Mutex<VecDeque<Task>>,
    /// True while a drain loop owns the queue. Arbitration: whoever flips
    /// this false→true runs the loop.
    draining: AtomicBool,
    handler: Arc<dyn TaskHandler>,
    blocking_slots: Arc<Semaphore>,
    /// Published idle/busy state; `true` = idle.
    idle_tx: watch::Sender<bool>,
    /// Kept so the channel stays open with no external subscribers.
    idle_rx: watch::Receiver<bool>,
    high_water: usize,
}

impl TaskQueue {
    pub fn new(handler: Arc<dyn TaskHandler>, config: QueueConfig) -> Self {
        let (idle_tx, idle_rx) = watch::channel(true);
        Self {
            inner: Arc::new(QueueInner {
                pending: Mutex::new(VecDeque::new()),
                draining: AtomicBool::new(false),
                handler,
                blocking_slots: Arc::new(Semaphore::new(config.blocking_workers.max(1))),
                idle_tx,
                idle_rx,
                high_water: config.high_water,
            }),
        }
    }

    /// Append a task to the tail of the pending deque and make sure a drain
    /// loop is running. Returns immediately; the caller never learns the
    /// task's fate (failures show up in logs only).
    pub fn enqueue(&self, task: Task) {
        let depth = {
            let mut pending = self.inner.pending.lock().unwrap();
            pending.push_back(task);
            pending.len()
        };
        if depth == self.inner.high_water {
            warn!(depth, "pending task queue reached high-water mark");
        }
        if !self.inner.draining.swap(true, Ordering::AcqRel) {
            let _ = self.inner.idle_tx.send(false);
            let inner = Arc::clone(&self.inner);
            tokio::spawn(drain_loop(inner));
        }
    }

    /// Run the drain loop on the current task until the queue empties.
    ///
    /// A no-op when the queue is already being drained (including by the
    /// loop spawned from `enqueue`), or when there is nothing pending.
    pub async fn drain(&self) {
        if self.inner.draining.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.inner.idle_tx.send(false);
        drain_loop(Arc::clone(&self.inner)).await;
    }

    /// Wait until the queue is idle with nothing pending.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.idle_rx.clone();
        loop {
            let idle = *rx.borrow_and_update();
            if idle
                && !self.inner.draining.load(Ordering::Acquire)
                && self.inner.pending.lock().unwrap().is_empty()
            {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Number of tasks waiting to run.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().unwrap().len()
    }

    /// Whether a drain loop currently owns the queue.
    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Acquire)
    }
}

/// Pop and execute tasks until the deque is empty, then flip to idle.
async fn drain_loop(inner: Arc<QueueInner>) {
    loop {
        let task = inner.pending.lock().unwrap().pop_front();
        match task {
            Some(task) => inner.execute(task).await,
            None => {
                inner.draining.store(false, Ordering::Release);
                // An enqueue may have pushed between the final pop and the
                // flag flip without spawning (it saw draining=true). Reclaim
                // the loop in that case so the task is not stranded.
                let raced = !inner.pending.lock().unwrap().is_empty();
                if raced && !inner.draining.swap(true, Ordering::AcqRel) {
                    continue;
                }
                let _ = inner.idle_tx.send(true);
                return;
            }
        }
    }
}

impl QueueInner {
    /// Attempt a task exactly once. Failures are logged and swallowed; the
    /// loop proceeds to the next task either way.
    async fn execute(&self, task: Task) {
        let name = task.name();
        debug!(task = name, "executing task");
        let result = match task.execution_mode() {
            ExecutionMode::Cooperative => self.handler.run(task).await,
            ExecutionMode::Blocking => {
                let permit = match Arc::clone(&self.blocking_slots).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        error!(task = name, "worker pool closed, dropping task");
                        return;
                    }
                };
                let handler = Arc::clone(&self.handler);
                let joined = tokio::task::spawn_blocking(move || {
                    let result = handler.run_blocking(task);
                    drop(permit);
                    result
                })
                .await;
                match joined {
                    Ok(result) => result,
                    Err(e) => {
                        error!(task = name, error = %e, "worker thread panicked");
                        return;
                    }
                }
            }
        };
        if let Err(e) = result {
            error!(task = name, error = %e, "task failed");
        }
    }
}
