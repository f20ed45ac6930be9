//! Background task that keeps the cache warm.
//!
//! The task runs the refresh engine on a fixed period. It owns a liveness
//! flag that is cleared when the task ends for any reason, including a
//! panicking cycle; readers use it to restart the task on demand.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::engine::RefreshEngine;

/// Shortest accepted period; `tokio::time::interval` rejects zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Clears the liveness flag when the task's future is dropped.
struct AliveGuard(Arc<AtomicBool>);

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct RefreshTask {
    handle: JoinHandle<()>,
    alive: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
}

impl RefreshTask {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

/// Supervised periodic refresh.
pub struct BackgroundRefresher {
    engine: Arc<RefreshEngine>,
    period: Duration,
    task: Mutex<Option<RefreshTask>>,
    spawned: AtomicU64,
}

impl BackgroundRefresher {
    /// Create a refresher. Nothing runs until [`start`](Self::start).
    pub fn new(engine: Arc<RefreshEngine>, period: Duration) -> Self {
        Self {
            engine,
            period: period.max(MIN_PERIOD),
            task: Mutex::new(None),
            spawned: AtomicU64::new(0),
        }
    }

    /// Start the periodic task if it is not already running.
    ///
    /// The first cycle runs one period from now; callers refresh once
    /// synchronously at startup.
    pub fn start(&self) {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(RefreshTask::is_alive) {
            return;
        }
        *slot = Some(self.spawn());
    }

    /// Whether the periodic task is running.
    pub fn is_alive(&self) -> bool {
        self.lock().as_ref().is_some_and(RefreshTask::is_alive)
    }

    /// Restart the task if it was started and has since died.
    ///
    /// Returns `true` only if a new task was spawned. Concurrent callers are
    /// serialized, so at most one of them restarts.
    pub fn restart_if_dead(&self) -> bool {
        let mut slot = self.lock();
        let dead = slot.as_ref().is_some_and(|task| !task.is_alive());
        if !dead {
            return false;
        }

        tracing::warn!(
            restarts = self.spawn_count(),
            "background refresher died, restarting"
        );
        *slot = Some(self.spawn());
        true
    }

    /// Stop the task. A stopped refresher is not restarted by
    /// [`restart_if_dead`](Self::restart_if_dead).
    pub fn shutdown(&self) {
        if let Some(task) = self.lock().take() {
            task.shutdown.notify_one();
            task.handle.abort();
        }
    }

    /// Number of tasks spawned over the refresher's lifetime.
    pub fn spawn_count(&self) -> u64 {
        self.spawned.load(Ordering::SeqCst)
    }

    fn spawn(&self) -> RefreshTask {
        let alive = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(Notify::new());
        let guard = AliveGuard(Arc::clone(&alive));
        let engine = Arc::clone(&self.engine);
        let stop = Arc::clone(&shutdown);
        let period = self.period;

        let handle = tokio::spawn(async move {
            let _guard = guard;
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval.tick().await; // First tick is immediate, skip it

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        engine.refresh().await;
                    }
                    _ = stop.notified() => break,
                }
            }
        });

        self.spawned.fetch_add(1, Ordering::SeqCst);
        RefreshTask {
            handle,
            alive,
            shutdown,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<RefreshTask>> {
        // The slot is only ever replaced wholesale, so a poisoned lock still
        // holds a consistent value.
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub(crate) fn kill(&self) {
        if let Some(task) = self.lock().as_ref() {
            task.handle.abort();
        }
    }
}

impl Drop for BackgroundRefresher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
