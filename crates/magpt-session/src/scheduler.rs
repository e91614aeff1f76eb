//! Cancellable scheduled tasks
//!
//! Retries, the reconnect ticker and notice dismissal all go through
//! [`Scheduler`] so they can be cancelled, and so tests can drive them with
//! tokio's paused clock instead of waiting on the wall clock.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Body of a scheduled task
pub type TaskFuture = BoxFuture<'static, ()>;

/// Factory producing one run of a repeating task
pub type RepeatingTask = Box<dyn Fn() -> TaskFuture + Send + Sync>;

/// Runs work later, with a handle to cancel it
pub trait Scheduler: Send + Sync {
    /// Run `task` once after `delay` unless cancelled first
    fn schedule(&self, delay: Duration, task: TaskFuture) -> TaskHandle;

    /// Run `task` every `period` (first run after one period) until cancelled
    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TaskHandle;
}

/// Handle to a scheduled task
#[derive(Debug, Clone)]
pub struct TaskHandle {
    token: CancellationToken,
}

impl TaskHandle {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Stop the task from running (again). A run already in progress finishes.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`cancel`](Self::cancel) was called
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Scheduler backed by tokio timers
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: TaskFuture) -> TaskHandle {
        let handle = TaskHandle::new();
        let token = handle.token.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => task.await,
            }
        });

        handle
    }

    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TaskHandle {
        let handle = TaskHandle::new();
        let token = handle.token.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => task().await,
                }
            }
        });

        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_task(counter: &Arc<AtomicUsize>) -> TaskFuture {
        let counter = counter.clone();
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_runs_after_delay() {
        let scheduler = TokioScheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(Duration::from_secs(10), counting_task(&runs));

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_never_runs() {
        let scheduler = TokioScheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.schedule(Duration::from_secs(10), counting_task(&runs));
        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.cancel();
        assert!(handle.is_cancelled());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeating_task_until_cancelled() {
        let scheduler = TokioScheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        let handle = scheduler.schedule_repeating(
            Duration::from_secs(30),
            Box::new(move || counting_task(&counter)),
        );

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(62)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
