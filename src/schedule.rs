//! Page-scoped task scheduling
//!
//! Every timed effect runs as a tokio task owned by a [`PageScope`]. Closing
//! or dropping the scope cancels all of its tasks, which is how a page
//! teardown stops the ambient loops. Individual tasks can be stopped through
//! their [`TaskHandle`].
//!
//! Spawning requires a tokio runtime.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Owner of a set of cancellable tasks.
#[derive(Debug, Default)]
pub struct PageScope {
    cancel: CancellationToken,
}

impl PageScope {
    /// Creates an open scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a nested scope that closes when this one does.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
        }
    }

    /// Returns whether the scope has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancels every task spawned under this scope and its children.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Runs `fut` until it completes or the scope closes.
    pub fn spawn<F>(&self, fut: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.child_token();
        let token = cancel.clone();
        let join = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => trace!("scoped task cancelled"),
                () = fut => {}
            }
        });
        TaskHandle { cancel, join }
    }

    /// Runs `f` once after `delay`.
    pub fn spawn_after<F>(&self, delay: Duration, f: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        })
    }

    /// Runs `f` every `period`, first after one full period.
    ///
    /// Each run re-arms after the fixed delay; late ticks push the schedule
    /// back instead of bursting. `period` must be non-zero; a zero period
    /// kills the task on its first tick.
    pub fn spawn_repeating<F>(&self, period: Duration, mut f: F) -> TaskHandle
    where
        F: FnMut() + Send + 'static,
    {
        self.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                f();
            }
        })
    }
}

impl Drop for PageScope {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Handle to a scoped task.
#[derive(Debug)]
pub struct TaskHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Stops the task. Stopping a finished task is a no-op.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Returns whether the task has finished or been stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the task to end.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}
