//! # Task group: a box of no-result units sharing one join counter.
//!
//! [`TaskGroup`] queues units with [`add_task`](TaskGroup::add_task), then starts them all
//! concurrently with [`run`](TaskGroup::run).
//!
//! ## Flow
//! ```text
//! add_task(f1) ─┐
//! add_task(f2) ─┼─► run() ─► spawn_unit(f1) ─┐
//! add_task(f3) ─┘        ├─► spawn_unit(f2) ─┼─► join counter ─► 0 ─► wait() returns
//!                        ├─► spawn_unit(f3) ─┘                    │
//!                        └─► after-all waiter ────────────────────┴─► callback().await
//!                                                                      └─► after_all_done()
//! ```
//!
//! ## Rules
//! - Every queued task is counted **once**: enabling join (via `with_join` or `after_all`)
//!   registers the tasks queued so far, later `add_task` calls register themselves.
//! - `wait()` only guarantees the **tasks** are done; the after-all callback runs
//!   asynchronously and is observed through [`TaskGroupHandle::after_all_done`].
//! - Recovered panics (task or callback) go to the diagnostic sink only.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use taskbox::TaskGroup;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), taskbox::RuntimeError> {
//!     let done = Arc::new(AtomicUsize::new(0));
//!     let mut group = TaskGroup::new().with_recover().with_join();
//!     for _ in 0..3 {
//!         let done = Arc::clone(&done);
//!         group = group.add_task(move || async move {
//!             done.fetch_add(1, Ordering::SeqCst);
//!         });
//!     }
//!
//!     group.run().wait().await?;
//!     assert_eq!(done.load(Ordering::SeqCst), 3);
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{RunnerConfig, join::JoinCounter, run_body, spawn_unit},
    error::RuntimeError,
    events::EventKind,
    subscribers::{LogWriter, Subscribe},
};

/// Type-erased no-result task body.
type UnitFn = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

fn boxed<F, Fut>(f: F) -> UnitFn
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Box::new(move || -> BoxFuture<'static, ()> { Box::pin(f()) })
}

/// Builder for a group of no-result units.
pub struct TaskGroup {
    recover: bool,
    name: Arc<str>,
    sink: Arc<dyn Subscribe>,
    tasks: Vec<UnitFn>,
    after: Option<UnitFn>,
    join: Option<JoinCounter>,
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGroup {
    /// Creates an empty group named `"task"`, reporting to [`LogWriter`].
    pub fn new() -> Self {
        Self {
            recover: false,
            name: Arc::from("task"),
            sink: Arc::new(LogWriter::new()),
            tasks: Vec::new(),
            after: None,
            join: None,
        }
    }

    /// Catches panics of every task (and of the after-all callback).
    pub fn with_recover(mut self) -> Self {
        self.recover = true;
        self
    }

    /// Tracks the group with a join counter so [`TaskGroupHandle::wait`] can be used.
    pub fn with_join(mut self) -> Self {
        self.enable_join();
        self
    }

    /// Prefix for unit labels: the `i`-th task is reported as `"{name}#{i}"`.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the diagnostic sink (default: [`LogWriter`]).
    pub fn with_subscriber(mut self, sink: Arc<dyn Subscribe>) -> Self {
        self.sink = sink;
        self
    }

    /// Takes the flags from `cfg`. Join, once enabled, stays enabled.
    ///
    /// `timeout` is ignored by no-result groups.
    pub fn with_config(mut self, cfg: RunnerConfig) -> Self {
        self.recover = cfg.recover;
        if cfg.join {
            self.enable_join();
        }
        self
    }

    /// Queues a task; registers it with the join counter when join is on.
    pub fn add_task<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push(boxed(f));
        if let Some(join) = &self.join {
            join.add(1);
        }
        self
    }

    /// Sets a callback to run once every task has finished. Forces join on.
    ///
    /// The callback runs on its own background unit, asynchronously with respect to
    /// [`TaskGroupHandle::wait`]. Use [`TaskGroupHandle::after_all_done`] to wait for it.
    /// Setting it again replaces the previous callback.
    pub fn after_all<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.enable_join();
        self.after = Some(boxed(f));
        self
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when no task has been queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawns every queued task (and the after-all waiter) and returns immediately.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn run(self) -> TaskGroupHandle {
        let recover = self.recover;
        let after_done = CancellationToken::new();

        for (idx, task) in self.tasks.into_iter().enumerate() {
            let label: Arc<str> = Arc::from(format!("{}#{idx}", self.name));
            let guard = self.join.as_ref().map(JoinCounter::guard);
            spawn_unit(recover, Some(label), Arc::clone(&self.sink), guard, task);
        }

        match (self.after, &self.join) {
            (Some(callback), Some(join)) => {
                let join = join.clone();
                let done = after_done.clone();
                let sink = Arc::clone(&self.sink);
                let name = Arc::clone(&self.name);
                tokio::spawn(async move {
                    // Released on every exit path, unwinding included.
                    let _done = done.drop_guard();
                    join.wait().await;
                    run_body(recover, Some(&name), &sink, EventKind::CallbackPanicked, callback)
                        .await;
                });
            }
            _ => after_done.cancel(),
        }

        TaskGroupHandle {
            join: self.join,
            after_done,
        }
    }

    fn enable_join(&mut self) {
        if self.join.is_none() {
            let join = JoinCounter::new();
            join.add(self.tasks.len());
            self.join = Some(join);
        }
    }
}

/// Handle to a running task group.
#[derive(Debug, Clone)]
pub struct TaskGroupHandle {
    join: Option<JoinCounter>,
    after_done: CancellationToken,
}

impl TaskGroupHandle {
    /// Waits until every task has finished, whatever its outcome.
    ///
    /// Says nothing about the after-all callback. Returns
    /// [`RuntimeError::WaitWithoutJoin`] when join was never enabled.
    pub async fn wait(&self) -> Result<(), RuntimeError> {
        match &self.join {
            Some(join) => {
                join.wait().await;
                Ok(())
            }
            None => Err(RuntimeError::WaitWithoutJoin),
        }
    }

    /// Resolves once the after-all callback has returned (or panicked).
    ///
    /// Resolves immediately when no callback was set.
    pub async fn after_all_done(&self) {
        self.after_done.cancelled().await;
    }

    /// Number of tasks still running, when join is on.
    pub fn pending(&self) -> Option<usize> {
        self.join.as_ref().map(JoinCounter::pending)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;
    use crate::subscribers::testing::Recorder;

    fn explode() {
        panic!("aaa");
    }

    fn counting(c: Arc<AtomicUsize>) -> impl FnOnce() -> BoxFuture<'static, ()> + Send {
        move || -> BoxFuture<'static, ()> {
            Box::pin(async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn runs_all_tasks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut group = TaskGroup::new().with_join();
        for _ in 0..5 {
            group = group.add_task(counting(counter.clone()));
        }
        assert_eq!(group.len(), 5);

        let handle = group.run();
        handle.wait().await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert_eq!(handle.pending(), Some(0));
    }

    #[tokio::test]
    async fn join_enabled_after_tasks_counts_them() {
        let counter = Arc::new(AtomicUsize::new(0));
        TaskGroup::new()
            .add_task(counting(counter.clone()))
            .add_task(counting(counter.clone()))
            .with_join()
            .add_task(counting(counter.clone()))
            .run()
            .wait()
            .await
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn wait_without_join_is_misuse() {
        let handle = TaskGroup::new().add_task(|| async {}).run();
        assert_eq!(handle.wait().await, Err(RuntimeError::WaitWithoutJoin));
        assert_eq!(handle.pending(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn recovered_panic_does_not_affect_siblings() {
        let rec = Arc::new(Recorder::default());
        let counter = Arc::new(AtomicUsize::new(0));

        TaskGroup::new()
            .with_recover()
            .with_join()
            .with_name("box")
            .with_subscriber(rec.clone())
            .add_task(counting(counter.clone()))
            .add_task(|| async { explode() })
            .add_task(counting(counter.clone()))
            .run()
            .wait()
            .await
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        let events = rec.events.lock().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::UnitPanicked);
        assert_eq!(events[0].task.as_deref(), Some("box#1"));
    }

    #[tokio::test]
    async fn unrecovered_panic_still_counts_down() {
        TaskGroup::new()
            .with_join()
            .add_task(|| async { explode() })
            .run()
            .wait()
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn after_all_runs_once_every_task_is_done() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = oneshot::channel();

        let mut group = TaskGroup::new();
        for i in 0..3u64 {
            let c = Arc::clone(&counter);
            group = group.add_task(move || async move {
                tokio::time::sleep(Duration::from_millis(10 * i)).await;
                c.fetch_add(1, Ordering::SeqCst);
            });
        }

        let seen = Arc::clone(&counter);
        let handle = group
            .after_all(move || async move {
                let _ = tx.send(seen.load(Ordering::SeqCst));
            })
            .run();

        // Observed at callback start: every decrement has happened.
        assert_eq!(rx.await.unwrap(), 3);
        handle.wait().await.unwrap();
        handle.after_all_done().await;
    }

    #[tokio::test]
    async fn after_all_does_not_double_count() {
        let handle = TaskGroup::new()
            .with_join()
            .add_task(|| async {})
            .add_task(|| async {})
            .after_all(|| async {})
            .run();

        // With double registration this would never drain.
        tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("join counter drains")
            .unwrap();
        handle.after_all_done().await;
    }

    #[tokio::test]
    async fn after_all_with_no_tasks_fires() {
        let called = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&called);
        let handle = TaskGroup::new()
            .after_all(move || async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .run();

        handle.after_all_done().await;
        assert_eq!(called.load(Ordering::SeqCst), 1);
        assert!(handle.wait().await.is_ok());
    }

    #[tokio::test]
    async fn after_all_done_is_immediate_without_callback() {
        let handle = TaskGroup::new().with_join().run();
        handle.after_all_done().await;
        handle.wait().await.unwrap();
    }

    #[tokio::test]
    async fn panicking_callback_is_reported_and_released() {
        let rec = Arc::new(Recorder::default());
        let handle = TaskGroup::new()
            .with_recover()
            .with_name("box")
            .with_subscriber(rec.clone())
            .add_task(|| async {})
            .after_all(|| async { explode() })
            .run();

        handle.after_all_done().await;
        assert_eq!(rec.count(EventKind::CallbackPanicked).await, 1);
        let events = rec.events.lock().await;
        assert_eq!(events[0].task.as_deref(), Some("box"));
    }

    #[tokio::test]
    async fn unrecovered_callback_panic_still_releases_latch() {
        let handle = TaskGroup::new().after_all(|| async { explode() }).run();
        handle.after_all_done().await;
    }

    #[tokio::test]
    async fn config_enables_recovery_and_join() {
        let rec = Arc::new(Recorder::default());
        let cfg = RunnerConfig {
            recover: true,
            join: true,
            timeout: Duration::from_secs(1),
        };

        let handle = TaskGroup::new()
            .with_name("cfg")
            .with_subscriber(rec.clone())
            .add_task(|| async { explode() })
            .with_config(cfg)
            .add_task(|| async {})
            .run();

        handle.wait().await.unwrap();
        assert_eq!(handle.pending(), Some(0));
        assert_eq!(rec.count(EventKind::UnitPanicked).await, 1);
    }
}
