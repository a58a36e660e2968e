//! # Result task group: many result-producing units, one conduit.
//!
//! [`ResultTaskGroup`] queues units that each report a [`TaskResult`], starts them all
//! with [`run`](ResultTaskGroup::run) and hands back a single [`Conduit`] carrying every
//! result.
//!
//! ## Architecture
//! ```text
//! add_task(f1..fN) ──► join.add(1) per task
//!
//! run():
//!   mpsc::channel(N) ──► tx.clone() ──► unit 1 ── send ──┐
//!        │               tx.clone() ──► unit 2 ── send ──┼──► Conduit (rx) ──► caller
//!        │               tx.clone() ──► unit N ── send ──┘
//!        │                                   │ drop(tx clone), then guard −1
//!        └── tx ──► coordinator: join.wait() ─► drop(tx) ─► channel closed (exactly once)
//! ```
//!
//! ## Rules
//! - Capacity equals the task count, so no unit ever waits on a slow consumer.
//! - Only the coordinator closes the conduit, and only after the join counter drains.
//! - Completion order on the conduit is race-determined, not submission order.
//! - With recovery, every task yields exactly one result. Without it, a panicking
//!   task yields none; the conduit still closes after it has unwound.
//!
//! ## Example
//! ```rust
//! use taskbox::{ResultTaskGroup, TaskError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut results = ResultTaskGroup::<String>::new()
//!         .with_recover()
//!         .add_task(|| async { Ok("1".to_string()) })
//!         .add_task(|| async { Ok("2".to_string()) })
//!         .add_task(|| async { Err(TaskError::fail("Houston, we have a problem")) })
//!         .run();
//!
//!     let mut seen = 0;
//!     // Closed after all tasks are done.
//!     while let Some(res) = results.recv().await {
//!         println!("{res:?}");
//!         seen += 1;
//!     }
//!     assert_eq!(seen, 3);
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::{
    core::{Conduit, RunnerConfig, join::JoinCounter, spawn_result_unit},
    error::TaskResult,
    subscribers::Subscribe,
};

/// Type-erased result-producing task body.
type ResultFn<T> = Box<dyn FnOnce() -> BoxFuture<'static, TaskResult<T>> + Send>;

/// Builder for a group of result-producing units.
pub struct ResultTaskGroup<T> {
    recover: bool,
    name: Option<Arc<str>>,
    sink: Option<Arc<dyn Subscribe>>,
    tasks: Vec<ResultFn<T>>,
    join: JoinCounter,
}

impl<T: Send + 'static> Default for ResultTaskGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> ResultTaskGroup<T> {
    /// Creates an empty group with recovery disabled and no diagnostic sink.
    pub fn new() -> Self {
        Self {
            recover: false,
            name: None,
            sink: None,
            tasks: Vec::new(),
            join: JoinCounter::new(),
        }
    }

    /// Converts a panic of any task into `Err(TaskError::Panicked { .. })` on the conduit.
    pub fn with_recover(mut self) -> Self {
        self.recover = true;
        self
    }

    /// Takes the flags from `cfg`.
    ///
    /// Only `recover` applies: a result group always joins, and has no waiter to time out.
    pub fn with_config(mut self, cfg: RunnerConfig) -> Self {
        self.recover = cfg.recover;
        self
    }

    /// Prefix for unit labels in diagnostic events: `"{name}#{i}"`.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Also reports recovered panics to `sink`.
    pub fn with_subscriber(mut self, sink: Arc<dyn Subscribe>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Queues a task and registers one expected completion.
    pub fn add_task<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult<T>> + Send + 'static,
    {
        self.tasks
            .push(Box::new(move || -> BoxFuture<'static, TaskResult<T>> { Box::pin(f()) }));
        self.join.add(1);
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

    /// Spawns every queued task plus the closing coordinator, and returns the conduit.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn run(self) -> Conduit<T> {
        // tokio rejects zero-capacity channels; an empty group closes straight away.
        let (tx, rx) = mpsc::channel(self.tasks.len().max(1));

        for (idx, task) in self.tasks.into_iter().enumerate() {
            let label = self
                .name
                .as_ref()
                .map(|name| Arc::<str>::from(format!("{name}#{idx}")));
            spawn_result_unit(
                self.recover,
                label,
                self.sink.clone(),
                tx.clone(),
                Some(self.join.guard()),
                task,
            );
        }

        let join = self.join;
        tokio::spawn(async move {
            join.wait().await;
            drop(tx);
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::sync::oneshot;

    use super::*;
    use crate::error::TaskError;
    use crate::events::EventKind;
    use crate::subscribers::testing::Recorder;

    fn explode() -> TaskResult<u32> {
        panic!("aaaaa")
    }

    async fn drain<T>(mut rx: Conduit<T>) -> Vec<TaskResult<T>> {
        let mut out = Vec::new();
        while let Some(res) = rx.recv().await {
            out.push(res);
        }
        out
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn yields_exactly_n_results_then_closes() {
        for n in [0usize, 1, 2, 7, 32] {
            let mut group = ResultTaskGroup::new();
            for i in 0..n {
                group = group.add_task(move || async move {
                    tokio::time::sleep(Duration::from_millis((n - i) as u64)).await;
                    Ok(i)
                });
            }
            assert_eq!(group.len(), n);

            let mut got: Vec<usize> = drain(group.run())
                .await
                .into_iter()
                .map(|r| r.unwrap())
                .collect();
            got.sort_unstable();
            assert_eq!(got, (0..n).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn empty_group_closes_immediately() {
        let group = ResultTaskGroup::<u32>::new();
        assert!(group.is_empty());
        let mut rx = group.run();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn mixed_outcomes_with_recover() {
        let rec = Arc::new(Recorder::default());
        let results = drain(
            ResultTaskGroup::new()
                .with_recover()
                .with_name("mix")
                .with_subscriber(rec.clone())
                .add_task(|| async { Ok(1u32) })
                .add_task(|| async { Err(TaskError::fail("Houston, we have a problem")) })
                .add_task(|| async { explode() })
                .add_task(|| async { Ok(2u32) })
                .run(),
        )
        .await;

        assert_eq!(results.len(), 4);
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let app = results
            .iter()
            .filter(|r| matches!(r, Err(TaskError::Fail { .. })))
            .count();
        let panicked = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_panic()))
            .count();
        assert_eq!((ok, app, panicked), (2, 1, 1));
        assert_eq!(rec.count(EventKind::UnitPanicked).await, 1);
        let events = rec.events.lock().await;
        assert_eq!(events[0].task.as_deref(), Some("mix#2"));
    }

    #[tokio::test]
    async fn unrecovered_panic_yields_no_result_but_closes() {
        let results = drain(
            ResultTaskGroup::new()
                .add_task(|| async { Ok(1u32) })
                .add_task(|| async { explode() })
                .run(),
        )
        .await;

        assert_eq!(results, vec![Ok(1)]);
    }

    #[tokio::test]
    async fn stays_open_while_a_producer_is_pending() {
        let (gate_tx, gate_rx) = oneshot::channel::<()>();

        let mut rx = ResultTaskGroup::new()
            .add_task(|| async { Ok(1u32) })
            .add_task(move || async move {
                let _ = gate_rx.await;
                Ok(2u32)
            })
            .run();

        assert_eq!(rx.recv().await, Some(Ok(1)));
        // Let the coordinator and the finished unit run; the gated one still holds its count.
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        gate_tx.send(()).unwrap();
        assert_eq!(rx.recv().await, Some(Ok(2)));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn config_turns_on_recovery() {
        let cfg = RunnerConfig {
            recover: true,
            ..RunnerConfig::default()
        };
        let results = drain(
            ResultTaskGroup::new()
                .with_config(cfg)
                .add_task(|| async { explode() })
                .run(),
        )
        .await;

        assert_eq!(results.len(), 1);
        assert!(results[0].as_ref().unwrap_err().is_panic());
    }
}
