//! # Unit runner: one fire-and-forget unit of work.
//!
//! [`UnitRunner`] spawns a single tokio task that produces no value and returns a
//! [`UnitHandle`] immediately.
//!
//! - **Join** (optional): the unit is registered before spawn and decremented on completion
//! - **Recover** (optional): a panic is caught, formatted with a backtrace and handed to the
//!   diagnostic sink ([`Subscribe`]); it never reaches the caller
//!
//! ## Flow
//! ```text
//! spawn(f) ──► [join.add(1)] ──► tokio::spawn ──► f().await
//!                                      │             │
//!                                      │      Ok  ───┤
//!                                      │      panic ─┼─ recover  ─► sink.on_event(UnitPanicked)
//!                                      │             └─ !recover ─► unwinds the tokio task
//!                                      ▼
//!                                guard dropped ─► join counter −1
//! ```
//!
//! ## Example
//! ```rust
//! use taskbox::UnitRunner;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), taskbox::RuntimeError> {
//!     UnitRunner::new()
//!         .with_recover()
//!         .with_join()
//!         .spawn(|| async { println!("hello from a unit") })
//!         .wait()
//!         .await
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::{
    core::{RunnerConfig, join::JoinCounter, join::JoinGuard, recover::catch},
    error::RuntimeError,
    events::{Event, EventKind},
    subscribers::{LogWriter, Subscribe, deliver},
};

/// Builder for a single no-result unit.
pub struct UnitRunner {
    cfg: RunnerConfig,
    name: Option<Arc<str>>,
    sink: Arc<dyn Subscribe>,
}

impl Default for UnitRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRunner {
    /// Creates a runner with recovery and join disabled, reporting to [`LogWriter`].
    pub fn new() -> Self {
        Self {
            cfg: RunnerConfig::default(),
            name: None,
            sink: Arc::new(LogWriter::new()),
        }
    }

    /// Catches a panic of the unit and reports it to the diagnostic sink.
    pub fn with_recover(mut self) -> Self {
        self.cfg.recover = true;
        self
    }

    /// Tracks the unit with a join counter so [`UnitHandle::wait`] can be used.
    pub fn with_join(mut self) -> Self {
        self.cfg.join = true;
        self
    }

    /// Labels the unit in diagnostic events.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the diagnostic sink (default: [`LogWriter`]).
    pub fn with_subscriber(mut self, sink: Arc<dyn Subscribe>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces all flags at once. `timeout` is ignored by no-result units.
    pub fn with_config(mut self, cfg: RunnerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Starts `f` on the runtime and returns without waiting for it.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn spawn<F, Fut>(self, f: F) -> UnitHandle
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let join = self.cfg.join.then(|| {
            let counter = JoinCounter::new();
            counter.add(1);
            counter
        });
        let guard = join.as_ref().map(JoinCounter::guard);
        spawn_unit(self.cfg.recover, self.name, self.sink, guard, f);

        UnitHandle { join }
    }
}

/// Handle to a spawned no-result unit.
#[derive(Debug, Clone)]
pub struct UnitHandle {
    join: Option<JoinCounter>,
}

impl UnitHandle {
    /// Waits until the unit has finished, whatever its outcome.
    ///
    /// Returns [`RuntimeError::WaitWithoutJoin`] when the runner was not built with
    /// [`UnitRunner::with_join`].
    pub async fn wait(&self) -> Result<(), RuntimeError> {
        match &self.join {
            Some(join) => {
                join.wait().await;
                Ok(())
            }
            None => Err(RuntimeError::WaitWithoutJoin),
        }
    }

    /// True when join tracking is on.
    pub fn is_joinable(&self) -> bool {
        self.join.is_some()
    }
}

/// Spawns one no-result unit; shared by [`UnitRunner`] and the task group.
///
/// The guard is held until the body and any diagnostic delivery are done.
pub(crate) fn spawn_unit<F, Fut>(
    recover: bool,
    label: Option<Arc<str>>,
    sink: Arc<dyn Subscribe>,
    guard: Option<JoinGuard>,
    f: F,
) where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let _guard = guard;
        run_body(recover, label.as_ref(), &sink, EventKind::UnitPanicked, f).await;
    });
}

/// Runs a no-result body, reporting a recovered panic as an event of `kind`.
pub(crate) async fn run_body<F, Fut>(
    recover: bool,
    label: Option<&Arc<str>>,
    sink: &Arc<dyn Subscribe>,
    kind: EventKind,
    f: F,
) where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    if !recover {
        f().await;
        return;
    }
    if let Err(err) = catch(async move { f().await }).await {
        deliver(sink, Event::panicked(kind, label, &err)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::subscribers::testing::Recorder;

    fn explode() {
        panic!("aaa");
    }

    #[tokio::test]
    async fn runs_and_joins() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);

        UnitRunner::new()
            .with_join()
            .spawn(move || async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .wait()
            .await
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn wait_without_join_is_misuse() {
        let handle = UnitRunner::new().spawn(|| async {});
        assert!(!handle.is_joinable());
        assert_eq!(handle.wait().await, Err(RuntimeError::WaitWithoutJoin));
    }

    #[tokio::test]
    async fn recovered_panic_goes_to_sink() {
        let rec = Arc::new(Recorder::default());

        UnitRunner::new()
            .with_recover()
            .with_join()
            .with_name("cat")
            .with_subscriber(rec.clone())
            .spawn(|| async { explode() })
            .wait()
            .await
            .unwrap();

        let events = rec.events.lock().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::UnitPanicked);
        assert_eq!(events[0].task.as_deref(), Some("cat"));
        assert_eq!(events[0].error.as_deref(), Some("recovered from panic: aaa"));
        assert!(events[0].trace.is_some());
    }

    #[tokio::test]
    async fn unrecovered_panic_still_releases_join() {
        let rec = Arc::new(Recorder::default());

        UnitRunner::new()
            .with_join()
            .with_subscriber(rec.clone())
            .spawn(|| async { explode() })
            .wait()
            .await
            .unwrap();

        assert!(rec.events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn panicking_sink_is_contained() {
        struct Broken;

        #[async_trait]
        impl Subscribe for Broken {
            async fn on_event(&self, _event: &Event) {
                panic!("sink is broken");
            }
        }

        UnitRunner::new()
            .with_recover()
            .with_join()
            .with_subscriber(Arc::new(Broken))
            .spawn(|| async { explode() })
            .wait()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn config_enables_flags() {
        let cfg = RunnerConfig {
            recover: true,
            join: true,
            ..RunnerConfig::default()
        };
        let handle = UnitRunner::new()
            .with_config(cfg)
            .with_subscriber(Arc::new(Recorder::default()))
            .spawn(|| async { explode() });
        assert!(handle.is_joinable());
        handle.wait().await.unwrap();
    }
}
