//! # Result runner: one unit of work that reports a [`TaskResult`].
//!
//! [`ResultRunner`] spawns a single tokio task whose outcome is written into a
//! capacity-1 slot, and returns a [`ResultHandle`] for blocking-style
//! ([`wait`](ResultHandle::wait)) or channel-style ([`wait_async`](ResultHandle::wait_async))
//! observation.
//!
//! ## Timeout semantics
//! A timeout only changes what the **waiter** observes:
//! ```text
//! unit:    ├──────── f().await ────────────────────┤──► slot (late write, never blocks)
//! waiter:  ├──── timeout ────┤──► Err(Timeout)                 │
//! waiter (again):                                              └──► Ok(data)
//! ```
//! - The unit is **never** cancelled or signalled; it runs to completion.
//! - The slot has room for exactly one value, so the late write does not block the unit.
//! - A second `wait()`/`wait_async()` after a timeout observes the late result once it lands.
//!
//! ## Unrecovered panics
//! Without [`ResultRunner::with_recover`] a panic unwinds the unit and nothing is written
//! to the slot. [`ResultHandle::wait`] then resumes that panic on the waiter, the way
//! joining a panicked thread does. A `wait_async()` conduit is closed empty instead.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskbox::{ResultRunner, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let handle = ResultRunner::new()
//!         .with_recover()
//!         .with_timeout(Duration::from_secs(1))
//!         .spawn(|| async { Ok::<_, TaskError>("🐈") });
//!
//!     assert_eq!(handle.wait().await, Ok("🐈"));
//! }
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
    time,
};

use crate::{
    core::{RunnerConfig, join::JoinGuard, recover::catch},
    error::{TaskError, TaskResult},
    events::{Event, EventKind},
    subscribers::{Subscribe, deliver},
};

/// Receiving end of a result channel.
///
/// Yields one [`TaskResult`] per reporting unit and then `None` once the channel is closed.
pub type Conduit<T> = mpsc::Receiver<TaskResult<T>>;

/// Builder for a single result-producing unit.
pub struct ResultRunner<T> {
    cfg: RunnerConfig,
    name: Option<Arc<str>>,
    sink: Option<Arc<dyn Subscribe>>,
    _out: PhantomData<fn() -> T>,
}

impl<T> Default for ResultRunner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultRunner<T> {
    /// Creates a runner with recovery and timeout disabled and no diagnostic sink.
    pub fn new() -> Self {
        Self {
            cfg: RunnerConfig::default(),
            name: None,
            sink: None,
            _out: PhantomData,
        }
    }

    /// Converts a panic of the unit into `Err(TaskError::Panicked { .. })`.
    pub fn with_recover(mut self) -> Self {
        self.cfg.recover = true;
        self
    }

    /// Bounds every wait on the handle. `Duration::ZERO` disables the bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.timeout = timeout;
        self
    }

    /// Labels the unit in diagnostic events.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Also reports recovered panics and waiter timeouts to `sink`.
    pub fn with_subscriber(mut self, sink: Arc<dyn Subscribe>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replaces all flags at once. `join` is implied by the result slot.
    pub fn with_config(mut self, cfg: RunnerConfig) -> Self {
        self.cfg = cfg;
        self
    }
}

impl<T: Send + 'static> ResultRunner<T> {
    /// Starts `f` on the runtime and returns a handle to its result.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn spawn<F, Fut>(self, f: F) -> ResultHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult<T>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        let unit = spawn_result_unit(self.cfg.recover, self.name.clone(), self.sink.clone(), tx, None, f);

        ResultHandle {
            slot: Arc::new(Mutex::new(Slot {
                rx,
                unit: Some(unit),
            })),
            waiter: Waiter {
                timeout: self.cfg.timeout(),
                name: self.name,
                sink: self.sink,
            },
        }
    }
}

/// The unit's single-value mailbox plus its join handle.
struct Slot<T> {
    rx: Conduit<T>,
    unit: Option<JoinHandle<()>>,
}

/// What every wait on a handle shares: deadline and reporting.
#[derive(Clone)]
struct Waiter {
    timeout: Option<Duration>,
    name: Option<Arc<str>>,
    sink: Option<Arc<dyn Subscribe>>,
}

impl Waiter {
    /// Races the slot against the deadline.
    ///
    /// The deadline covers queueing behind other waiters of the same handle too,
    /// so each waiter gives up after its own `timeout` however many are active.
    async fn race<T>(&self, slot: &Mutex<Slot<T>>) -> TaskResult<T> {
        let Some(timeout) = self.timeout else {
            return observe(slot).await;
        };

        match time::timeout(timeout, observe(slot)).await {
            Ok(res) => res,
            Err(_elapsed) => {
                if let Some(sink) = &self.sink {
                    let ev = Event::new(EventKind::TimeoutHit)
                        .with_task_opt(self.name.as_ref())
                        .with_timeout(timeout);
                    deliver(sink, ev).await;
                }
                Err(TaskError::Timeout { timeout })
            }
        }
    }
}

/// Takes the slot and waits for the unit's single write.
async fn observe<T>(slot: &Mutex<Slot<T>>) -> TaskResult<T> {
    let mut slot = slot.lock().await;
    match slot.rx.recv().await {
        Some(res) => res,
        None => unit_outcome(&mut slot).await,
    }
}

/// Explains an empty, closed slot: resumes the unit's panic, or reports it lost.
///
/// The join handle is only released once it has resolved, so a waiter cut short
/// here leaves the panic for the next one.
async fn unit_outcome<T>(slot: &mut Slot<T>) -> TaskResult<T> {
    if let Some(unit) = slot.unit.as_mut() {
        let joined = unit.await;
        slot.unit = None;
        if let Err(err) = joined {
            if err.is_panic() {
                std::panic::resume_unwind(err.into_panic());
            }
        }
    }
    Err(TaskError::Lost)
}

/// Handle to a spawned result-producing unit.
///
/// Cloning the handle shares the same slot: the unit's single result is observed by
/// whichever wait receives it first.
pub struct ResultHandle<T> {
    slot: Arc<Mutex<Slot<T>>>,
    waiter: Waiter,
}

impl<T> Clone for ResultHandle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            waiter: self.waiter.clone(),
        }
    }
}

impl<T: Send + 'static> ResultHandle<T> {
    /// Waits for the unit's result, or for the configured timeout.
    ///
    /// On timeout returns `Err(TaskError::Timeout { .. })` and leaves the unit running;
    /// calling `wait` again observes its late result.
    pub async fn wait(&self) -> TaskResult<T> {
        self.waiter.race(&*self.slot).await
    }

    /// Returns a conduit that receives exactly one result (real or timeout).
    ///
    /// Does not wait: an internal watcher unit performs the same race as [`wait`](Self::wait).
    pub fn wait_async(&self) -> Conduit<T> {
        let (tx, rx) = mpsc::channel(1);
        let slot = Arc::clone(&self.slot);
        let waiter = self.waiter.clone();

        tokio::spawn(async move {
            let res = waiter.race(&*slot).await;
            let _ = tx.send(res).await;
        });

        rx
    }
}

/// Spawns one result-producing unit writing into `tx`; shared with the result task group.
///
/// The sender is dropped before the join guard, so a closer waiting on the join
/// counter never observes a producer still holding the channel.
pub(crate) fn spawn_result_unit<T, F, Fut>(
    recover: bool,
    label: Option<Arc<str>>,
    sink: Option<Arc<dyn Subscribe>>,
    tx: mpsc::Sender<TaskResult<T>>,
    guard: Option<JoinGuard>,
    f: F,
) -> JoinHandle<()>
where
    T: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = TaskResult<T>> + Send + 'static,
{
    tokio::spawn(async move {
        let _guard = guard;

        let res = if recover {
            match catch(async move { f().await }).await {
                Ok(res) => res,
                Err(err) => {
                    if let Some(sink) = &sink {
                        let ev = Event::panicked(EventKind::UnitPanicked, label.as_ref(), &err);
                        deliver(sink, ev).await;
                    }
                    Err(err)
                }
            }
        } else {
            f().await
        };

        // Capacity always covers one write per producer.
        let _ = tx.send(res).await;
        drop(tx);
    })
}
