//! # EachRunner: one unit per input element.
//!
//! Sugar over [`ResultTaskGroup`]: every element of the input is handed to the same
//! handler in its own unit, and all results come back on one [`Conduit`].
//!
//! - Output order is race-determined, like any result group.
//! - An empty input yields a conduit that is already closed.
//!
//! ## Example
//! ```rust
//! use taskbox::{EachRunner, TaskError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut results = EachRunner::new(vec![1, 2, 3])
//!         .handle(|x: i32| async move { Ok::<_, TaskError>(x + 1) });
//!
//!     let mut got = Vec::new();
//!     while let Some(res) = results.recv().await {
//!         got.push(res.unwrap());
//!     }
//!     got.sort();
//!     assert_eq!(got, vec![2, 3, 4]);
//! }
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::{
    core::{Conduit, RunnerConfig},
    error::TaskResult,
    groups::ResultTaskGroup,
    subscribers::Subscribe,
};

/// Maps every input element to its own unit.
///
/// `T` is the input element type, `V` the handler's data type.
pub struct EachRunner<T, V> {
    items: Vec<T>,
    cfg: RunnerConfig,
    name: Option<Arc<str>>,
    sink: Option<Arc<dyn Subscribe>>,
    _out: PhantomData<fn() -> V>,
}

impl<T, V> EachRunner<T, V>
where
    T: Send + 'static,
    V: Send + 'static,
{
    /// Collects the input up front.
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
            cfg: RunnerConfig::default(),
            name: None,
            sink: None,
            _out: PhantomData,
        }
    }

    /// Converts a panicking handler call into `Err(TaskError::Panicked { .. })`.
    pub fn with_recover(mut self) -> Self {
        self.cfg.recover = true;
        self
    }

    /// Replaces all flags at once; handed to the underlying [`ResultTaskGroup`].
    pub fn with_config(mut self, cfg: RunnerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Prefix for unit labels in diagnostic events.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Also reports recovered panics to `sink`.
    pub fn with_subscriber(mut self, sink: Arc<dyn Subscribe>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Spawns `handler(item)` for every item and returns the shared conduit.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn handle<H, Fut>(self, handler: H) -> Conduit<V>
    where
        H: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult<V>> + Send + 'static,
    {
        let handler = Arc::new(handler);

        let mut group = ResultTaskGroup::new().with_config(self.cfg);
        if let Some(name) = self.name {
            group = group.with_name(name);
        }
        if let Some(sink) = self.sink {
            group = group.with_subscriber(sink);
        }

        for item in self.items {
            let handler = Arc::clone(&handler);
            group = group.add_task(move || handler(item));
        }
        group.run()
    }
}
