//! # taskbox
//!
//! **Taskbox** is a small set of coordination primitives for tokio tasks.
//!
//! It launches one or many independent units of work, optionally recovers
//! their panics, optionally bounds waiting with a timeout, and collects
//! results through a single channel that closes exactly once.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  inputs [a, b, c]
//!        │
//!        ▼
//! ┌──────────────┐      ┌───────────────────────────────────────────────┐
//! │  EachRunner  │ ───► │ ResultTaskGroup                               │
//! └──────────────┘      │  - join counter (one count per task)          │
//!                       │  - mpsc channel (capacity = task count)       │
//!                       └──────┬──────────────┬──────────────┬──────────┘
//!                              ▼              ▼              ▼
//!                        ┌───────────┐  ┌───────────┐  ┌───────────┐
//!                        │ unit #0   │  │ unit #1   │  │ unit #2   │   (spawn_result_unit)
//!                        │ [recover] │  │ [recover] │  │ [recover] │
//!                        └─────┬─────┘  └─────┬─────┘  └─────┬─────┘
//!                              └──── send ────┼──── send ────┘
//!                                             ▼
//!                                   Conduit<T> ──► caller (recv until None)
//!                                             ▲
//!                          coordinator: join.wait() ─► drop(last sender)
//!
//!  no-result path:
//!   TaskGroup ──► N × spawn_unit ──► join counter ──► wait() / after_all(callback)
//!   UnitRunner ─► 1 × spawn_unit          │
//!                      └── recovered panic ──► Subscribe sink (LogWriter by default)
//! ```
//!
//! ### Lifecycle
//! ```text
//! configure (with_recover / with_timeout / with_join)
//!    └─► add_task(f) ... (groups only)
//!          └─► spawn(f) / run()          returns immediately, builder is consumed
//!                └─► wait().await        join counter drained, or single result arrived
//!                └─► wait_async()        conduit with exactly one result
//!                └─► conduit.recv()      one result per task, then None
//! ```
//!
//! ## Features
//! | Area            | Description                                                   | Key types                                  |
//! |-----------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Single unit** | Fire-and-forget or result-producing unit                      | [`UnitRunner`], [`ResultRunner`]           |
//! | **Groups**      | Many units, one join counter or one result conduit            | [`TaskGroup`], [`ResultTaskGroup`]         |
//! | **Batch**       | One unit per input element                                    | [`EachRunner`]                             |
//! | **Errors**      | Typed per-unit errors and misuse errors                       | [`TaskError`], [`RuntimeError`]            |
//! | **Diagnostics** | Pluggable sink for recovered panics and waiter timeouts       | [`Subscribe`], [`LogWriter`], [`Event`]    |
//! | **Config**      | Per-runner flags                                              | [`RunnerConfig`]                           |
//!
//! ## What it does not do
//! A timeout never cancels a unit: it only changes what the waiter observes.
//! There is no backpressure, no priority and no persistence.
//!
//! ## Example
//! ```rust
//! use taskbox::{ResultTaskGroup, TaskError, TaskResult};
//!
//! fn explode() -> TaskResult<&'static str> {
//!     panic!("aaaaa")
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut results = ResultTaskGroup::<&'static str>::new()
//!         .with_recover()
//!         .add_task(|| async { Ok("1") })
//!         .add_task(|| async { Ok("2") })
//!         .add_task(|| async { Err(TaskError::fail("Houston, we have a problem")) })
//!         .add_task(|| async { explode() })
//!         .run();
//!
//!     let mut errors = 0;
//!     while let Some(res) = results.recv().await {
//!         if res.is_err() {
//!             errors += 1;
//!         }
//!     }
//!     assert_eq!(errors, 2);
//! }
//! ```
mod core;
mod error;
mod events;
mod groups;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Conduit, ResultHandle, ResultRunner, RunnerConfig, UnitHandle, UnitRunner};
pub use error::{RuntimeError, TaskError, TaskResult};
pub use events::{Event, EventKind};
pub use groups::{EachRunner, ResultTaskGroup, TaskGroup, TaskGroupHandle};
pub use subscribers::{LogWriter, Subscribe};
