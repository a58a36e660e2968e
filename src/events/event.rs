//! # Diagnostic events emitted by the runners.
//!
//! The [`EventKind`] enum classifies what happened to a unit:
//! - **Recovered panics**: a unit body or an after-all callback panicked and recovery was on
//! - **Waiter timeouts**: a waiter gave up on a unit that keeps running
//!
//! The [`Event`] struct carries additional metadata such as timestamps, unit label,
//! error text and the captured backtrace.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when several sinks receive events concurrently.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskbox::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TimeoutHit)
//!     .with_task("fetch#3")
//!     .with_timeout(Duration::from_millis(250));
//!
//! assert_eq!(ev.kind, EventKind::TimeoutHit);
//! assert_eq!(ev.task.as_deref(), Some("fetch#3"));
//! assert_eq!(ev.timeout, Some(Duration::from_millis(250)));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::error::TaskError;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of diagnostic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A unit body panicked and the panic was recovered.
    ///
    /// Sets:
    /// - `task`: unit label, if the runner was named
    /// - `error`: formatted panic message
    /// - `trace`: captured backtrace
    UnitPanicked,

    /// An after-all callback panicked and the panic was recovered.
    ///
    /// Sets:
    /// - `task`: group label, if the group was named
    /// - `error`: formatted panic message
    /// - `trace`: captured backtrace
    CallbackPanicked,

    /// A waiter's deadline elapsed before the unit reported.
    ///
    /// The unit is still running when this is published.
    ///
    /// Sets:
    /// - `task`: unit label, if any
    /// - `timeout`: configured deadline
    TimeoutHit,
}

/// Diagnostic event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Label of the unit or group, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable error text.
    pub error: Option<Arc<str>>,
    /// Backtrace captured at the recovery point.
    pub trace: Option<Arc<str>>,
    /// Waiter deadline that elapsed.
    pub timeout: Option<Duration>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            error: None,
            trace: None,
            timeout: None,
        }
    }

    /// Attaches a unit or group label.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches the label only when there is one.
    #[inline]
    pub fn with_task_opt(mut self, task: Option<&Arc<str>>) -> Self {
        self.task = task.cloned();
        self
    }

    /// Attaches a human-readable error.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attaches a captured backtrace.
    #[inline]
    pub fn with_trace(mut self, trace: impl Into<Arc<str>>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    /// Attaches the elapsed deadline.
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }

    /// Builds a panic event of `kind` from a recovered [`TaskError::Panicked`].
    ///
    /// Other error variants only fill in `error`.
    pub fn panicked(kind: EventKind, task: Option<&Arc<str>>, err: &TaskError) -> Self {
        let ev = Event::new(kind)
            .with_task_opt(task)
            .with_error(err.to_string());
        match err {
            TaskError::Panicked { trace, .. } => ev.with_trace(trace.as_str()),
            _ => ev,
        }
    }

    /// True for events that report a recovered panic (unit or callback).
    #[inline]
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, EventKind::UnitPanicked | EventKind::CallbackPanicked)
    }
}
