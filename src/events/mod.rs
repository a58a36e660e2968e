//! Diagnostic events.
//!
//! This module holds the event **data model** handed to [`Subscribe`](crate::Subscribe)
//! sinks by the runners.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publishers**: unit boundaries in `core::unit` and `core::result`, the
//!   after-all waiter in `groups::task_group`.
//! - **Consumers**: any [`Subscribe`](crate::Subscribe) implementation, the
//!   default being [`LogWriter`](crate::LogWriter).

mod event;

pub use event::{Event, EventKind};
