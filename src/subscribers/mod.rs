//! # Diagnostic sinks for the taskbox runners.
//!
//! This module provides the [`Subscribe`] trait and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! unit boundary ── recovered panic ──► Event ──► deliver() ──► Subscribe::on_event(&Event)
//!                                                   │               │
//!                                                   │          ┌────┴────┬────────┐
//!                                                   │          ▼         ▼        ▼
//!                                                   │      LogWriter  Metrics  Custom
//!                                                   │
//!                                                   └──► sink panic caught, written to stderr
//! ```

mod log;
mod subscribe;

pub use log::LogWriter;
pub use subscribe::Subscribe;
pub(crate) use subscribe::deliver;

#[cfg(test)]
pub(crate) mod testing;
