//! # Diagnostic sink trait.
//!
//! Provides [`Subscribe`] the extension point for plugging a custom diagnostic sink into the runners.
//!
//! A sink receives:
//! - recovered panics of no-result units (the only place those panics ever surface),
//! - recovered panics of after-all callbacks,
//! - optional `TimeoutHit`/`UnitPanicked` notices from result-producing runners.
//!
//! ## Rules
//! - `on_event` is awaited on the unit that produced the event, after the unit body has finished.
//! - A slow sink only delays the unit's own completion; siblings are unaffected.
//! - A panicking sink is caught and reported on stderr; it never unwinds the unit.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use taskbox::{Event, EventKind, Subscribe};
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Subscribe for Metrics {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::UnitPanicked) {
//!             // export a metric, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "metrics" }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use crate::core::panic_message;
use crate::events::Event;

/// Diagnostic sink for runner events.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    async fn on_event(&self, event: &Event);

    /// Returns the sink name used when reporting its own panics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Delivers `event` to `sink`, isolating the caller from a panicking sink.
pub(crate) async fn deliver(sink: &Arc<dyn Subscribe>, event: Event) {
    let fut = sink.on_event(&event);
    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
        eprintln!(
            "[taskbox] subscriber '{}' panicked: {}",
            sink.name(),
            panic_message(&*panic_err)
        );
    }
}
