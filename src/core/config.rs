//! # Runner configuration.
//!
//! Provides [`RunnerConfig`] the per-instance flags shared by every runner and group.
//!
//! Config is used in two ways:
//! 1. **Chainable builders**: `with_recover()`, `with_timeout(d)`, `with_join()` edit it in place
//! 2. **Whole config**: `with_config(cfg)` replaces it before spawning
//!
//! ## Sentinel values
//! - `timeout = 0s` → no timeout (see [`RunnerConfig::timeout`])

use std::time::Duration;

/// Flags that shape how a unit is spawned and awaited.
///
/// ## Field semantics
/// - `recover`: catch panics of the task body (`false` = let them unwind)
/// - `timeout`: waiter deadline for result-producing units (`0s` = wait forever)
/// - `join`: track units with a join counter so `wait()` is available
///
/// Not every runner reads every flag: no-result runners ignore `timeout`,
/// result runners always join through their result slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Convert panics into reportable errors instead of unwinding the unit.
    pub recover: bool,

    /// Waiter deadline.
    ///
    /// - `Duration::ZERO` = disabled
    /// - `> 0` = `wait()` gives up after this long; the unit keeps running
    pub timeout: Duration,

    /// Register units with a join counter.
    pub join: bool,
}

impl RunnerConfig {
    /// Returns the waiter deadline as an `Option`.
    ///
    /// - `None` → wait until the unit reports
    /// - `Some(d)` → race the unit against `d`
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }
}
