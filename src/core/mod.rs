//! Runtime core: single units of work and their bookkeeping.
//!
//! Internal modules:
//! - [`config`]: per-runner flags ([`RunnerConfig`]);
//! - [`join`]: atomic join counter and its drop guard;
//! - [`recover`]: panic capture at the unit boundary;
//! - [`unit`]: [`UnitRunner`], a no-result unit with optional join and recovery;
//! - [`result`]: [`ResultRunner`], a result-producing unit with recovery and timeout.
//!
//! The groups in [`crate::groups`] are built from the same spawn helpers.

mod config;
pub(crate) mod join;
mod recover;
mod result;
mod unit;

pub use config::RunnerConfig;
pub use result::{Conduit, ResultHandle, ResultRunner};
pub use unit::{UnitHandle, UnitRunner};

pub(crate) use recover::panic_message;
pub(crate) use result::spawn_result_unit;
pub(crate) use unit::{run_body, spawn_unit};
