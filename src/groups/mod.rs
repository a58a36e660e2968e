//! # Groups of units.
//!
//! - [`TaskGroup`] - no-result units sharing one join counter, optional after-all callback
//! - [`ResultTaskGroup`] - result-producing units aggregated onto one [`Conduit`](crate::Conduit)
//! - [`EachRunner`] - one result-producing unit per input element

mod each;
mod result_group;
mod task_group;

pub use each::EachRunner;
pub use result_group::ResultTaskGroup;
pub use task_group::{TaskGroup, TaskGroupHandle};
