//! Error types used by the taskbox runners and tasks.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`] — errors caused by misusing a runner or group.
//! - [`TaskError`] — errors reported for individual units of work.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;

/// Outcome of a result-producing unit: data on success, one [`TaskError`] otherwise.
pub type TaskResult<T> = Result<T, TaskError>;

/// # Errors produced by misuse of the runners.
///
/// These never describe a unit's own failure; they are returned to the caller
/// that asked for something the runner was not configured to do.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// `wait()` was called on a runner or group that never enabled join tracking.
    #[error("wait() was called without join tracking; call with_join() before spawning")]
    WaitWithoutJoin,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskbox::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::WaitWithoutJoin.as_label(), "runtime_wait_without_join");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::WaitWithoutJoin => "runtime_wait_without_join",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::WaitWithoutJoin => "wait called without join tracking".to_string(),
        }
    }
}

/// # Errors reported for a single unit of work.
///
/// `Fail` comes from the task body itself and is passed through untouched.
/// The other variants are produced by the runner around the body.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Application error returned by the task body.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The task body panicked and the panic was recovered.
    #[error("recovered from panic: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
        /// Backtrace captured when the panic was recovered.
        trace: String,
    },

    /// The waiter's deadline elapsed before the unit reported.
    ///
    /// The unit itself is not stopped and may still deliver a late result.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The unit has ended and there is no result left to observe.
    ///
    /// Either an earlier wait already took it, or the runtime dropped the unit
    /// before it reported.
    #[error("unit ended without a result to observe")]
    Lost,
}

impl TaskError {
    /// Builds an application error from anything displayable.
    ///
    /// # Example
    /// ```
    /// use taskbox::TaskError;
    ///
    /// let err = TaskError::fail("houston, we have a problem");
    /// assert_eq!(err.to_string(), "execution failed: houston, we have a problem");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskbox::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Lost => "task_lost",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { message, .. } => format!("panic: {message}"),
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Lost => "lost".to_string(),
        }
    }

    /// True for [`TaskError::Panicked`].
    pub fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panicked { .. })
    }

    /// True for [`TaskError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }
}
