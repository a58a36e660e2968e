//! # Panic recovery at the unit boundary.
//!
//! [`catch`] polls a unit body under `catch_unwind` and turns an unwind into
//! [`TaskError::Panicked`] carrying the panic message and a backtrace.
//!
//! ## Rules
//! - The body is wrapped in `AssertUnwindSafe`: a unit that panics while holding shared
//!   state (e.g. `Arc<Mutex<T>>`) may leave it inconsistent for its siblings.
//! - The backtrace is captured at the recovery point, on the thread that polled the body.

use std::any::Any;
use std::backtrace::Backtrace;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::TaskError;

/// Runs `fut` to completion, converting a panic into [`TaskError::Panicked`].
pub(crate) async fn catch<F: Future>(fut: F) -> Result<F::Output, TaskError> {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(out) => Ok(out),
        Err(payload) => Err(TaskError::Panicked {
            message: panic_message(&*payload),
            trace: Backtrace::force_capture().to_string(),
        }),
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_output_through() {
        assert_eq!(catch(async { 7 }).await, Ok(7));
    }

    async fn explode(msg: &'static str) -> u32 {
        panic!("{}", msg)
    }

    #[tokio::test]
    async fn str_payload() {
        async fn literal() -> u32 {
            panic!("aaaaa")
        }
        let err = catch(literal()).await.unwrap_err();
        match err {
            TaskError::Panicked { message, trace } => {
                assert_eq!(message, "aaaaa");
                assert!(!trace.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn formatted_payload() {
        let err = catch(explode("bad item 3")).await.unwrap_err();
        assert_eq!(err.to_string(), "recovered from panic: bad item 3");
    }

    #[test]
    fn opaque_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*payload), "unknown panic");
    }
}
