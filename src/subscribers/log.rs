//! # LogWriter — default diagnostic sink
//!
//! A minimal subscriber that writes incoming [`Event`]s to stderr.
//! It is the sink every no-result runner uses unless another one is injected.
//!
//! ## Example output
//! ```text
//! [panicked] task="box#2" err="recovered from panic: boom"
//!    0: taskbox::core::recover::catch
//!    ...
//! [callback-panicked] task="box" err="recovered from panic: oops"
//! [timeout] task="fetch" timeout=250ms
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Debug, Clone, Copy)]
pub struct LogWriter {
    with_trace: bool,
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogWriter {
    /// Construct a new [`LogWriter`] that also prints captured backtraces.
    #[must_use]
    pub fn new() -> Self {
        Self { with_trace: true }
    }

    /// Construct a writer that prints one line per event and omits backtraces.
    #[must_use]
    pub fn compact() -> Self {
        Self { with_trace: false }
    }

    fn render(&self, e: &Event) -> String {
        let task = e.task.as_deref().unwrap_or("unnamed");
        let err = e.error.as_deref().unwrap_or("unknown");
        let mut line = match e.kind {
            EventKind::UnitPanicked => format!("[panicked] task={task:?} err={err:?}"),
            EventKind::CallbackPanicked => {
                format!("[callback-panicked] task={task:?} err={err:?}")
            }
            EventKind::TimeoutHit => format!("[timeout] task={task:?} timeout={:?}", e.timeout),
        };
        if self.with_trace {
            if let Some(trace) = e.trace.as_deref() {
                line.push('\n');
                line.push_str(trace);
            }
        }
        line
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        eprintln!("{}", self.render(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
