//! # Example: timeout
//!
//! A waiter that gives up does not stop the unit.
//!
//! ## Flow
//! ```text
//! ResultRunner::new().with_timeout(1s).spawn(slow)
//!     ├─► wait()        ─► Err(Timeout)  [timeout] task="slow" ...
//!     └─► wait_async()  ─► Ok("🐈")       (late result, the unit kept running)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example timeout
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskbox::{LogWriter, ResultRunner, TaskError};

#[tokio::main]
async fn main() {
    let handle = ResultRunner::new()
        .with_recover()
        .with_timeout(Duration::from_secs(1))
        .with_name("slow")
        .with_subscriber(Arc::new(LogWriter::new()))
        .spawn(|| async {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            Ok::<_, TaskError>("🐈")
        });

    println!("first wait: {:?}", handle.wait().await);

    let mut late = handle.wait_async();
    println!("second wait: {:?}", late.recv().await);
}
