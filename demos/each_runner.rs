//! # Example: each_runner
//!
//! Handle every element of a list in its own unit and collect the results.
//!
//! ## Flow
//! ```text
//! EachRunner::new(urls)
//!     └─► handle(fetch)
//!          ├─► unit("a") ─┐
//!          ├─► unit("b") ─┼─► Conduit ─► recv() until None
//!          └─► unit("c") ─┘
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example each_runner
//! ```

use std::time::Duration;

use taskbox::{EachRunner, TaskError, TaskResult};

/// Pretends to fetch a page; empty names fail.
async fn fetch(name: &'static str) -> TaskResult<usize> {
    tokio::time::sleep(Duration::from_millis(10 * name.len() as u64)).await;
    if name.is_empty() {
        return Err(TaskError::fail("empty name"));
    }
    Ok(name.len())
}

#[tokio::main]
async fn main() {
    let mut results = EachRunner::new(["kitten", "cat", "", "tiger"])
        .with_recover()
        .handle(fetch);

    // Arrival order is whatever finished first.
    while let Some(res) = results.recv().await {
        match res {
            Ok(len) => println!("[ok] {len}"),
            Err(e) => println!("[err] {} ({})", e.as_message(), e.as_label()),
        }
    }
}
