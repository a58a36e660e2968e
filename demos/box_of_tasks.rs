//! # Example: box_of_tasks
//!
//! A group of fire-and-forget tasks with recovery, join and an after-all callback.
//!
//! Demonstrates how to:
//! - Queue no-result tasks on a [`TaskGroup`].
//! - Survive a panicking task (reported by [`LogWriter`] on stderr).
//! - Run a callback after every task is done, and wait for it explicitly.
//!
//! ## Flow
//! ```text
//! TaskGroup::new().with_recover().with_join()
//!     ├─► add_task(worker 0..3)
//!     ├─► add_task(panicking worker)  ─► [panicked] task="box#3" ...
//!     ├─► after_all(summary)
//!     └─► run()
//!          ├─► wait()            (tasks done)
//!          └─► after_all_done()  (summary printed)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example box_of_tasks
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use taskbox::{LogWriter, TaskGroup};

fn knock_glass() {
    panic!("🐈 knocked the glass off the table");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let finished = Arc::new(AtomicUsize::new(0));

    // 1. Configure the box
    let mut group = TaskGroup::new()
        .with_recover()
        .with_join()
        .with_name("box")
        .with_subscriber(Arc::new(LogWriter::compact()));

    // 2. Queue workers
    for i in 0..3u64 {
        let finished = Arc::clone(&finished);
        group = group.add_task(move || async move {
            tokio::time::sleep(Duration::from_millis(100 * (3 - i))).await;
            println!("[worker {i}] done");
            finished.fetch_add(1, Ordering::SeqCst);
        });
    }
    group = group.add_task(|| async { knock_glass() });

    // 3. Summary once everything is done
    let seen = Arc::clone(&finished);
    let handle = group
        .after_all(move || async move {
            println!("[after-all] {} workers finished", seen.load(Ordering::SeqCst));
        })
        .run();

    // 4. Tasks first, then the callback
    handle.wait().await?;
    handle.after_all_done().await;
    Ok(())
}
