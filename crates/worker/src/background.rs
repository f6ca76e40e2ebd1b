//! Detached cache writes.
//!
//! Writes are spawned on the runtime rather than awaited by the request, so
//! the caller gets its response first and an aborted caller cannot cancel a
//! write that was already queued.

use std::future::Future;
use std::sync::Mutex;

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct BackgroundWrites {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl BackgroundWrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a write. Must be called from within a tokio runtime.
    pub fn spawn<F>(&self, write: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(write);
        let mut tasks = self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Writes spawned and not yet finished.
    pub fn pending(&self) -> usize {
        let tasks = self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tasks.iter().filter(|task| !task.is_finished()).count()
    }

    /// Wait for every write spawned so far, including ones spawned while waiting.
    pub async fn flush(&self) {
        loop {
            let batch = {
                let mut tasks = self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                std::mem::take(&mut *tasks)
            };
            if batch.is_empty() {
                return;
            }
            for task in batch {
                if let Err(e) = task.await {
                    tracing::warn!(error = %e, "background cache write panicked");
                }
            }
        }
    }
}
