use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time;
use tracing::debug;

use crate::error::FetchError;

/// A deferred fetch operation. Nothing is dispatched until the queue calls it.
pub type FetchTask<'a, T> = Box<dyn FnOnce() -> BoxFuture<'a, Result<T, FetchError>> + Send + 'a>;

/// Sole gate to the network. Tasks run strictly one at a time, each preceded
/// by the configured delay, so the remote rate limit holds regardless of how
/// long any single request takes.
pub struct ThrottledQueue {
    delay: Duration,
}

impl ThrottledQueue {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Wait the inter-request delay, then dispatch a single fetch task.
    pub async fn run<T>(&self, task: FetchTask<'_, T>) -> Result<T, FetchError> {
        time::sleep(self.delay).await;
        task().await
    }

    /// Execute every task in order, collecting results in task order. No task
    /// starts before the previous one's result is known. The first failure
    /// aborts the remaining tasks and carries its 1-based position.
    pub async fn run_all<T>(&self, tasks: Vec<FetchTask<'_, T>>) -> Result<Vec<T>, FetchError> {
        let total = tasks.len();
        let mut results = Vec::with_capacity(total);

        for (index, task) in tasks.into_iter().enumerate() {
            debug!(position = index + 1, total, "Dispatching queued fetch");

            let value = self.run(task).await.map_err(|source| FetchError::Task {
                position: index + 1,
                total,
                source: Box::new(source),
            })?;
            results.push(value);
        }

        Ok(results)
    }
}

/// Number of pages needed to hold `total` records at `page_size` per page.
pub fn page_count(total: u32, page_size: u32) -> u32 {
    total.div_ceil(page_size)
}
