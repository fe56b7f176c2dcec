use std::sync::Arc;

use tokio::{sync::Semaphore, task};
use tracing::warn;

use crate::executor::{FieldError, FieldResult};

/// Bounded pool running blocking resolvers off the async workers.
///
/// Each call holds a permit for as long as its function runs, so at most
/// `workers` blocking resolvers of one schema execute at the same time.
#[derive(Clone, Debug)]
pub(crate) struct BlockingPool {
    permits: Arc<Semaphore>,
}

impl BlockingPool {
    pub(crate) fn new(workers: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Runs `f` on tokio's blocking threads once a worker is free.
    pub(crate) async fn run<F, T>(&self, f: F) -> FieldResult<T>
    where
        F: FnOnce() -> FieldResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| FieldError::from("Blocking worker pool is closed"))?;

        task::spawn_blocking(move || {
            let _permit = permit;
            f()
        })
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "blocking resolver failed to complete");
            Err(FieldError::from(format!("Blocking resolver failed: {e}")))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use futures::future;

    use super::BlockingPool;

    #[tokio::test(flavor = "multi_thread")]
    async fn bounds_concurrent_calls() {
        let pool = BlockingPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let calls = (0..8).map(|i| {
            let (running, peak) = (running.clone(), peak.clone());
            pool.run(move || {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                _ = peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(10));
                _ = running.fetch_sub(1, Ordering::SeqCst);
                Ok(i)
            })
        });
        let results = future::join_all(calls).await;

        assert_eq!(
            results.into_iter().collect::<Result<Vec<_>, _>>(),
            Ok((0..8).collect::<Vec<_>>()),
        );
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn panics_become_field_errors() {
        let pool = BlockingPool::new(1);

        let result = pool.run(|| -> Result<i32, _> { panic!("boom") }).await;

        let err = result.expect_err("panicking resolver must fail");
        assert!(err.message().starts_with("Blocking resolver failed"));
    }
}
