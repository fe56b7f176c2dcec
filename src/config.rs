//! Execution settings of a [`Schema`](crate::Schema).

use std::{io, time::Duration};

use tokio::runtime::{Builder, Runtime};

/// Default bound on concurrently running blocking resolvers, matching the
/// size of tokio's blocking thread pool.
pub const DEFAULT_BLOCKING_WORKERS: usize = 512;

/// Settings fixed when a schema is built.
///
/// ```rust
/// use std::time::Duration;
///
/// use juniper_dynamic::Schema;
///
/// let schema = Schema::build()
///     .query("ping", |q| q.resolver(|| String::from("pong")))
///     .configure(|c| c.blocking_workers(64).timeout(Duration::from_secs(5)))
///     .build()
///     .expect("valid schema");
///
/// assert_eq!(schema.configuration().blocking_workers_limit(), 64);
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct SchemaConfiguration {
    blocking_workers: usize,
    worker_threads: Option<usize>,
    timeout: Option<Duration>,
}

impl Default for SchemaConfiguration {
    fn default() -> Self {
        Self {
            blocking_workers: DEFAULT_BLOCKING_WORKERS,
            worker_threads: None,
            timeout: None,
        }
    }
}

impl SchemaConfiguration {
    /// Bounds how many blocking resolvers of one schema run at the same
    /// time. At least one always may.
    pub fn blocking_workers(mut self, workers: usize) -> Self {
        self.blocking_workers = workers.max(1);
        self
    }

    /// Sets the number of async worker threads of the runtime
    /// [`Schema::execute_sync()`](crate::Schema::execute_sync) creates.
    /// Defaults to the number of CPU cores.
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads.max(1));
        self
    }

    /// Abandons executions taking longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bound set by [`SchemaConfiguration::blocking_workers()`].
    pub fn blocking_workers_limit(&self) -> usize {
        self.blocking_workers
    }

    /// Thread count set by [`SchemaConfiguration::worker_threads()`], if any.
    pub fn worker_threads_limit(&self) -> Option<usize> {
        self.worker_threads
    }

    /// Limit set by [`SchemaConfiguration::timeout()`], if any.
    pub fn timeout_limit(&self) -> Option<Duration> {
        self.timeout
    }

    /// Creates a runtime sized by these settings.
    pub(crate) fn runtime(&self) -> io::Result<Runtime> {
        let mut builder = Builder::new_multi_thread();
        _ = builder
            .enable_time()
            .max_blocking_threads(self.blocking_workers)
            .thread_name("juniper-dynamic");
        if let Some(threads) = self.worker_threads {
            _ = builder.worker_threads(threads);
        }
        builder.build()
    }
}
