//! Fixed-size worker pool for independent per-request work units.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::{GridProcessorError, Result};

/// Runs a batch of independent jobs on a fixed number of threads and
/// returns results in submission order, whatever order they finish in.
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish()
    }
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("regrid-{}", i))
            .build()
            .map_err(|e| GridProcessorError::Pool(e.to_string()))?;
        debug!(workers, "Created worker pool");
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Apply `job` to every item and join.
    pub fn map_ordered<T, R, F>(&self, items: Vec<T>, job: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        self.pool
            .install(|| items.into_par_iter().map(job).collect())
    }

    /// Like [`WorkerPool::map_ordered`], failing if any job fails.
    ///
    /// Every job runs to completion before the first error (in submission
    /// order) is returned.
    pub fn try_map_ordered<T, R, E, F>(&self, items: Vec<T>, job: F) -> std::result::Result<Vec<R>, E>
    where
        T: Send,
        R: Send,
        E: Send,
        F: Fn(T) -> std::result::Result<R, E> + Sync + Send,
    {
        self.map_ordered(items, job).into_iter().collect()
    }
}
