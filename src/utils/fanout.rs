//! Scatter/gather over rayon for indexer rebuilds.
//!
//! Every call blocks until all tasks have finished; there is no
//! fire-and-forget path.

use crate::error::Result;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Where the rebuild fan-out runs
pub enum RebuildPool {
    /// Rayon's global pool
    Global,
    /// A pool owned by one primary index
    Dedicated(ThreadPool),
}

impl RebuildPool {
    /// `threads == 0` shares rayon's global pool.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Ok(RebuildPool::Global);
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("vultus-rebuild-{}", i))
            .build()?;

        Ok(RebuildPool::Dedicated(pool))
    }

    /// Run `f` on every task concurrently and wait for all of them.
    pub fn scatter<T, F>(&self, tasks: &[T], f: F)
    where
        T: Sync,
        F: Fn(&T) + Send + Sync,
    {
        match tasks.len() {
            0 => {}
            // Not worth a hop onto the pool
            1 => f(&tasks[0]),
            _ => match self {
                RebuildPool::Global => tasks.par_iter().for_each(f),
                RebuildPool::Dedicated(pool) => pool.install(|| tasks.par_iter().for_each(f)),
            },
        }
    }

    /// Number of worker threads tasks can spread over
    pub fn parallelism(&self) -> usize {
        match self {
            RebuildPool::Global => rayon::current_num_threads(),
            RebuildPool::Dedicated(pool) => pool.current_num_threads(),
        }
    }
}

impl std::fmt::Debug for RebuildPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebuildPool::Global => f.write_str("RebuildPool::Global"),
            RebuildPool::Dedicated(pool) => {
                write!(f, "RebuildPool::Dedicated({} threads)", pool.current_num_threads())
            }
        }
    }
}
