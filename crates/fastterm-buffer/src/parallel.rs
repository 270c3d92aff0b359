//! Execution modes and the scoped-thread splitter behind them.

use serde::{Deserialize, Serialize};
use std::thread;

/// How a whole-buffer operation is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Process every cell on the calling thread.
    #[default]
    Sequential,
    /// Split the cells into contiguous chunks and process them on scoped
    /// worker threads. Results are identical to [`ExecutionMode::Sequential`].
    Parallel,
}

impl ExecutionMode {
    /// Returns whether this is [`ExecutionMode::Parallel`].
    #[inline]
    pub const fn is_parallel(self) -> bool {
        matches!(self, Self::Parallel)
    }

    /// Downgrades to sequential when fewer than `threshold` cells are involved.
    #[inline]
    pub const fn for_workload(self, cells: usize, threshold: usize) -> Self {
        match self {
            Self::Parallel if cells >= threshold => Self::Parallel,
            _ => Self::Sequential,
        }
    }
}

/// Returns the number of worker threads used for parallel work.
pub fn worker_count() -> usize {
    num_cpus::get().max(1)
}

/// Runs `work` over `items` according to `mode`.
///
/// `work` receives the index of the first element of its chunk and the chunk
/// itself. Chunk lengths are multiples of `granularity` (except possibly the
/// last), so a row-major grid split with `granularity = width` hands every
/// worker whole rows. Sequential mode makes a single call covering all items.
pub fn for_each_chunk_mut<T, F>(mode: ExecutionMode, items: &mut [T], granularity: usize, work: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    let granularity = granularity.max(1);
    let units = items.len().div_ceil(granularity);
    let workers = worker_count().min(units);

    if !mode.is_parallel() || workers <= 1 {
        work(0, items);
        return;
    }

    let chunk_len = units.div_ceil(workers) * granularity;
    let work = &work;
    thread::scope(|scope| {
        for (index, chunk) in items.chunks_mut(chunk_len).enumerate() {
            scope.spawn(move || work(index * chunk_len, chunk));
        }
    });
}
