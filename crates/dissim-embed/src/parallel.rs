//! Worker-pool sizing and row-parallel execution.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::EmbedError;

/// Degree of parallelism for pairwise distance computation.
///
/// | `n_jobs` | Parallelism |
/// |---|---|
/// | `None`, `1` | [`Parallelism::Sequential`] |
/// | `-1` | [`Parallelism::AllWorkers`] |
/// | `n > 1` | [`Parallelism::Workers`]`(n)` |
/// | `-k`, `k > 1` | [`Parallelism::Workers`]`(all - (k - 1))`, at least 1 |
/// | `0` | [`EmbedError::InvalidJobs`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Compute on the calling thread.
    #[default]
    Sequential,
    /// Use every worker of the global rayon pool.
    AllWorkers,
    /// Use a dedicated pool with this many workers.
    Workers(usize),
}

impl Parallelism {
    /// Interpret a signed `n_jobs` value.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::InvalidJobs`] | `n_jobs` is `Some(0)` |
    pub fn from_n_jobs(n_jobs: Option<i32>) -> Result<Self, EmbedError> {
        match n_jobs {
            None | Some(1) => Ok(Self::Sequential),
            Some(0) => Err(EmbedError::InvalidJobs),
            Some(-1) => Ok(Self::AllWorkers),
            Some(n) if n > 1 => Ok(Self::Workers(n as usize)),
            Some(n) => {
                let available = rayon::current_num_threads() as i64;
                let workers = (available + 1 + i64::from(n)).max(1) as usize;
                if workers == 1 {
                    Ok(Self::Sequential)
                } else {
                    Ok(Self::Workers(workers))
                }
            }
        }
    }
}

/// Runs per-row work according to a [`Parallelism`].
#[derive(Debug, Clone)]
pub(crate) enum Executor {
    Sequential,
    Global,
    Pool(Arc<ThreadPool>),
}

impl Executor {
    pub(crate) fn new(parallelism: Parallelism) -> Result<Self, EmbedError> {
        match parallelism {
            Parallelism::Sequential => Ok(Self::Sequential),
            Parallelism::AllWorkers => Ok(Self::Global),
            Parallelism::Workers(n) => {
                let pool = ThreadPoolBuilder::new().num_threads(n).build()?;
                Ok(Self::Pool(Arc::new(pool)))
            }
        }
    }

    /// Map `f` over `0..n`, preserving order. An error from any row aborts the
    /// batch; with workers, which failing row is reported is unspecified.
    pub(crate) fn try_map<T, E, F>(&self, n: usize, f: F) -> Result<Vec<T>, E>
    where
        T: Send,
        E: Send,
        F: Fn(usize) -> Result<T, E> + Sync + Send,
    {
        match self {
            Self::Sequential => (0..n).map(f).collect(),
            Self::Global => (0..n).into_par_iter().map(f).collect(),
            Self::Pool(pool) => pool.install(|| (0..n).into_par_iter().map(&f).collect()),
        }
    }
}
