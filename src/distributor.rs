//! Row-cyclic assignment of matrix rows to workers.

use std::ops::Range;

use crate::Error;

/// Worker that owns row `row` among `workers` workers.
///
/// `workers` must be non-zero.
pub fn owner(row: usize, workers: usize) -> usize {
    row % workers
}

/// Maps each row to exactly one worker with `row % workers`.
///
/// The assignment is fixed for the whole run: the owner of a row is the
/// only worker that updates it and the root of every broadcast of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowDistributor {
    workers: usize,
}

impl RowDistributor {
    pub fn new(workers: usize) -> Result<Self, Error> {
        if workers == 0 {
            return Err(Error::NoWorkers);
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn owner(&self, row: usize) -> usize {
        owner(row, self.workers)
    }

    /// Rows of `rows` owned by `worker`, in increasing order.
    pub fn owned_rows(&self, worker: usize, rows: Range<usize>) -> impl Iterator<Item = usize> {
        debug_assert!(worker < self.workers);
        let skip = (worker + self.workers - rows.start % self.workers) % self.workers;
        (rows.start + skip..rows.end).step_by(self.workers)
    }

    /// Splits `rows` into one list per worker.
    pub fn partition(&self, rows: Range<usize>) -> Vec<Vec<usize>> {
        (0..self.workers)
            .map(|worker| self.owned_rows(worker, rows.clone()).collect())
            .collect()
    }
}
