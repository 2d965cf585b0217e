//! Row-cyclic parallel elimination over a [`Collective`].
//!
//! Each worker holds its own view of the matrix and owns the rows
//! `{ i : i % P == id }`. For every pivot step `k` a worker:
//!
//! 1. eliminates column `k` from each row `i > k` it owns, reading pivot row
//!    `k` from its view;
//! 2. waits on the barrier until every worker has finished step 1;
//! 3. takes part in one broadcast per row it must publish, rooted at the
//!    row's owner, so every view holds the owner's final values.
//!
//! All writes of step `k` therefore reach every view before any worker
//! starts step `k + 1`. The arithmetic per row is [`serial::eliminate_row`],
//! so the result is bit-identical to [`serial::eliminate`].

use std::ops::Range;
use std::str::FromStr;

use futures_util::future::try_join_all;
use lu_collective::{distributed, local, Collective, Stats};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::distributor::RowDistributor;
use crate::serial::{self, ensure_square};
use crate::{verify, Error, Matrix};

/// Synchronization substrate the workers run on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// Worker threads sharing a barrier and per-worker inboxes.
    #[default]
    Local,
    /// Isolated ranks exchanging messages only.
    Distributed,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "local" => Ok(Backend::Local),
            "distributed" => Ok(Backend::Distributed),
            other => Err(Error::Usage(format!("unknown backend: {}", other))),
        }
    }
}

/// Which rows are published after each pivot step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BroadcastScope {
    /// Every row below the pivot, every step. Keeps all views identical at
    /// all times.
    #[default]
    AllRows,
    /// Only row `k + 1`, the next pivot, sent whole. Other views hold stale
    /// copies of unfinished rows, which no worker but the owner ever reads.
    NextPivot,
}

impl BroadcastScope {
    fn rows(self, k: usize, n: usize) -> Range<usize> {
        match self {
            BroadcastScope::AllRows => k + 1..n,
            BroadcastScope::NextPivot => k + 1..(k + 2).min(n),
        }
    }

    /// First column that may differ between views at step `k`.
    fn first_column(self, k: usize) -> usize {
        match self {
            BroadcastScope::AllRows => k,
            BroadcastScope::NextPivot => 0,
        }
    }
}

impl FromStr for BroadcastScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "all" => Ok(BroadcastScope::AllRows),
            "next-pivot" => Ok(BroadcastScope::NextPivot),
            other => Err(Error::Usage(format!("unknown broadcast scope: {}", other))),
        }
    }
}

/// Result of a parallel run.
#[derive(Debug)]
pub struct Outcome {
    /// The combined L/U matrix.
    pub matrix: Matrix,
    /// Number of workers that actually ran.
    pub workers: usize,
    /// Barriers each worker completed, indexed by worker id.
    pub rounds: Vec<usize>,
    /// Row broadcasts each worker took part in, indexed by worker id.
    pub broadcasts: Vec<usize>,
}

/// Parallel LU eliminator with a fixed worker count.
///
/// # Example
///
/// ```no_run
/// use lu_decomp::{Backend, Matrix, ParallelEliminator};
///
/// #[tokio::main]
/// async fn main() -> Result<(), lu_decomp::Error> {
///     let a = Matrix::from_rows(vec![
///         vec![1.0, 2.0, 3.0],
///         vec![4.0, 5.0, 3.0],
///         vec![1.0, 2.0, 6.0],
///     ])?;
///
///     let outcome = ParallelEliminator::new(3)?
///         .backend(Backend::Distributed)
///         .eliminate(&a)
///         .await?;
///     assert_eq!(outcome.rounds, vec![2, 2, 2]);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ParallelEliminator {
    workers: usize,
    backend: Backend,
    scope: BroadcastScope,
}

impl ParallelEliminator {
    pub fn new(workers: usize) -> Result<Self, Error> {
        if workers == 0 {
            return Err(Error::NoWorkers);
        }
        Ok(Self {
            workers,
            backend: Backend::default(),
            scope: BroadcastScope::default(),
        })
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn scope(mut self, scope: BroadcastScope) -> Self {
        self.scope = scope;
        self
    }

    /// Factorizes a copy of `matrix` and returns the combined L/U result.
    ///
    /// More workers than rows are clamped to one worker per row.
    pub async fn eliminate(&self, matrix: &Matrix) -> Result<Outcome, Error> {
        ensure_square(matrix)?;
        let n = matrix.rows();
        let workers = self.workers.min(n.max(1));
        if workers < self.workers {
            warn!(
                requested = self.workers,
                workers, "more workers than rows, clamping"
            );
        }
        let distributor = RowDistributor::new(workers)?;

        let reports = match self.backend {
            Backend::Local => self.run_local(matrix, distributor).await?,
            Backend::Distributed => self.run_distributed(matrix, distributor).await?,
        };

        assemble(reports)
    }

    /// One dedicated OS thread per worker, each driving its loop to
    /// completion. Workers park at the barrier, so they must not come from a
    /// bounded pool.
    async fn run_local(
        &self,
        matrix: &Matrix,
        distributor: RowDistributor,
    ) -> Result<Vec<WorkerReport>, Error> {
        let handle = Handle::current();
        let mut pending = Vec::with_capacity(distributor.workers());

        for comm in local::group(distributor.workers()) {
            let id = comm.rank();
            let worker = Worker::new(comm, distributor, matrix.clone(), self.scope);
            let handle = handle.clone();
            let (tx, rx) = oneshot::channel();
            std::thread::Builder::new()
                .name(format!("lu-worker-{}", id))
                .spawn(move || {
                    let _ = tx.send(handle.block_on(worker.run()));
                })?;
            pending.push((id, rx));
        }

        let mut reports = Vec::with_capacity(pending.len());
        for (worker, rx) in pending {
            reports.push(rx.await.map_err(|_| Error::WorkerLost { worker })??);
        }
        Ok(reports)
    }

    /// One task per rank; ranks share nothing but their mailboxes.
    async fn run_distributed(
        &self,
        matrix: &Matrix,
        distributor: RowDistributor,
    ) -> Result<Vec<WorkerReport>, Error> {
        let tasks = distributed::world(distributor.workers())
            .into_iter()
            .map(|comm| {
                let worker = Worker::new(comm, distributor, matrix.clone(), self.scope);
                tokio::spawn(worker.run())
            });

        try_join_all(tasks).await?.into_iter().collect()
    }
}

fn assemble(reports: Vec<WorkerReport>) -> Result<Outcome, Error> {
    let mut reports = reports.into_iter();
    let first = match reports.next() {
        Some(report) => report,
        None => return Err(Error::NoWorkers),
    };

    let mut stats = vec![first.stats];
    for report in reports {
        if !verify::bitwise_equal(&first.view, &report.view) {
            return Err(Error::DivergentViews {
                worker: report.worker,
            });
        }
        stats.push(report.stats);
    }

    Ok(Outcome {
        matrix: first.view,
        workers: stats.len(),
        rounds: stats.iter().map(|s| s.barriers).collect(),
        broadcasts: stats.iter().map(|s| s.broadcasts).collect(),
    })
}

struct WorkerReport {
    worker: usize,
    stats: Stats,
    view: Matrix,
}

struct Worker<C> {
    comm: C,
    distributor: RowDistributor,
    view: Matrix,
    scope: BroadcastScope,
}

impl<C: Collective> Worker<C> {
    fn new(comm: C, distributor: RowDistributor, view: Matrix, scope: BroadcastScope) -> Self {
        Self {
            comm,
            distributor,
            view,
            scope,
        }
    }

    async fn run(mut self) -> Result<WorkerReport, Error> {
        let id = self.comm.rank();
        let n = self.view.rows();
        let distributor = self.distributor;

        for k in 0..n.saturating_sub(1) {
            let mut updated = 0;
            for i in distributor.owned_rows(id, k + 1..n) {
                self.eliminate_owned(k, i)?;
                updated += 1;
            }

            self.comm.barrier().await?;

            let from = self.scope.first_column(k);
            for i in self.scope.rows(k, n) {
                let root = distributor.owner(i);
                self.comm
                    .broadcast_row(root, &mut self.view.row_mut(i)[from..])
                    .await?;
            }

            debug!(worker = id, step = k, rows = updated, "pivot step done");
        }

        Ok(WorkerReport {
            worker: id,
            stats: self.comm.stats(),
            view: self.view,
        })
    }

    fn eliminate_owned(&mut self, k: usize, i: usize) -> Result<(), Error> {
        let worker = self.comm.rank();
        let owner = self.distributor.owner(i);
        if owner != worker {
            return Err(Error::OwnershipViolation {
                row: i,
                worker,
                owner,
            });
        }

        let (pivot, target) = self.view.pivot_and_target(k, i);
        serial::eliminate_row(pivot, target, k);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_refuses_rows_it_does_not_own() {
        let a = Matrix::identity(4);
        let distributor = RowDistributor::new(2).unwrap();
        let comm = local::group(2).remove(0);
        let mut worker = Worker::new(comm, distributor, a.clone(), BroadcastScope::AllRows);

        let err = worker.eliminate_owned(0, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::OwnershipViolation {
                row: 1,
                worker: 0,
                owner: 1
            }
        ));
        assert_eq!(worker.view, a);

        worker.eliminate_owned(0, 2).unwrap();
    }
}
