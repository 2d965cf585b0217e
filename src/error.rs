//! Error types for lu-decomp operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("collective error: {0}")]
    Collective(#[from] lu_collective::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("matrix dimension mismatch: A is {0}x{1}, B is {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),

    #[error("parse error on line {line}: `{token}` is not a number")]
    Parse { line: usize, token: String },

    #[error("line {line} has {got} values, expected {expected}")]
    Ragged {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("worker {worker} attempted to write row {row} owned by worker {owner}")]
    OwnershipViolation {
        row: usize,
        worker: usize,
        owner: usize,
    },

    #[error("worker {worker} exited without reporting a result")]
    WorkerLost { worker: usize },

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("view of worker {worker} diverged from worker 0 after elimination")]
    DivergentViews { worker: usize },

    #[error("{0}")]
    Usage(String),
}
