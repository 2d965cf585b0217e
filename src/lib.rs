//! Unpivoted LU factorization, serial and row-cyclic parallel.
//!
//! `lu-decomp` reduces a dense square matrix into combined L/U form by
//! Gaussian elimination without pivoting. The serial algorithm in
//! [`serial`] is the reference; [`ParallelEliminator`] spreads the same work
//! over a fixed set of workers that synchronize through
//! [`lu_collective::Collective`].
//!
//! # Parallel Protocol
//!
//! - **Ownership**: row `i` belongs to worker `i % P` ([`RowDistributor`]).
//!   Only the owner ever writes it.
//! - **Step `k`**: every worker updates its rows below `k`, meets the others
//!   at a barrier, then the owners broadcast their rows.
//! - **Result**: bit-identical to the serial run, checked with
//!   [`verify::equal`].
//!
//! # Example
//!
//! ```no_run
//! use lu_decomp::{serial, verify, Matrix, ParallelEliminator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lu_decomp::Error> {
//!     let a = Matrix::from_rows(vec![vec![4.0, 3.0], vec![6.0, 3.0]])?;
//!
//!     let mut expected = a.clone();
//!     serial::eliminate(&mut expected)?;
//!
//!     let outcome = ParallelEliminator::new(2)?.eliminate(&a).await?;
//!     assert!(verify::equal(&expected, &outcome.matrix));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod distributor;
mod error;
pub mod matrix;
pub mod parallel;
pub mod serial;
pub mod verify;

pub use distributor::RowDistributor;
pub use error::Error;
pub use matrix::Matrix;
pub use parallel::{Backend, BroadcastScope, Outcome, ParallelEliminator};
