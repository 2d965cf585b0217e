//! Collective operations for a fixed group of elimination workers.
//!
//! `lu-collective` provides the two synchronization points a row-cyclic
//! parallel elimination needs: a reusable barrier and a synchronous row
//! broadcast. Both are exposed through the [`Collective`] trait so the
//! elimination loop is written once and runs on either backend.
//!
//! # Backends
//!
//! - [`local`]: workers share one barrier and deliver broadcast rows into
//!   per-worker inboxes. Intended for threads in a single address space.
//! - [`distributed`]: every rank is isolated and only exchanges messages
//!   through its mailbox. Barriers and broadcasts are built from tagged
//!   point-to-point messages, the way a message-passing runtime would.
//!
//! # Ordering
//!
//! Every worker must issue the same sequence of collective calls. Each
//! endpoint tags its calls with a sequence number, so a row sent for one
//! step can never be consumed by another.
//!
//! # Example
//!
//! ```no_run
//! use lu_collective::{Collective, distributed};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lu_collective::Error> {
//!     let mut handles = Vec::new();
//!     for mut comm in distributed::world(2) {
//!         handles.push(tokio::spawn(async move {
//!             let mut row = if comm.rank() == 0 { vec![1.0, 2.0] } else { vec![0.0; 2] };
//!             comm.barrier().await?;
//!             comm.broadcast_row(0, &mut row).await?;
//!             Ok::<_, lu_collective::Error>(row)
//!         }));
//!     }
//!     for handle in handles {
//!         assert_eq!(handle.await.unwrap()?, vec![1.0, 2.0]);
//!     }
//!     Ok(())
//! }
//! ```

pub mod distributed;
mod error;
mod inbox;
pub mod local;
mod mailbox;

use async_trait::async_trait;

pub use distributed::DistributedCollective;
pub use error::Error;
pub use local::LocalCollective;

/// Synchronization endpoint owned by one worker of a fixed-size group.
#[async_trait]
pub trait Collective: Send {
    /// Id of the worker holding this endpoint, in `[0, size)`.
    fn rank(&self) -> usize;

    /// Number of workers in the group.
    fn size(&self) -> usize;

    /// Blocks until every worker of the group has reached the same barrier.
    async fn barrier(&mut self) -> Result<(), Error>;

    /// Makes `row` equal to the root's `row` on every worker.
    ///
    /// The root's buffer is left untouched and the call returns once a copy
    /// has been handed to every peer. Peers return once their buffer has
    /// been overwritten with the delivered copy.
    async fn broadcast_row(&mut self, root: usize, row: &mut [f64]) -> Result<(), Error>;

    /// Collective calls this endpoint has completed successfully.
    fn stats(&self) -> Stats;
}

/// Completed collective calls of one endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub barriers: usize,
    pub broadcasts: usize,
}

pub(crate) fn check_root(root: usize, size: usize) -> Result<(), Error> {
    if root >= size {
        return Err(Error::InvalidRoot { root, size });
    }
    Ok(())
}

pub(crate) fn install(row: &mut [f64], received: &[f64]) -> Result<(), Error> {
    if received.len() != row.len() {
        return Err(Error::LengthMismatch {
            expected: row.len(),
            got: received.len(),
        });
    }
    row.copy_from_slice(received);
    Ok(())
}
