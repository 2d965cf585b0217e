//! In-process backend: a shared barrier plus one inbox per worker.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Barrier;

use crate::inbox::Inbox;
use crate::{Collective, Error, Stats, check_root, install};

/// Endpoint of a group of workers living in the same address space.
///
/// All endpoints of a group share one [`Barrier`] and the full set of
/// inboxes. A broadcast root copies its row into every peer's inbox; a peer
/// waits on its own inbox for the copy tagged with the current sequence
/// number.
pub struct LocalCollective {
    rank: usize,
    barrier: Arc<Barrier>,
    inboxes: Arc<Vec<Inbox>>,
    sequence: u64,
    stats: Stats,
}

/// Creates the endpoints of a local group of `size` workers.
///
/// Endpoint `i` belongs to worker `i`.
pub fn group(size: usize) -> Vec<LocalCollective> {
    let barrier = Arc::new(Barrier::new(size));
    let inboxes: Arc<Vec<Inbox>> = Arc::new((0..size).map(|_| Inbox::new()).collect());

    (0..size)
        .map(|rank| LocalCollective {
            rank,
            barrier: Arc::clone(&barrier),
            inboxes: Arc::clone(&inboxes),
            sequence: 0,
            stats: Stats::default(),
        })
        .collect()
}

impl LocalCollective {
    fn next_tag(&mut self) -> u64 {
        let tag = self.sequence;
        self.sequence += 1;
        tag
    }

    /// Returns `true` if no broadcast row is waiting in this worker's inbox.
    pub fn inbox_is_empty(&self) -> Result<bool, Error> {
        self.inboxes[self.rank].is_empty()
    }
}

#[async_trait]
impl Collective for LocalCollective {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.inboxes.len()
    }

    async fn barrier(&mut self) -> Result<(), Error> {
        self.next_tag();
        self.barrier.wait().await;
        self.stats.barriers += 1;
        Ok(())
    }

    async fn broadcast_row(&mut self, root: usize, row: &mut [f64]) -> Result<(), Error> {
        check_root(root, self.size())?;
        let tag = self.next_tag();

        if self.rank == root {
            for (peer, inbox) in self.inboxes.iter().enumerate() {
                if peer != root {
                    inbox.deliver(tag, row.to_vec())?;
                }
            }
        } else {
            let received = self.inboxes[self.rank].take(tag).await?;
            install(row, &received)?;
        }

        self.stats.broadcasts += 1;
        Ok(())
    }

    fn stats(&self) -> Stats {
        self.stats
    }
}
