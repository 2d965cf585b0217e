//! Message-passing backend: isolated ranks joined only by mailboxes.
//!
//! No state is shared between ranks. A barrier is a gather of `Arrive`
//! messages on rank 0 followed by a `Release` to every other rank, and a
//! broadcast is one tagged `Row` message from the root to each peer.

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::trace;

use crate::mailbox::{Envelope, Mailbox, Payload};
use crate::{Collective, Error, Stats, check_root, install};

const COORDINATOR: usize = 0;

/// Endpoint of one rank in a message-passing world.
pub struct DistributedCollective {
    rank: usize,
    outboxes: Vec<Option<UnboundedSender<Envelope>>>,
    mailbox: Mailbox,
    sequence: u64,
    stats: Stats,
}

/// Creates a world of `size` ranks and returns one endpoint per rank.
///
/// A rank holds senders to every peer but never to itself, so a mailbox
/// reports [`Error::Disconnected`] once all of its peers are gone.
pub fn world(size: usize) -> Vec<DistributedCollective> {
    let (senders, receivers): (Vec<_>, Vec<_>) =
        (0..size).map(|_| mpsc::unbounded_channel()).unzip();

    receivers
        .into_iter()
        .enumerate()
        .map(|(rank, rx)| DistributedCollective {
            rank,
            outboxes: senders
                .iter()
                .enumerate()
                .map(|(peer, tx)| (peer != rank).then(|| tx.clone()))
                .collect(),
            mailbox: Mailbox::new(rx),
            sequence: 0,
            stats: Stats::default(),
        })
        .collect()
}

impl DistributedCollective {
    fn next_tag(&mut self) -> u64 {
        let tag = self.sequence;
        self.sequence += 1;
        tag
    }

    fn send(&self, peer: usize, tag: u64, payload: Payload) -> Result<(), Error> {
        let tx = self.outboxes[peer]
            .as_ref()
            .ok_or(Error::Disconnected(peer))?;
        tx.send(Envelope {
            tag,
            source: self.rank,
            payload,
        })
        .map_err(|_| Error::Disconnected(peer))
    }

    /// Number of messages received ahead of the collective they belong to.
    pub fn pending(&self) -> usize {
        self.mailbox.pending()
    }
}

#[async_trait]
impl Collective for DistributedCollective {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.outboxes.len()
    }

    async fn barrier(&mut self) -> Result<(), Error> {
        let tag = self.next_tag();

        if self.rank == COORDINATOR {
            for peer in 1..self.size() {
                match self.mailbox.recv(tag, peer).await? {
                    Payload::Arrive => {}
                    _ => return Err(Error::Unexpected { tag, peer }),
                }
            }
            for peer in 1..self.size() {
                self.send(peer, tag, Payload::Release)?;
            }
            trace!(tag, "barrier released");
        } else {
            self.send(COORDINATOR, tag, Payload::Arrive)?;
            match self.mailbox.recv(tag, COORDINATOR).await? {
                Payload::Release => {}
                _ => {
                    return Err(Error::Unexpected {
                        tag,
                        peer: COORDINATOR,
                    });
                }
            }
        }

        self.stats.barriers += 1;
        Ok(())
    }

    async fn broadcast_row(&mut self, root: usize, row: &mut [f64]) -> Result<(), Error> {
        check_root(root, self.size())?;
        let tag = self.next_tag();

        if self.rank == root {
            for peer in (0..self.size()).filter(|&peer| peer != root) {
                self.send(peer, tag, Payload::Row(row.to_vec()))?;
            }
        } else {
            match self.mailbox.recv(tag, root).await? {
                Payload::Row(received) => install(row, &received)?,
                _ => return Err(Error::Unexpected { tag, peer: root }),
            }
        }

        self.stats.broadcasts += 1;
        Ok(())
    }

    fn stats(&self) -> Stats {
        self.stats
    }
}
