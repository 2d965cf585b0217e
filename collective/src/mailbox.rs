//! Tagged point-to-point messages between isolated ranks.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::Error;

#[derive(Debug)]
pub enum Payload {
    Arrive,
    Release,
    Row(Vec<f64>),
}

#[derive(Debug)]
pub struct Envelope {
    pub tag: u64,
    pub source: usize,
    pub payload: Payload,
}

/// Receiving end of a rank's channel.
///
/// Messages that arrive ahead of the one being waited for are parked in
/// `pending` until their `(tag, source)` is asked for.
pub struct Mailbox {
    rx: UnboundedReceiver<Envelope>,
    pending: HashMap<(u64, usize), Payload>,
}

impl Mailbox {
    pub fn new(rx: UnboundedReceiver<Envelope>) -> Self {
        Self {
            rx,
            pending: HashMap::new(),
        }
    }

    /// Waits for the message `source` sent for collective `tag`.
    pub async fn recv(&mut self, tag: u64, source: usize) -> Result<Payload, Error> {
        if let Some(payload) = self.pending.remove(&(tag, source)) {
            return Ok(payload);
        }

        while let Some(envelope) = self.rx.recv().await {
            if envelope.tag == tag && envelope.source == source {
                return Ok(envelope.payload);
            }
            self.pending
                .insert((envelope.tag, envelope.source), envelope.payload);
        }

        Err(Error::Disconnected(source))
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
