//! Per-worker inbox for rows broadcast within one process.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::Error;

/// Rows addressed to a single worker, keyed by collective sequence number.
///
/// Each inbox has exactly one consumer, its owning worker, so a single
/// stored `Notify` permit is enough to never miss a delivery.
pub struct Inbox {
    slots: Mutex<HashMap<u64, Vec<f64>>>,
    notify: Notify,
}

impl Inbox {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            notify: Notify::new(),
        }
    }

    pub fn deliver(&self, tag: u64, row: Vec<f64>) -> Result<(), Error> {
        self.slots
            .lock()
            .map_err(|_| Error::Poisoned)?
            .insert(tag, row);
        self.notify.notify_one();
        Ok(())
    }

    /// Waits until the row tagged `tag` has been delivered and removes it.
    pub async fn take(&self, tag: u64) -> Result<Vec<f64>, Error> {
        loop {
            let ready = {
                let mut slots = self.slots.lock().map_err(|_| Error::Poisoned)?;
                slots.remove(&tag)
            };
            if let Some(row) = ready {
                return Ok(row);
            }
            self.notify.notified().await;
        }
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.slots.lock().map_err(|_| Error::Poisoned)?.is_empty())
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}
