//! Error types for collective operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("peer {0} disconnected")]
    Disconnected(usize),

    #[error("broadcast length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("broadcast root {root} is outside a group of {size} workers")]
    InvalidRoot { root: usize, size: usize },

    #[error("unexpected message from peer {peer} for collective #{tag}")]
    Unexpected { tag: u64, peer: usize },

    #[error("inbox lock poisoned")]
    Poisoned,
}
