//! Snapshot synchronization.
//!
//! Applies full or incremental sync payloads to a [`Snapshot`] while keeping
//! the derived [`FilterIndex`] maps consistent with the torrents. The work is
//! synchronous and in-memory; callers serialize access through `&mut`.

mod index;
mod snapshot;
mod synchronizer;
mod torrent;
mod types;

pub use index::{Bucket, DimensionSizes, FilterIndex, IndexSizes};
pub use snapshot::{MergeOutcome, Snapshot};
pub use synchronizer::Synchronizer;
pub use torrent::{Category, FieldChanges, ServerState, Torrent};
pub use types::*;

use thiserror::Error;

/// Errors raised while decoding sync payloads.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Failed to parse sync payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
