//! Torrent content trees.
//!
//! Turns a torrent's flat file listing into a folder hierarchy keyed by
//! path, with each folder carrying size, progress, availability and
//! priority rolled up from its direct children.

mod tree;
mod types;

pub use tree::{ContentTree, FLOAT_TOLERANCE, PATH_SEPARATOR, PROGRESS_SNAP, UNWANTED_FOLDER};
pub use types::{ContentItem, FileEntry, FilePriority};

use thiserror::Error;

/// Errors raised while decoding file listings.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to parse file listing: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse the JSON file listing of one torrent.
pub fn parse_file_list(json: &str) -> Result<Vec<FileEntry>, ContentError> {
    Ok(serde_json::from_str(json)?)
}
