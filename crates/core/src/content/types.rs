//! Content tree value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Download priority of a file, or the rollup of a folder's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum FilePriority {
    /// Children of a folder disagree.
    Mixed,
    DoNotDownload,
    #[default]
    Normal,
    High,
    Maximum,
}

impl FilePriority {
    /// Wire value used by the API.
    pub fn as_i64(&self) -> i64 {
        match self {
            FilePriority::Mixed => -1,
            FilePriority::DoNotDownload => 0,
            FilePriority::Normal => 1,
            FilePriority::High => 6,
            FilePriority::Maximum => 7,
        }
    }

    pub fn is_wanted(&self) -> bool {
        *self != FilePriority::DoNotDownload
    }
}

impl From<i64> for FilePriority {
    fn from(value: i64) -> Self {
        match value {
            v if v < 0 => FilePriority::Mixed,
            0 => FilePriority::DoNotDownload,
            // Legacy libtorrent levels 2-5 display as normal.
            1..=5 => FilePriority::Normal,
            6 => FilePriority::High,
            _ => FilePriority::Maximum,
        }
    }
}

impl From<FilePriority> for i64 {
    fn from(priority: FilePriority) -> Self {
        priority.as_i64()
    }
}

impl fmt::Display for FilePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FilePriority::Mixed => "mixed",
            FilePriority::DoNotDownload => "do_not_download",
            FilePriority::Normal => "normal",
            FilePriority::High => "high",
            FilePriority::Maximum => "maximum",
        };
        f.write_str(label)
    }
}

/// One file of a torrent's file listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Byte index of the file inside the torrent.
    pub index: i64,
    /// Full slash-delimited path.
    pub name: String,
    #[serde(default)]
    pub size: u64,
    /// Fraction downloaded, nominally in [0, 1].
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub priority: FilePriority,
    #[serde(default)]
    pub availability: f64,
}

/// A file or folder node of a content tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    /// Last path segment.
    pub name: String,
    /// Full path; the key of this node in its tree.
    pub path: String,
    /// Path of the parent folder, `None` at the top level.
    pub parent: Option<String>,
    /// File index, or a synthetic negative index for folders.
    pub index: i64,
    pub is_folder: bool,
    pub depth: usize,
    pub size: u64,
    /// Bytes that are wanted: `size` unless the file is not downloaded.
    pub download_size: u64,
    pub progress: f64,
    pub priority: FilePriority,
    pub availability: f64,
    pub remaining: u64,
}

impl ContentItem {
    pub(crate) fn file(entry: &FileEntry, name: &str, parent: Option<String>, depth: usize) -> Self {
        let download_size = if entry.priority.is_wanted() {
            entry.size
        } else {
            0
        };
        let remaining = if entry.priority.is_wanted() {
            (entry.size as f64 * (1.0 - entry.progress.clamp(0.0, 1.0))).round() as u64
        } else {
            0
        };
        Self {
            name: name.to_string(),
            path: entry.name.clone(),
            parent,
            index: entry.index,
            is_folder: false,
            depth,
            size: entry.size,
            download_size,
            progress: entry.progress,
            priority: entry.priority,
            availability: entry.availability,
            remaining,
        }
    }

    pub(crate) fn folder(name: &str, path: &str, parent: Option<String>, index: i64, depth: usize) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            parent,
            index,
            is_folder: true,
            depth,
            size: 0,
            download_size: 0,
            progress: 0.0,
            priority: FilePriority::Normal,
            availability: 0.0,
            remaining: 0,
        }
    }
}
