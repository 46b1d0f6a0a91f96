//! Per-torrent file/folder tree with bottom-up folder rollups.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::types::{ContentItem, FileEntry, FilePriority};

/// Path segment the server uses for files it parked as unwanted.
pub const UNWANTED_FOLDER: &str = ".unwanted";

/// Separator between path segments of a file name.
pub const PATH_SEPARATOR: char = '/';

/// Tolerance when deciding whether a float field changed.
pub const FLOAT_TOLERANCE: f64 = 1e-4;

/// Folder progress at or above this is reported as exactly 1.
pub const PROGRESS_SNAP: f64 = 0.999_999;

/// The content tree of one torrent, keyed by full path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentTree {
    items: HashMap<String, ContentItem>,
}

/// Aggregated values of a folder.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rollup {
    size: u64,
    download_size: u64,
    progress: f64,
    priority: FilePriority,
    availability: f64,
    remaining: u64,
}

impl Default for Rollup {
    fn default() -> Self {
        Self {
            size: 0,
            download_size: 0,
            progress: 0.0,
            priority: FilePriority::Normal,
            availability: 0.0,
            remaining: 0,
        }
    }
}

impl Rollup {
    fn of(children: &[&ContentItem]) -> Self {
        let Some(first) = children.first() else {
            return Rollup::default();
        };

        let mut size = 0u64;
        let mut download_size = 0u64;
        let mut remaining = 0u64;
        let mut progress_weight = 0.0;
        let mut availability_weight = 0.0;
        let mut priority = first.priority;

        for child in children {
            size += child.size;
            download_size += child.download_size;
            remaining += child.remaining;
            progress_weight += child.download_size as f64 * child.progress;
            // Unwanted children still count in the denominator below.
            if child.priority.is_wanted() {
                availability_weight += child.size as f64 * child.availability;
            }
            if child.priority != priority {
                priority = FilePriority::Mixed;
            }
        }

        let progress = if download_size == 0 {
            0.0
        } else {
            clamp_progress(progress_weight / download_size as f64)
        };
        let availability = if size == 0 {
            0.0
        } else {
            availability_weight / size as f64
        };

        Self {
            size,
            download_size,
            progress,
            priority,
            availability,
            remaining,
        }
    }

    fn differs_from(&self, item: &ContentItem) -> bool {
        self.size != item.size
            || self.download_size != item.download_size
            || self.priority != item.priority
            || self.remaining != item.remaining
            || !approx_eq(self.progress, item.progress)
            || !approx_eq(self.availability, item.availability)
    }

    fn store(&self, item: &mut ContentItem) {
        item.size = self.size;
        item.download_size = self.download_size;
        item.progress = self.progress;
        item.priority = self.priority;
        item.availability = self.availability;
        item.remaining = self.remaining;
    }
}

fn clamp_progress(progress: f64) -> f64 {
    let progress = progress.clamp(0.0, 1.0);
    if progress >= PROGRESS_SNAP {
        1.0
    } else {
        progress
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < FLOAT_TOLERANCE
}

/// Whether a file node's displayed values differ.
fn file_differs(old: &ContentItem, new: &ContentItem) -> bool {
    old.is_folder != new.is_folder
        || old.priority != new.priority
        || old.size != new.size
        || old.download_size != new.download_size
        || !approx_eq(old.progress, new.progress)
        || !approx_eq(old.availability, new.availability)
}

impl ContentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a complete file listing.
    pub fn build(files: &[FileEntry]) -> Self {
        let mut tree = Self::new();
        tree.merge(files);
        tree
    }

    /// Reconcile the tree against a complete file listing.
    ///
    /// Files are upserted in place, missing folders created, folder rollups
    /// recomputed deepest-first, and every node the listing no longer
    /// implies is dropped. Returns whether any node was added, removed or
    /// changed.
    pub fn merge(&mut self, files: &[FileEntry]) -> bool {
        if files.is_empty() {
            let changed = !self.items.is_empty();
            self.items.clear();
            return changed;
        }

        let mut changed = false;
        let lowest = self
            .items
            .values()
            .map(|item| item.index)
            .chain(files.iter().map(|file| file.index))
            .min()
            .unwrap_or(0);
        let mut next_folder_index = lowest.min(0).saturating_sub(1);

        let mut seen: HashSet<String> = HashSet::with_capacity(files.len());
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut folders: Vec<(usize, String)> = Vec::new();

        for file in files {
            let segments: Vec<&str> = file.name.split(PATH_SEPARATOR).collect();
            let Some((file_name, folder_segments)) = segments.split_last() else {
                continue;
            };

            let mut parent: Option<String> = None;
            let mut depth = 0;
            for segment in folder_segments {
                if segment.is_empty() || *segment == UNWANTED_FOLDER {
                    continue;
                }
                let path = match &parent {
                    Some(parent) => format!("{}{}{}", parent, PATH_SEPARATOR, segment),
                    None => segment.to_string(),
                };
                if seen.insert(path.clone()) {
                    if let Some(parent) = &parent {
                        children.entry(parent.clone()).or_default().push(path.clone());
                    }
                    folders.push((depth, path.clone()));
                    let needs_folder = self.items.get(&path).map_or(true, |item| !item.is_folder);
                    if needs_folder {
                        trace!(path = %path, index = next_folder_index, "creating folder");
                        self.items.insert(
                            path.clone(),
                            ContentItem::folder(segment, &path, parent.clone(), next_folder_index, depth),
                        );
                        next_folder_index = next_folder_index.saturating_sub(1);
                        changed = true;
                    }
                }
                parent = Some(path);
                depth += 1;
            }

            let item = ContentItem::file(file, file_name, parent.clone(), depth);
            if seen.insert(file.name.clone()) {
                if let Some(parent) = &parent {
                    children.entry(parent.clone()).or_default().push(file.name.clone());
                }
            }
            match self.items.get_mut(&file.name) {
                Some(existing) => {
                    if file_differs(existing, &item) {
                        changed = true;
                    }
                    *existing = item;
                }
                None => {
                    self.items.insert(file.name.clone(), item);
                    changed = true;
                }
            }
        }

        // Deepest first, so every parent sees finalized children.
        folders.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, path) in &folders {
            let rollup = {
                let members: Vec<&ContentItem> = children
                    .get(path)
                    .map(|paths| paths.iter().filter_map(|p| self.items.get(p)).collect())
                    .unwrap_or_default();
                Rollup::of(&members)
            };
            if let Some(folder) = self.items.get_mut(path) {
                if rollup.differs_from(folder) {
                    changed = true;
                }
                rollup.store(folder);
            }
        }

        let before = self.items.len();
        self.items.retain(|path, _| seen.contains(path));
        if self.items.len() != before {
            changed = true;
        }

        debug!(
            files = files.len(),
            folders = folders.len(),
            removed = before - self.items.len(),
            changed,
            "merged content tree"
        );
        changed
    }

    pub fn get(&self, path: &str) -> Option<&ContentItem> {
        self.items.get(path)
    }

    /// All nodes keyed by full path.
    pub fn items(&self) -> &HashMap<String, ContentItem> {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Direct children of `path` (top-level nodes for `None`), folders
    /// first, then files by index.
    pub fn children(&self, path: Option<&str>) -> Vec<&ContentItem> {
        let mut children: Vec<&ContentItem> = self
            .items
            .values()
            .filter(|item| item.parent.as_deref() == path)
            .collect();
        children.sort_by_key(|item| item.index);
        children
    }

    pub fn roots(&self) -> Vec<&ContentItem> {
        self.children(None)
    }
}
