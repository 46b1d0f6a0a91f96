//! Summary printed after a replay.

use std::collections::BTreeMap;

use serde::Serialize;

use qbview_core::{IndexSizes, Synchronizer};

use crate::replay::{ReplayStats, TrackedTree};

#[derive(Debug, Serialize)]
pub struct Report {
    pub rid: u64,
    pub ticks: usize,
    pub data_changes: usize,
    pub filter_changes: usize,
    pub torrents: usize,
    pub buckets: IndexSizes,
    pub content: BTreeMap<String, ContentSummary>,
}

#[derive(Debug, Serialize)]
pub struct ContentSummary {
    pub folders: usize,
    pub files: usize,
    pub listings: usize,
    pub changes: usize,
}

impl Report {
    pub fn new(
        sync: &Synchronizer,
        stats: &ReplayStats,
        trees: &BTreeMap<String, TrackedTree>,
        include_empty_buckets: bool,
    ) -> Self {
        let (torrents, buckets) = match sync.snapshot() {
            Some(snapshot) => (snapshot.torrents().len(), snapshot.index().sizes()),
            None => (0, IndexSizes::default()),
        };
        let buckets = if include_empty_buckets {
            buckets
        } else {
            buckets.without_empty()
        };

        let content = trees
            .iter()
            .map(|(hash, tracked)| {
                let folders = tracked.tree.iter().filter(|item| item.is_folder).count();
                (
                    hash.clone(),
                    ContentSummary {
                        folders,
                        files: tracked.tree.len() - folders,
                        listings: tracked.listings,
                        changes: tracked.changes,
                    },
                )
            })
            .collect();

        Self {
            rid: sync.rid(),
            ticks: stats.ticks,
            data_changes: stats.data_changes,
            filter_changes: stats.filter_changes,
            torrents,
            buckets,
            content,
        }
    }
}
