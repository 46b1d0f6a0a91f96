//! Feeding recorded payloads through the synchronizer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use qbview_core::{parse_file_list, ContentTree, Snapshot, Synchronizer};

/// Counters over one replay run.
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub ticks: usize,
    pub data_changes: usize,
    pub filter_changes: usize,
}

/// A content tree and how many listings changed it.
#[derive(Debug, Default)]
pub struct TrackedTree {
    pub tree: ContentTree,
    pub listings: usize,
    pub changes: usize,
}

/// `*.json` files of `dir`, in file name order.
pub async fn payload_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read directory {:?}", dir))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Apply every payload file in order.
pub async fn apply_payloads(sync: &mut Synchronizer, files: &[PathBuf]) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    for path in files {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        let outcome = sync
            .apply_json(&json)
            .with_context(|| format!("Invalid sync payload in {:?}", path))?;

        stats.ticks += 1;
        if outcome.data_changed {
            stats.data_changes += 1;
        }
        if outcome.filter_changed {
            stats.filter_changes += 1;
        }
        debug!(
            file = %path.display(),
            rid = sync.rid(),
            data_changed = outcome.data_changed,
            filter_changed = outcome.filter_changed,
            "applied payload"
        );
    }
    Ok(stats)
}

/// Where a file listing sits in its torrent's sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ListingSeq {
    /// `<hash>.json`
    Base,
    /// `<hash>.<n>.json`
    Numbered(u64),
    /// Any other suffix, after the numbered ones in name order.
    Named(String),
}

/// Split a listing file name into its torrent hash and sequence position.
fn listing_key(path: &Path) -> Option<(String, ListingSeq)> {
    let stem = path.file_name()?.to_str()?.strip_suffix(".json")?;
    let key = match stem.split_once('.') {
        None => (stem.to_string(), ListingSeq::Base),
        Some((hash, suffix)) => {
            let seq = match suffix.parse::<u64>() {
                Ok(n) => ListingSeq::Numbered(n),
                Err(_) => ListingSeq::Named(suffix.to_string()),
            };
            (hash.to_string(), seq)
        }
    };
    Some(key)
}

/// Build a content tree per torrent from `<hash>.json` listings.
///
/// Later listings named `<hash>.<n>.json` are merged into the same tree in
/// ascending `n`, after the base listing.
pub async fn load_content_trees(
    dir: &Path,
    snapshot: Option<&Snapshot>,
) -> Result<BTreeMap<String, TrackedTree>> {
    let mut listings: Vec<(String, ListingSeq, PathBuf)> = payload_files(dir)
        .await?
        .into_iter()
        .filter_map(|path| listing_key(&path).map(|(hash, seq)| (hash, seq, path)))
        .collect();
    listings.sort();

    let mut trees: BTreeMap<String, TrackedTree> = BTreeMap::new();
    for (hash, _, path) in listings {
        if !snapshot.is_some_and(|s| s.torrent(&hash).is_some()) {
            warn!(hash = %hash, "file listing for a torrent the snapshot does not know");
        }

        let json = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        let files = parse_file_list(&json).with_context(|| format!("Invalid file listing in {:?}", path))?;

        let tracked = trees.entry(hash.clone()).or_default();
        if tracked.tree.merge(&files) {
            tracked.changes += 1;
        }
        tracked.listings += 1;
        debug!(hash = %hash, file = %path.display(), nodes = tracked.tree.len(), "merged file listing");
    }

    info!("Built {} content trees", trees.len());
    Ok(trees)
}
