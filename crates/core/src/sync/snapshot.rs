//! The snapshot aggregate and its full/incremental merge.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use super::index::{FilterIndex, IndexContext};
use super::torrent::{Category, ServerState, Torrent};
use super::types::SyncPayload;
use crate::filters::{normalize_tag, normalize_tags};

/// What a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// Some displayed value changed; consumers should re-render.
    pub data_changed: bool,
    /// Bucket membership or the bucket set changed; consumers should also
    /// recompute the filtered torrent lists.
    pub filter_changed: bool,
}

impl MergeOutcome {
    /// Outcome of a full rebuild.
    pub const REBUILT: MergeOutcome = MergeOutcome {
        data_changed: true,
        filter_changed: true,
    };

    pub fn is_unchanged(&self) -> bool {
        !self.data_changed && !self.filter_changed
    }

    fn mark_filter(&mut self) {
        self.data_changed = true;
        self.filter_changed = true;
    }
}

/// All torrents, categories, tags, trackers and server counters, plus the
/// four derived indexes kept in sync with them.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    torrents: HashMap<String, Torrent>,
    tags: BTreeSet<String>,
    categories: BTreeMap<String, Category>,
    trackers: BTreeMap<String, Vec<String>>,
    server_state: ServerState,
    index: FilterIndex,
}

#[derive(Debug, Default)]
struct MergeStats {
    added: usize,
    updated: usize,
    removed: usize,
    excluded_tracker_hashes: usize,
}

impl Snapshot {
    /// Build a snapshot from a complete payload.
    ///
    /// Removal lists are ignored; absent fields take their zero value.
    pub fn create(payload: SyncPayload) -> Self {
        let torrents: HashMap<String, Torrent> = payload
            .torrents
            .unwrap_or_default()
            .into_iter()
            .map(|(hash, delta)| {
                let torrent = Torrent::from_delta(hash.clone(), delta);
                (hash, torrent)
            })
            .collect();
        let categories = payload
            .categories
            .unwrap_or_default()
            .into_iter()
            .map(|(name, delta)| {
                let category = Category::from_delta(&name, delta);
                (name, category)
            })
            .collect();

        let mut snapshot = Snapshot {
            torrents,
            tags: normalize_tags(payload.tags.unwrap_or_default())
                .into_iter()
                .collect(),
            categories,
            trackers: payload.trackers.unwrap_or_default(),
            server_state: payload
                .server_state
                .map(ServerState::from_delta)
                .unwrap_or_default(),
            index: FilterIndex::new(),
        };
        let index = FilterIndex::build(&snapshot.context());
        snapshot.index = index;

        debug!(
            torrents = snapshot.torrents.len(),
            categories = snapshot.categories.len(),
            tags = snapshot.tags.len(),
            trackers = snapshot.trackers.len(),
            "built snapshot"
        );
        snapshot
    }

    /// Apply an incremental payload.
    ///
    /// Removals (categories, tags, trackers, torrents) are processed before
    /// upserts (categories, tags, trackers, torrents, server state).
    pub fn merge(&mut self, payload: SyncPayload) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        let mut stats = MergeStats::default();

        for name in payload.categories_removed.unwrap_or_default() {
            if self.categories.remove(&name).is_some() {
                let (index, ctx) = self.index_parts();
                index.prune_category(&name, &ctx);
                outcome.mark_filter();
            }
        }

        for raw in payload.tags_removed.unwrap_or_default() {
            let Some(tag) = normalize_tag(&raw) else {
                continue;
            };
            if self.tags.remove(&tag) {
                let (index, ctx) = self.index_parts();
                index.prune_tag(&tag, &ctx);
                outcome.mark_filter();
            }
        }

        for url in payload.trackers_removed.unwrap_or_default() {
            if self.trackers.remove(&url).is_some() {
                self.index.remove_tracker(&url);
                outcome.mark_filter();
            }
        }

        for hash in payload.torrents_removed.unwrap_or_default() {
            if self.remove_torrent(&hash) {
                stats.removed += 1;
                outcome.mark_filter();
            }
        }

        for (name, delta) in payload.categories.unwrap_or_default() {
            match self.categories.get_mut(&name) {
                Some(category) => {
                    if category.apply(delta) {
                        outcome.data_changed = true;
                    }
                }
                None => {
                    let category = Category::from_delta(&name, delta);
                    self.categories.insert(name.clone(), category);
                    self.index
                        .add_category(&name, self.server_state.use_subcategories);
                    outcome.mark_filter();
                }
            }
        }

        for tag in normalize_tags(payload.tags.unwrap_or_default()) {
            if self.tags.insert(tag.clone()) {
                self.index.add_tag(&tag);
                outcome.mark_filter();
            }
        }

        for (url, hashes) in payload.trackers.unwrap_or_default() {
            if self.trackers.get(&url) == Some(&hashes) {
                continue;
            }
            self.trackers.insert(url.clone(), hashes);
            let (index, ctx) = self.index_parts();
            let hashes = &ctx.trackers[&url];
            stats.excluded_tracker_hashes += index.set_tracker(&url, hashes, &ctx);
            outcome.mark_filter();
        }

        for (hash, delta) in payload.torrents.unwrap_or_default() {
            match self.torrents.get_mut(&hash) {
                Some(torrent) => {
                    let before = torrent.filter_fields();
                    let changes = torrent.apply(delta);
                    if changes.data {
                        stats.updated += 1;
                        outcome.data_changed = true;
                    }
                    if changes.filter {
                        outcome.filter_changed = true;
                        let after = torrent.filter_fields();
                        if before != after {
                            let (index, ctx) = self.index_parts();
                            index.patch_torrent(&hash, &before, &after, &ctx);
                        }
                    }
                }
                None => {
                    let torrent = Torrent::from_delta(hash.clone(), delta);
                    let fields = torrent.filter_fields();
                    self.torrents.insert(hash.clone(), torrent);
                    let (index, ctx) = self.index_parts();
                    index.insert_torrent(&hash, &fields, &ctx);
                    stats.added += 1;
                    outcome.mark_filter();
                }
            }
        }

        if let Some(delta) = payload.server_state {
            let used_subcategories = self.server_state.use_subcategories;
            if self.server_state.apply(delta) {
                outcome.data_changed = true;
            }
            if self.server_state.use_subcategories != used_subcategories {
                let (index, ctx) = self.index_parts();
                index.rebuild_categories(&ctx);
                outcome.filter_changed = true;
            }
        }

        debug!(
            added = stats.added,
            updated = stats.updated,
            removed = stats.removed,
            excluded_tracker_hashes = stats.excluded_tracker_hashes,
            data_changed = outcome.data_changed,
            filter_changed = outcome.filter_changed,
            "merged sync payload"
        );
        outcome
    }

    fn remove_torrent(&mut self, hash: &str) -> bool {
        let Some(torrent) = self.torrents.remove(hash) else {
            return false;
        };
        let before = torrent.filter_fields();
        let (index, ctx) = self.index_parts();
        index.remove_torrent(hash, &before, &ctx);
        true
    }

    fn context(&self) -> IndexContext<'_> {
        IndexContext {
            torrents: &self.torrents,
            tags: &self.tags,
            categories: &self.categories,
            trackers: &self.trackers,
            use_subcategories: self.server_state.use_subcategories,
        }
    }

    fn index_parts(&mut self) -> (&mut FilterIndex, IndexContext<'_>) {
        let ctx = IndexContext {
            torrents: &self.torrents,
            tags: &self.tags,
            categories: &self.categories,
            trackers: &self.trackers,
            use_subcategories: self.server_state.use_subcategories,
        };
        (&mut self.index, ctx)
    }

    pub fn torrents(&self) -> &HashMap<String, Torrent> {
        &self.torrents
    }

    pub fn torrent(&self, hash: &str) -> Option<&Torrent> {
        self.torrents.get(hash)
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn categories(&self) -> &BTreeMap<String, Category> {
        &self.categories
    }

    /// Tracker URL to hashes, as reported by the server.
    pub fn trackers(&self) -> &BTreeMap<String, Vec<String>> {
        &self.trackers
    }

    pub fn server_state(&self) -> &ServerState {
        &self.server_state
    }

    pub fn index(&self) -> &FilterIndex {
        &self.index
    }

    /// Recompute every index from scratch.
    ///
    /// The incrementally maintained [`Snapshot::index`] must always equal
    /// this.
    pub fn rebuilt_index(&self) -> FilterIndex {
        FilterIndex::build(&self.context())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::filters::{CategoryBucket, StatusFilter, TagBucket, TorrentState, TrackerBucket};
    use crate::sync::{ServerStateDelta, TorrentDelta};
    use crate::testing::fixtures;

    fn assert_consistent(snapshot: &Snapshot) {
        let keys: HashSet<String> = snapshot.torrents().keys().cloned().collect();
        let index = snapshot.index();
        assert_eq!(index.tags[&TagBucket::All], keys);
        assert_eq!(index.categories[&CategoryBucket::All], keys);
        assert_eq!(index.statuses[&StatusFilter::All], keys);
        assert_eq!(index.trackers[&TrackerBucket::All], keys);
        assert_eq!(*index, snapshot.rebuilt_index());
    }

    fn torrents(entries: Vec<(&str, TorrentDelta)>) -> Option<BTreeMap<String, TorrentDelta>> {
        Some(
            entries
                .into_iter()
                .map(|(hash, delta)| (hash.to_string(), delta))
                .collect(),
        )
    }

    fn sample() -> Snapshot {
        let mut payload = fixtures::full_payload(vec![
            (
                "aaa",
                fixtures::torrent("Ubuntu", TorrentState::Downloading)
                    .with_category("linux/iso")
                    .with_tags(["distro"]),
            ),
            (
                "bbb",
                fixtures::torrent("Debian", TorrentState::StalledUp).with_category("linux"),
            ),
            ("ccc", fixtures::torrent("Notes", TorrentState::StoppedDl)),
        ]);
        payload.trackers = Some(
            [(
                "udp://tracker.example.org:1337/announce".to_string(),
                vec!["aaa".to_string(), "bbb".to_string()],
            )]
            .into_iter()
            .collect(),
        );
        Snapshot::create(payload)
    }

    #[test]
    fn test_create_builds_indexes() {
        let snapshot = sample();
        assert_consistent(&snapshot);

        let index = snapshot.index();
        assert!(index.statuses[&StatusFilter::Downloading].contains("aaa"));
        assert!(index.statuses[&StatusFilter::Stopped].contains("ccc"));
        assert!(index.statuses[&StatusFilter::Seeding].contains("bbb"));
        assert!(index.categories[&CategoryBucket::Uncategorized].contains("ccc"));
        assert!(index.tags[&TagBucket::Untagged].contains("bbb"));
        assert_eq!(index.tags[&TagBucket::Tag("distro".to_string())].len(), 1);
        assert_eq!(
            index.trackers[&TrackerBucket::Url(
                "udp://tracker.example.org:1337/announce".to_string()
            )]
            .len(),
            2
        );
    }

    #[test]
    fn test_sizes_keep_named_buckets_apart_from_builtin() {
        let snapshot = Snapshot::create(fixtures::full_payload(vec![
            (
                "aaa",
                fixtures::torrent("a", TorrentState::Downloading)
                    .with_category("[uncategorized]")
                    .with_tags(["[all]"]),
            ),
            ("bbb", fixtures::torrent("b", TorrentState::Downloading)),
        ]));
        assert_consistent(&snapshot);

        let sizes = snapshot.index().sizes();
        assert_eq!(sizes.tags.builtin["[all]"], 2);
        assert_eq!(sizes.tags.builtin["[untagged]"], 1);
        assert_eq!(sizes.tags.named["[all]"], 1);
        assert_eq!(sizes.categories.builtin["[uncategorized]"], 1);
        assert_eq!(sizes.categories.named["[uncategorized]"], 1);
        assert_eq!(sizes.statuses["downloading"], 2);
        assert_eq!(sizes.trackers.builtin["[all]"], 2);
        assert!(sizes.trackers.named.is_empty());

        let trimmed = sizes.without_empty();
        assert!(!trimmed.statuses.contains_key("seeding"));
        assert!(trimmed.tags.named.contains_key("[all]"));
    }

    #[test]
    fn test_create_uses_fallbacks() {
        let mut payload = SyncPayload::default();
        payload.torrents = torrents(vec![("aaa", TorrentDelta::default())]);
        let snapshot = Snapshot::create(payload);

        let torrent = snapshot.torrent("aaa").unwrap();
        assert_eq!(torrent.name, "");
        assert_eq!(torrent.trackers_count, 0);
        assert!(!snapshot.server_state().use_subcategories);

        let index = snapshot.index();
        assert!(index.trackers[&TrackerBucket::Trackerless].contains("aaa"));
        assert!(index.statuses[&StatusFilter::Errored].contains("aaa"));
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_tag_normalization() {
        let mut payload = fixtures::full_payload(vec![(
            "aaa",
            fixtures::torrent("t", TorrentState::Uploading).with_tags([" tagA\tid", "", "tagB"]),
        )]);
        payload.tags = Some(vec![" tagA\tid".to_string(), "tagB".to_string()]);
        let snapshot = Snapshot::create(payload);

        assert_eq!(snapshot.torrent("aaa").unwrap().tags, vec!["tagA", "tagB"]);
        let tags: Vec<&String> = snapshot.tags().iter().collect();
        assert_eq!(tags, vec!["tagA", "tagB"]);

        let index = snapshot.index();
        assert!(!index.tags[&TagBucket::Untagged].contains("aaa"));
        assert!(index.tags[&TagBucket::Tag("tagA".to_string())].contains("aaa"));
        assert!(index.tags[&TagBucket::Tag("tagB".to_string())].contains("aaa"));
        assert!(!index.tags.contains_key(&TagBucket::Tag(String::new())));
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_category_hierarchy() {
        let mut payload = fixtures::full_payload(vec![(
            "aaa",
            fixtures::torrent("t", TorrentState::Uploading).with_category("A/B"),
        )]);
        payload.server_state = Some(fixtures::server_state(true));
        let snapshot = Snapshot::create(payload);

        let index = snapshot.index();
        assert!(index.categories[&CategoryBucket::Category("A/B".to_string())].contains("aaa"));
        assert!(index.categories[&CategoryBucket::Category("A".to_string())].contains("aaa"));
        assert!(!index.categories[&CategoryBucket::Uncategorized].contains("aaa"));
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_category_hierarchy_off() {
        let snapshot = Snapshot::create(fixtures::full_payload(vec![(
            "aaa",
            fixtures::torrent("t", TorrentState::Uploading).with_category("A/B"),
        )]));
        let index = snapshot.index();
        assert!(index.categories[&CategoryBucket::Category("A/B".to_string())].contains("aaa"));
        assert!(!index
            .categories
            .contains_key(&CategoryBucket::Category("A".to_string())));
    }

    #[test]
    fn test_tracker_filtering() {
        let mut snapshot = sample();
        let outcome = snapshot.merge(SyncPayload {
            trackers: Some(
                [(
                    "https://other.example.org/announce".to_string(),
                    vec!["aaa".to_string(), "ghost".to_string()],
                )]
                .into_iter()
                .collect(),
            ),
            ..Default::default()
        });
        assert!(outcome.filter_changed);

        let bucket = &snapshot.index().trackers[&TrackerBucket::Url(
            "https://other.example.org/announce".to_string(),
        )];
        assert_eq!(bucket.len(), 1);
        assert!(bucket.contains("aaa"));
        // The server map itself is stored verbatim.
        assert_eq!(snapshot.trackers()["https://other.example.org/announce"].len(), 2);
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_tracker_listed_before_torrent_exists() {
        let mut snapshot = sample();
        snapshot.merge(SyncPayload {
            trackers: Some(
                [(
                    "https://new.example.org/announce".to_string(),
                    vec!["ddd".to_string()],
                )]
                .into_iter()
                .collect(),
            ),
            torrents: torrents(vec![(
                "ddd",
                fixtures::torrent("New", TorrentState::MetaDl),
            )]),
            ..Default::default()
        });

        let bucket = &snapshot.index().trackers
            [&TrackerBucket::Url("https://new.example.org/announce".to_string())];
        assert!(bucket.contains("ddd"));
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_noop_payload() {
        let mut snapshot = sample();
        let before = snapshot.clone();
        let outcome = snapshot.merge(SyncPayload::default());

        assert!(outcome.is_unchanged());
        assert_eq!(snapshot.torrents(), before.torrents());
        assert_eq!(snapshot.index(), before.index());
    }

    #[test]
    fn test_idempotent_removal() {
        let mut snapshot = sample();
        let removal = SyncPayload {
            torrents_removed: Some(vec!["aaa".to_string()]),
            tags_removed: Some(vec!["distro".to_string()]),
            categories_removed: Some(vec!["linux/iso".to_string()]),
            ..Default::default()
        };

        let first = snapshot.merge(removal.clone());
        assert_eq!(first, MergeOutcome::REBUILT);
        assert!(snapshot.torrent("aaa").is_none());
        assert!(!snapshot
            .index()
            .tags
            .contains_key(&TagBucket::Tag("distro".to_string())));
        assert_consistent(&snapshot);

        let state = snapshot.clone();
        let second = snapshot.merge(removal);
        assert!(second.is_unchanged());
        assert_eq!(snapshot.index(), state.index());
        assert_eq!(snapshot.torrents(), state.torrents());
    }

    #[test]
    fn test_removed_torrent_leaves_every_bucket() {
        let mut snapshot = sample();
        snapshot.merge(SyncPayload {
            torrents_removed: Some(vec!["bbb".to_string()]),
            ..Default::default()
        });

        let index = snapshot.index();
        let holds_bbb = |bucket: &HashSet<String>| bucket.contains("bbb");
        assert!(!index.tags.values().any(holds_bbb));
        assert!(!index.categories.values().any(holds_bbb));
        assert!(!index.statuses.values().any(holds_bbb));
        assert!(!index.trackers.values().any(holds_bbb));
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_speed_only_tick_is_data_only() {
        let mut snapshot = sample();
        let outcome = snapshot.merge(SyncPayload {
            torrents: torrents(vec![(
                "aaa",
                TorrentDelta {
                    dlspeed: Some(2048),
                    progress: Some(0.25),
                    ..Default::default()
                },
            )]),
            server_state: Some(ServerStateDelta {
                dl_info_speed: Some(2048),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert!(outcome.data_changed);
        assert!(!outcome.filter_changed);
        assert_eq!(snapshot.torrent("aaa").unwrap().dlspeed, 2048);
        assert_eq!(snapshot.server_state().dl_info_speed, 2048);
    }

    #[test]
    fn test_filter_fields_patch_buckets() {
        let mut snapshot = sample();
        let outcome = snapshot.merge(SyncPayload {
            torrents: torrents(vec![
                (
                    "aaa",
                    TorrentDelta::default()
                        .with_state(TorrentState::Uploading)
                        .with_category("")
                        .with_tags(Vec::<String>::new()),
                ),
                (
                    "ccc",
                    TorrentDelta {
                        has_tracker_error: Some(true),
                        trackers_count: Some(0),
                        ..Default::default()
                    }
                    .with_category("linux"),
                ),
            ]),
            ..Default::default()
        });
        assert!(outcome.filter_changed);

        let index = snapshot.index();
        assert!(index.statuses[&StatusFilter::Seeding].contains("aaa"));
        assert!(!index.statuses[&StatusFilter::Downloading].contains("aaa"));
        assert!(index.categories[&CategoryBucket::Uncategorized].contains("aaa"));
        assert!(index.tags[&TagBucket::Untagged].contains("aaa"));
        assert!(index.tags[&TagBucket::Tag("distro".to_string())].is_empty());
        assert!(index.trackers[&TrackerBucket::Error].contains("ccc"));
        assert!(index.trackers[&TrackerBucket::Trackerless].contains("ccc"));
        assert!(index.categories[&CategoryBucket::Category("linux".to_string())].contains("ccc"));
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_upspeed_crossing_zero_moves_stalled_download() {
        let mut snapshot = Snapshot::create(fixtures::full_payload(vec![(
            "aaa",
            fixtures::torrent("t", TorrentState::StalledDl),
        )]));
        assert!(snapshot.index().statuses[&StatusFilter::Inactive].contains("aaa"));

        let outcome = snapshot.merge(SyncPayload {
            torrents: torrents(vec![("aaa", TorrentDelta::default().with_upspeed(64))]),
            ..Default::default()
        });
        assert!(outcome.filter_changed);
        assert!(snapshot.index().statuses[&StatusFilter::Active].contains("aaa"));
        assert!(!snapshot.index().statuses[&StatusFilter::Inactive].contains("aaa"));
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_unknown_category_bucket_follows_members() {
        let mut snapshot = sample();
        snapshot.merge(SyncPayload {
            torrents: torrents(vec![("ccc", TorrentDelta::default().with_category("adhoc"))]),
            ..Default::default()
        });
        let key = CategoryBucket::Category("adhoc".to_string());
        assert!(snapshot.index().categories[&key].contains("ccc"));
        assert_consistent(&snapshot);

        snapshot.merge(SyncPayload {
            torrents: torrents(vec![("ccc", TorrentDelta::default().with_category(""))]),
            ..Default::default()
        });
        assert!(!snapshot.index().categories.contains_key(&key));
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_category_removed_while_referenced() {
        let mut snapshot = sample();
        let key = CategoryBucket::Category("linux".to_string());

        snapshot.merge(SyncPayload {
            categories_removed: Some(vec!["linux".to_string()]),
            ..Default::default()
        });
        assert!(snapshot.categories().get("linux").is_none());
        assert!(snapshot.index().categories[&key].contains("bbb"));
        assert_consistent(&snapshot);

        snapshot.merge(SyncPayload {
            torrents: torrents(vec![("bbb", TorrentDelta::default().with_category(""))]),
            ..Default::default()
        });
        assert!(!snapshot.index().categories.contains_key(&key));
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_new_category_and_tag_get_empty_buckets() {
        let mut snapshot = sample();
        let outcome = snapshot.merge(SyncPayload {
            categories: Some(
                [("Movies/HD".to_string(), fixtures::category_delta("Movies/HD", "/data"))]
                    .into_iter()
                    .collect(),
            ),
            tags: Some(vec!["later".to_string()]),
            ..Default::default()
        });
        assert_eq!(outcome, MergeOutcome::REBUILT);

        let index = snapshot.index();
        assert!(index.categories[&CategoryBucket::Category("Movies/HD".to_string())].is_empty());
        assert!(index.tags[&TagBucket::Tag("later".to_string())].is_empty());
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_category_save_path_change_is_data_only() {
        let mut snapshot = sample();
        let outcome = snapshot.merge(SyncPayload {
            categories: Some(
                [("linux".to_string(), fixtures::category_delta("linux", "/mnt"))]
                    .into_iter()
                    .collect(),
            ),
            ..Default::default()
        });
        assert!(outcome.data_changed);
        assert!(!outcome.filter_changed);
        assert_eq!(snapshot.categories()["linux"].save_path, "/mnt/linux");
    }

    #[test]
    fn test_toggling_subcategories_rebuilds_category_index() {
        let mut snapshot = sample();
        let parent = CategoryBucket::Category("linux".to_string());
        assert!(!snapshot.index().categories[&parent].contains("aaa"));

        let outcome = snapshot.merge(SyncPayload {
            server_state: Some(ServerStateDelta {
                use_subcategories: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(outcome.filter_changed);
        assert!(snapshot.index().categories[&parent].contains("aaa"));
        assert!(snapshot.index().categories[&parent].contains("bbb"));
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_tracker_removed() {
        let mut snapshot = sample();
        let url = "udp://tracker.example.org:1337/announce".to_string();
        let outcome = snapshot.merge(SyncPayload {
            trackers_removed: Some(vec![url.clone()]),
            ..Default::default()
        });
        assert!(outcome.filter_changed);
        assert!(!snapshot.index().trackers.contains_key(&TrackerBucket::Url(url)));
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_long_sequence_stays_consistent() {
        let mut snapshot = sample();
        let steps = vec![
            SyncPayload {
                torrents: torrents(vec![
                    ("ddd", fixtures::torrent("Fresh", TorrentState::QueuedDl).with_tags(["x"])),
                    ("aaa", TorrentDelta::default().with_tags(["x", "distro"])),
                ]),
                ..Default::default()
            },
            SyncPayload {
                server_state: Some(fixtures::server_state(true)),
                torrents: torrents(vec![(
                    "ddd",
                    TorrentDelta::default().with_category("linux/iso/old"),
                )]),
                ..Default::default()
            },
            SyncPayload {
                tags_removed: Some(vec!["x".to_string()]),
                torrents_removed: Some(vec!["aaa".to_string()]),
                ..Default::default()
            },
            SyncPayload {
                categories_removed: Some(vec!["linux/iso".to_string()]),
                torrents: torrents(vec![(
                    "bbb",
                    TorrentDelta {
                        has_tracker_warning: Some(true),
                        ..Default::default()
                    },
                )]),
                ..Default::default()
            },
            SyncPayload {
                server_state: Some(fixtures::server_state(false)),
                torrents: torrents(vec![("ddd", TorrentDelta::default().with_tags(Vec::<String>::new()))]),
                ..Default::default()
            },
        ];

        for step in steps {
            snapshot.merge(step);
            assert_consistent(&snapshot);
        }
        assert_eq!(snapshot.torrents().len(), 3);
    }
}
