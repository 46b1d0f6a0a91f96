//! Testing utilities.
//!
//! Fixtures shared by unit tests and the replay integration tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use qbview_core::testing::fixtures;
//! use qbview_core::{Snapshot, TorrentState};
//!
//! let snapshot = Snapshot::create(fixtures::full_payload(vec![
//!     ("abc", fixtures::torrent("Ubuntu", TorrentState::Downloading)),
//! ]));
//! assert_eq!(snapshot.rebuilt_index(), *snapshot.index());
//! ```

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::content::{FileEntry, FilePriority};
    use crate::filters::TorrentState;
    use crate::sync::{CategoryDelta, ServerStateDelta, SyncPayload, TorrentDelta};

    /// Create a torrent delta with reasonable defaults.
    pub fn torrent(name: &str, state: TorrentState) -> TorrentDelta {
        TorrentDelta {
            name: Some(name.to_string()),
            state: Some(state),
            category: Some(String::new()),
            tags: Some(Default::default()),
            tracker: Some("udp://tracker.example.org:1337/announce".to_string()),
            trackers_count: Some(1),
            has_tracker_error: Some(false),
            has_tracker_warning: Some(false),
            has_other_announce_error: Some(false),
            progress: Some(0.0),
            size: Some(1024 * 1024 * 100), // 100 MB
            dlspeed: Some(0),
            upspeed: Some(0),
            added_on: Some(1703980800),
            ..Default::default()
        }
    }

    /// Create a full-update payload holding `torrents`, with every category
    /// and tag they reference declared.
    pub fn full_payload(torrents: Vec<(&str, TorrentDelta)>) -> SyncPayload {
        let mut categories = BTreeMap::new();
        let mut tags = Vec::new();
        for (_, delta) in &torrents {
            if let Some(category) = delta.category.as_ref().filter(|c| !c.is_empty()) {
                categories.insert(category.clone(), category_delta(category, "/downloads"));
            }
            if let Some(list) = &delta.tags {
                tags.extend(list.0.iter().cloned());
            }
        }

        SyncPayload {
            rid: Some(1),
            full_update: Some(true),
            torrents: Some(
                torrents
                    .into_iter()
                    .map(|(hash, delta)| (hash.to_string(), delta))
                    .collect(),
            ),
            categories: Some(categories),
            tags: Some(tags),
            trackers: Some(BTreeMap::new()),
            server_state: Some(server_state(false)),
            ..Default::default()
        }
    }

    /// Create a category upsert.
    pub fn category_delta(name: &str, save_path: &str) -> CategoryDelta {
        CategoryDelta {
            name: Some(name.to_string()),
            save_path: Some(format!("{}/{}", save_path, name)),
        }
    }

    /// Create a server state with the given subcategory setting.
    pub fn server_state(use_subcategories: bool) -> ServerStateDelta {
        ServerStateDelta {
            connection_status: Some("connected".to_string()),
            dl_info_speed: Some(0),
            up_info_speed: Some(0),
            refresh_interval: Some(1500),
            use_subcategories: Some(use_subcategories),
            ..Default::default()
        }
    }

    /// Create a file listing entry.
    pub fn file(
        index: i64,
        name: &str,
        size: u64,
        progress: f64,
        priority: FilePriority,
    ) -> FileEntry {
        FileEntry {
            index,
            name: name.to_string(),
            size,
            progress,
            priority,
            availability: 1.0,
        }
    }
}
