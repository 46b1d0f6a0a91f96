//! Wire payloads of the WebUI sync endpoint.
//!
//! Every field is optional: an absent field means "unchanged", never
//! "reset to default".

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::filters::TorrentState;

/// One poll response: either a full snapshot or an incremental patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncPayload {
    /// Response id to send back on the next poll.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rid: Option<u64>,
    /// True when the payload replaces all previously known state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_update: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrents: Option<BTreeMap<String, TorrentDelta>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrents_removed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeMap<String, CategoryDelta>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories_removed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags_removed: Option<Vec<String>>,
    /// Tracker URL to the hashes of the torrents announcing to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trackers: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trackers_removed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_state: Option<ServerStateDelta>,
}

impl SyncPayload {
    /// Whether this payload asks for a full rebuild.
    pub fn is_full_update(&self) -> bool {
        self.full_update.unwrap_or(false)
    }
}

/// Category upsert. The map key is the category name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "savePath", skip_serializing_if = "Option::is_none")]
    pub save_path: Option<String>,
}

/// Raw tag list of a torrent.
///
/// Accepts either a JSON array or the comma-separated string the API sends.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TagList(pub Vec<String>);

impl<'de> Deserialize<'de> for TagList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TagListVisitor;

        impl<'de> Visitor<'de> for TagListVisitor {
            type Value = TagList;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list of tags or a comma separated string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<TagList, E> {
                if value.trim().is_empty() {
                    return Ok(TagList::default());
                }
                Ok(TagList(value.split(',').map(str::to_string).collect()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TagList, A::Error> {
                let mut tags = Vec::new();
                while let Some(tag) = seq.next_element::<String>()? {
                    tags.push(tag);
                }
                Ok(TagList(tags))
            }
        }

        deserializer.deserialize_any(TagListVisitor)
    }
}

impl<S: Into<String>> FromIterator<S> for TagList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        TagList(iter.into_iter().map(Into::into).collect())
    }
}

/// Per-torrent overlay. Field names follow the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorrentDelta {
    pub name: Option<String>,
    pub infohash_v1: Option<String>,
    pub infohash_v2: Option<String>,
    pub magnet_uri: Option<String>,
    pub save_path: Option<String>,
    pub content_path: Option<String>,
    pub category: Option<String>,
    pub tags: Option<TagList>,
    pub tracker: Option<String>,
    pub trackers_count: Option<u32>,
    pub has_tracker_error: Option<bool>,
    pub has_tracker_warning: Option<bool>,
    pub has_other_announce_error: Option<bool>,
    pub state: Option<TorrentState>,
    pub progress: Option<f64>,
    pub size: Option<u64>,
    pub total_size: Option<u64>,
    pub amount_left: Option<u64>,
    pub completed: Option<u64>,
    pub downloaded: Option<u64>,
    pub uploaded: Option<u64>,
    pub downloaded_session: Option<u64>,
    pub uploaded_session: Option<u64>,
    pub dlspeed: Option<u64>,
    pub upspeed: Option<u64>,
    pub dl_limit: Option<i64>,
    pub up_limit: Option<i64>,
    pub num_seeds: Option<i64>,
    pub num_complete: Option<i64>,
    pub num_leechs: Option<i64>,
    pub num_incomplete: Option<i64>,
    pub ratio: Option<f64>,
    pub ratio_limit: Option<f64>,
    pub max_ratio: Option<f64>,
    pub seeding_time: Option<i64>,
    pub seeding_time_limit: Option<i64>,
    pub max_seeding_time: Option<i64>,
    pub time_active: Option<i64>,
    pub eta: Option<i64>,
    pub added_on: Option<i64>,
    pub completion_on: Option<i64>,
    pub last_activity: Option<i64>,
    pub seen_complete: Option<i64>,
    pub priority: Option<i64>,
    pub availability: Option<f64>,
    pub auto_tmm: Option<bool>,
    pub force_start: Option<bool>,
    pub seq_dl: Option<bool>,
    pub f_l_piece_prio: Option<bool>,
    pub super_seeding: Option<bool>,
    pub private: Option<bool>,
}

impl TorrentDelta {
    /// Delta carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_state(mut self, state: TorrentState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    pub fn with_trackers_count(mut self, count: u32) -> Self {
        self.trackers_count = Some(count);
        self
    }

    pub fn with_upspeed(mut self, upspeed: u64) -> Self {
        self.upspeed = Some(upspeed);
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// Global counters overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerStateDelta {
    pub alltime_dl: Option<u64>,
    pub alltime_ul: Option<u64>,
    pub average_time_queue: Option<i64>,
    pub connection_status: Option<String>,
    pub dht_nodes: Option<u64>,
    pub dl_info_data: Option<u64>,
    pub dl_info_speed: Option<u64>,
    pub dl_rate_limit: Option<i64>,
    pub free_space_on_disk: Option<i64>,
    pub global_ratio: Option<String>,
    pub last_external_address_v4: Option<String>,
    pub last_external_address_v6: Option<String>,
    pub queued_io_jobs: Option<u64>,
    pub queueing: Option<bool>,
    pub read_cache_hits: Option<String>,
    pub read_cache_overload: Option<String>,
    pub refresh_interval: Option<u64>,
    pub total_buffers_size: Option<u64>,
    pub total_peer_connections: Option<u64>,
    pub total_queued_size: Option<u64>,
    pub total_wasted_session: Option<u64>,
    pub up_info_data: Option<u64>,
    pub up_info_speed: Option<u64>,
    pub up_rate_limit: Option<i64>,
    pub use_alt_speed_limits: Option<bool>,
    pub use_subcategories: Option<bool>,
    pub write_cache_overload: Option<String>,
}
