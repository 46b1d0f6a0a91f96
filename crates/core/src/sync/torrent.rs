//! Torrent, category and server-state entities and their overlay merge.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use super::types::{CategoryDelta, ServerStateDelta, TorrentDelta};
use crate::filters::{normalize_tags, FilterFields, TorrentState};

/// Copy every present field of `$delta` onto `$target`, setting `$changed`
/// when a stored value differs.
macro_rules! overlay {
    ($target:expr, $delta:expr, $changed:ident; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $delta.$field {
                if $target.$field != value {
                    $target.$field = value;
                    $changed = true;
                }
            }
        )+
    };
}

/// What a merge of one torrent delta touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldChanges {
    /// Some stored value changed.
    pub data: bool,
    /// Some value that can move the torrent between buckets changed.
    pub filter: bool,
}

/// A torrent known to the server, keyed by its hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Torrent {
    pub hash: String,
    pub name: String,
    pub infohash_v1: String,
    pub infohash_v2: String,
    pub magnet_uri: String,
    pub save_path: String,
    pub content_path: String,
    pub category: String,
    /// Normalized, deduplicated, in display order.
    pub tags: Vec<String>,
    pub tracker: String,
    pub trackers_count: u32,
    pub has_tracker_error: bool,
    pub has_tracker_warning: bool,
    pub has_other_announce_error: bool,
    pub state: TorrentState,
    pub progress: f64,
    pub size: u64,
    pub total_size: u64,
    pub amount_left: u64,
    pub completed: u64,
    pub downloaded: u64,
    pub uploaded: u64,
    pub downloaded_session: u64,
    pub uploaded_session: u64,
    pub dlspeed: u64,
    pub upspeed: u64,
    pub dl_limit: i64,
    pub up_limit: i64,
    pub num_seeds: i64,
    pub num_complete: i64,
    pub num_leechs: i64,
    pub num_incomplete: i64,
    pub ratio: f64,
    pub ratio_limit: f64,
    pub max_ratio: f64,
    pub seeding_time: i64,
    pub seeding_time_limit: i64,
    pub max_seeding_time: i64,
    pub time_active: i64,
    pub eta: i64,
    pub added_on: i64,
    pub completion_on: i64,
    pub last_activity: i64,
    pub seen_complete: i64,
    /// Queue position.
    pub priority: i64,
    pub availability: f64,
    pub auto_tmm: bool,
    pub force_start: bool,
    pub seq_dl: bool,
    pub f_l_piece_prio: bool,
    pub super_seeding: bool,
    pub private: bool,
}

impl Torrent {
    /// Create a torrent from its first delta; absent fields take their
    /// zero value.
    pub fn from_delta(hash: impl Into<String>, delta: TorrentDelta) -> Self {
        let mut torrent = Torrent {
            hash: hash.into(),
            ..Default::default()
        };
        torrent.apply(delta);
        torrent
    }

    /// Overlay a delta onto this torrent.
    pub fn apply(&mut self, delta: TorrentDelta) -> FieldChanges {
        let mut data = false;
        let mut filter = false;

        overlay!(self, delta, filter;
            name,
            category,
            tracker,
            trackers_count,
            has_tracker_error,
            has_tracker_warning,
            has_other_announce_error,
            state,
        );
        if let Some(raw) = delta.tags {
            let tags = normalize_tags(raw.0);
            if self.tags != tags {
                self.tags = tags;
                filter = true;
            }
        }
        if let Some(upspeed) = delta.upspeed {
            if self.upspeed != upspeed {
                // Only a transition across zero can flip active/inactive.
                if (self.upspeed == 0) != (upspeed == 0) {
                    filter = true;
                }
                self.upspeed = upspeed;
                data = true;
            }
        }

        overlay!(self, delta, data;
            infohash_v1,
            infohash_v2,
            magnet_uri,
            save_path,
            content_path,
            progress,
            size,
            total_size,
            amount_left,
            completed,
            downloaded,
            uploaded,
            downloaded_session,
            uploaded_session,
            dlspeed,
            dl_limit,
            up_limit,
            num_seeds,
            num_complete,
            num_leechs,
            num_incomplete,
            ratio,
            ratio_limit,
            max_ratio,
            seeding_time,
            seeding_time_limit,
            max_seeding_time,
            time_active,
            eta,
            added_on,
            completion_on,
            last_activity,
            seen_complete,
            priority,
            availability,
            auto_tmm,
            force_start,
            seq_dl,
            f_l_piece_prio,
            super_seeding,
            private,
        );

        FieldChanges {
            data: data || filter,
            filter,
        }
    }

    /// Capture the fields that decide bucket membership.
    pub fn filter_fields(&self) -> FilterFields {
        FilterFields {
            category: self.category.clone(),
            tags: self.tags.clone(),
            tracker: self.tracker.clone(),
            trackers_count: self.trackers_count,
            has_tracker_error: self.has_tracker_error,
            has_tracker_warning: self.has_tracker_warning,
            has_other_announce_error: self.has_other_announce_error,
            state: self.state,
            upspeed: self.upspeed,
        }
    }

    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.added_on)
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.completion_on)
    }

    pub fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.last_activity)
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// A category and its save path. Hierarchy lives in the name only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub save_path: String,
}

impl Category {
    pub fn from_delta(key: &str, delta: CategoryDelta) -> Self {
        Self {
            name: delta.name.unwrap_or_else(|| key.to_string()),
            save_path: delta.save_path.unwrap_or_default(),
        }
    }

    /// Overlay a delta, returning whether anything changed.
    pub fn apply(&mut self, delta: CategoryDelta) -> bool {
        let mut changed = false;
        overlay!(self, delta, changed; name, save_path);
        changed
    }
}

/// Global transfer counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerState {
    pub alltime_dl: u64,
    pub alltime_ul: u64,
    pub average_time_queue: i64,
    pub connection_status: String,
    pub dht_nodes: u64,
    pub dl_info_data: u64,
    pub dl_info_speed: u64,
    pub dl_rate_limit: i64,
    pub free_space_on_disk: i64,
    pub global_ratio: String,
    pub last_external_address_v4: String,
    pub last_external_address_v6: String,
    pub queued_io_jobs: u64,
    pub queueing: bool,
    pub read_cache_hits: String,
    pub read_cache_overload: String,
    pub refresh_interval: u64,
    pub total_buffers_size: u64,
    pub total_peer_connections: u64,
    pub total_queued_size: u64,
    pub total_wasted_session: u64,
    pub up_info_data: u64,
    pub up_info_speed: u64,
    pub up_rate_limit: i64,
    pub use_alt_speed_limits: bool,
    pub use_subcategories: bool,
    pub write_cache_overload: String,
}

impl ServerState {
    pub fn from_delta(delta: ServerStateDelta) -> Self {
        let mut state = ServerState::default();
        state.apply(delta);
        state
    }

    /// Overlay a delta, returning whether anything changed.
    pub fn apply(&mut self, delta: ServerStateDelta) -> bool {
        let mut changed = false;
        overlay!(self, delta, changed;
            alltime_dl,
            alltime_ul,
            average_time_queue,
            connection_status,
            dht_nodes,
            dl_info_data,
            dl_info_speed,
            dl_rate_limit,
            free_space_on_disk,
            global_ratio,
            last_external_address_v4,
            last_external_address_v6,
            queued_io_jobs,
            queueing,
            read_cache_hits,
            read_cache_overload,
            refresh_interval,
            total_buffers_size,
            total_peer_connections,
            total_queued_size,
            total_wasted_session,
            up_info_data,
            up_info_speed,
            up_rate_limit,
            use_alt_speed_limits,
            use_subcategories,
            write_cache_overload,
        );
        changed
    }
}

/// Convert Unix timestamp to DateTime<Utc>.
fn timestamp_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    if ts > 0 {
        Utc.timestamp_opt(ts, 0).single()
    } else {
        None
    }
}
