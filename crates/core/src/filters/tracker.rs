//! Tracker buckets.

use std::fmt;

use serde::Serialize;

use super::FilterFields;

/// Key of a tracker bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerBucket {
    All,
    Trackerless,
    Error,
    Warning,
    AnnounceError,
    Url(String),
}

impl TrackerBucket {
    /// Synthetic buckets that always exist.
    pub const SYNTHETIC: [TrackerBucket; 5] = [
        TrackerBucket::All,
        TrackerBucket::Trackerless,
        TrackerBucket::Error,
        TrackerBucket::Warning,
        TrackerBucket::AnnounceError,
    ];

    /// The tracker URL, `None` for synthetic buckets.
    pub fn url(&self) -> Option<&str> {
        match self {
            TrackerBucket::Url(url) => Some(url.as_str()),
            _ => None,
        }
    }

    /// Whether a torrent belongs to this bucket.
    ///
    /// URL buckets are decided by the server's tracker list, not by the
    /// torrent's own fields.
    pub fn matches(&self, hash: &str, fields: &FilterFields, server_list: Option<&[String]>) -> bool {
        match self {
            TrackerBucket::All => true,
            TrackerBucket::Trackerless => fields.trackers_count == 0,
            TrackerBucket::Error => fields.has_tracker_error,
            TrackerBucket::Warning => fields.has_tracker_warning,
            TrackerBucket::AnnounceError => fields.has_other_announce_error,
            TrackerBucket::Url(_) => server_list.is_some_and(|list| list.iter().any(|h| h == hash)),
        }
    }
}

impl fmt::Display for TrackerBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerBucket::All => f.write_str("[all]"),
            TrackerBucket::Trackerless => f.write_str("[trackerless]"),
            TrackerBucket::Error => f.write_str("[error]"),
            TrackerBucket::Warning => f.write_str("[warning]"),
            TrackerBucket::AnnounceError => f.write_str("[announce_error]"),
            TrackerBucket::Url(url) => f.write_str(url),
        }
    }
}

/// Synthetic tracker buckets a torrent belongs to (URL buckets excluded).
pub fn tracker_flag_buckets(fields: &FilterFields) -> Vec<TrackerBucket> {
    TrackerBucket::SYNTHETIC
        .into_iter()
        .filter(|bucket| bucket.matches("", fields, None))
        .collect()
}
