//! Filter predicates.
//!
//! Pure functions answering "does this torrent currently belong to this
//! bucket" for the four sidebar dimensions (status, category, tag, tracker).
//! They only look at a [`FilterFields`] capture of the torrent, never at the
//! torrent itself, so the same predicates can be evaluated against a value
//! captured before a mutation and against the mutated torrent.

mod category;
mod status;
mod tags;
mod tracker;

pub use category::*;
pub use status::*;
pub use tags::*;
pub use tracker::*;

/// The torrent fields that decide bucket membership.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterFields {
    pub category: String,
    pub tags: Vec<String>,
    pub tracker: String,
    pub trackers_count: u32,
    pub has_tracker_error: bool,
    pub has_tracker_warning: bool,
    pub has_other_announce_error: bool,
    pub state: TorrentState,
    pub upspeed: u64,
}

/// Status buckets a torrent belongs to.
pub fn status_buckets(fields: &FilterFields) -> Vec<StatusFilter> {
    StatusFilter::ALL
        .into_iter()
        .filter(|status| status.matches(fields.state, fields.upspeed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_buckets_for_stalled_download() {
        let fields = FilterFields {
            state: TorrentState::StalledDl,
            ..FilterFields::default()
        };
        let buckets = status_buckets(&fields);
        assert_eq!(
            buckets,
            vec![
                StatusFilter::All,
                StatusFilter::Downloading,
                StatusFilter::Running,
                StatusFilter::Inactive,
                StatusFilter::Stalled,
                StatusFilter::StalledDownloading,
            ]
        );
    }

    #[test]
    fn test_status_buckets_track_upload_speed() {
        let mut fields = FilterFields {
            state: TorrentState::StalledDl,
            upspeed: 10,
            ..FilterFields::default()
        };
        assert!(status_buckets(&fields).contains(&StatusFilter::Active));
        fields.upspeed = 0;
        assert!(status_buckets(&fields).contains(&StatusFilter::Inactive));
    }
}
