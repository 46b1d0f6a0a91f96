//! Torrent transfer states and the status filter buckets derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transfer state as reported by the WebUI API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TorrentState {
    Error,
    MissingFiles,
    Uploading,
    PausedUp,
    StoppedUp,
    QueuedUp,
    StalledUp,
    CheckingUp,
    ForcedUp,
    Allocating,
    Downloading,
    MetaDl,
    ForcedMetaDl,
    PausedDl,
    StoppedDl,
    QueuedDl,
    StalledDl,
    CheckingDl,
    ForcedDl,
    CheckingResumeData,
    Moving,
    /// Any state string this version does not recognise.
    #[default]
    Unknown,
}

impl TorrentState {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TorrentState::Error => "error",
            TorrentState::MissingFiles => "missingFiles",
            TorrentState::Uploading => "uploading",
            TorrentState::PausedUp => "pausedUP",
            TorrentState::StoppedUp => "stoppedUP",
            TorrentState::QueuedUp => "queuedUP",
            TorrentState::StalledUp => "stalledUP",
            TorrentState::CheckingUp => "checkingUP",
            TorrentState::ForcedUp => "forcedUP",
            TorrentState::Allocating => "allocating",
            TorrentState::Downloading => "downloading",
            TorrentState::MetaDl => "metaDL",
            TorrentState::ForcedMetaDl => "forcedMetaDL",
            TorrentState::PausedDl => "pausedDL",
            TorrentState::StoppedDl => "stoppedDL",
            TorrentState::QueuedDl => "queuedDL",
            TorrentState::StalledDl => "stalledDL",
            TorrentState::CheckingDl => "checkingDL",
            TorrentState::ForcedDl => "forcedDL",
            TorrentState::CheckingResumeData => "checkingResumeData",
            TorrentState::Moving => "moving",
            TorrentState::Unknown => "unknown",
        }
    }

    /// Parse a wire state; anything unrecognised maps to `Unknown`.
    ///
    /// The raw string is not kept, so a torrent moving between two
    /// unrecognised states does not register as a change.
    pub fn parse(state: &str) -> Self {
        match state {
            "error" => TorrentState::Error,
            "missingFiles" => TorrentState::MissingFiles,
            "uploading" => TorrentState::Uploading,
            "pausedUP" => TorrentState::PausedUp,
            "stoppedUP" => TorrentState::StoppedUp,
            "queuedUP" => TorrentState::QueuedUp,
            "stalledUP" => TorrentState::StalledUp,
            "checkingUP" => TorrentState::CheckingUp,
            "forcedUP" => TorrentState::ForcedUp,
            "allocating" => TorrentState::Allocating,
            "downloading" => TorrentState::Downloading,
            "metaDL" => TorrentState::MetaDl,
            "forcedMetaDL" => TorrentState::ForcedMetaDl,
            "pausedDL" => TorrentState::PausedDl,
            "stoppedDL" => TorrentState::StoppedDl,
            "queuedDL" => TorrentState::QueuedDl,
            "stalledDL" => TorrentState::StalledDl,
            "checkingDL" => TorrentState::CheckingDl,
            "forcedDL" => TorrentState::ForcedDl,
            "checkingResumeData" => TorrentState::CheckingResumeData,
            "moving" => TorrentState::Moving,
            _ => TorrentState::Unknown,
        }
    }

    /// Any `*DL` state: the torrent still has data to fetch.
    fn is_download_side(&self) -> bool {
        self.as_str().ends_with("DL")
    }

    /// Any `*UP` state: the torrent holds all wanted data.
    fn is_upload_side(&self) -> bool {
        self.as_str().ends_with("UP")
    }

    fn is_stopped(&self) -> bool {
        matches!(
            self,
            TorrentState::StoppedDl
                | TorrentState::StoppedUp
                | TorrentState::PausedDl
                | TorrentState::PausedUp
        )
    }
}

impl From<String> for TorrentState {
    fn from(state: String) -> Self {
        TorrentState::parse(&state)
    }
}

impl From<TorrentState> for String {
    fn from(state: TorrentState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for TorrentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status filter buckets shown in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    All,
    Downloading,
    Seeding,
    Completed,
    Running,
    Stopped,
    Active,
    Inactive,
    Stalled,
    StalledUploading,
    StalledDownloading,
    Checking,
    Moving,
    Errored,
}

impl StatusFilter {
    /// Every status bucket, in sidebar order.
    pub const ALL: [StatusFilter; 14] = [
        StatusFilter::All,
        StatusFilter::Downloading,
        StatusFilter::Seeding,
        StatusFilter::Completed,
        StatusFilter::Running,
        StatusFilter::Stopped,
        StatusFilter::Active,
        StatusFilter::Inactive,
        StatusFilter::Stalled,
        StatusFilter::StalledUploading,
        StatusFilter::StalledDownloading,
        StatusFilter::Checking,
        StatusFilter::Moving,
        StatusFilter::Errored,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Downloading => "downloading",
            StatusFilter::Seeding => "seeding",
            StatusFilter::Completed => "completed",
            StatusFilter::Running => "running",
            StatusFilter::Stopped => "stopped",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
            StatusFilter::Stalled => "stalled",
            StatusFilter::StalledUploading => "stalled_uploading",
            StatusFilter::StalledDownloading => "stalled_downloading",
            StatusFilter::Checking => "checking",
            StatusFilter::Moving => "moving",
            StatusFilter::Errored => "errored",
        }
    }

    /// Whether a torrent in `state` uploading at `upspeed` belongs to this bucket.
    pub fn matches(&self, state: TorrentState, upspeed: u64) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Downloading => {
                state == TorrentState::Downloading || state.is_download_side()
            }
            StatusFilter::Seeding => matches!(
                state,
                TorrentState::Uploading
                    | TorrentState::ForcedUp
                    | TorrentState::StalledUp
                    | TorrentState::QueuedUp
                    | TorrentState::CheckingUp
            ),
            StatusFilter::Completed => {
                state == TorrentState::Uploading || state.is_upload_side()
            }
            StatusFilter::Running => !state.is_stopped(),
            StatusFilter::Stopped => state.is_stopped(),
            StatusFilter::Active => is_active(state, upspeed),
            StatusFilter::Inactive => !is_active(state, upspeed),
            StatusFilter::Stalled => {
                matches!(state, TorrentState::StalledUp | TorrentState::StalledDl)
            }
            StatusFilter::StalledUploading => state == TorrentState::StalledUp,
            StatusFilter::StalledDownloading => state == TorrentState::StalledDl,
            StatusFilter::Checking => matches!(
                state,
                TorrentState::CheckingUp
                    | TorrentState::CheckingDl
                    | TorrentState::CheckingResumeData
            ),
            StatusFilter::Moving => state == TorrentState::Moving,
            StatusFilter::Errored => matches!(
                state,
                TorrentState::Error | TorrentState::Unknown | TorrentState::MissingFiles
            ),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stalled download still counts as active while it uploads.
fn is_active(state: TorrentState, upspeed: u64) -> bool {
    if state == TorrentState::StalledDl {
        return upspeed > 0;
    }
    matches!(
        state,
        TorrentState::MetaDl
            | TorrentState::ForcedMetaDl
            | TorrentState::Downloading
            | TorrentState::ForcedDl
            | TorrentState::Uploading
            | TorrentState::ForcedUp
    )
}
