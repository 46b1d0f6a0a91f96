pub mod config;
pub mod content;
pub mod filters;
pub mod sync;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ReplayConfig,
    ReportConfig,
};
pub use content::{
    parse_file_list, ContentError, ContentItem, ContentTree, FileEntry, FilePriority,
};
pub use filters::{CategoryBucket, FilterFields, StatusFilter, TagBucket, TorrentState, TrackerBucket};
pub use sync::{
    Category, DimensionSizes, FilterIndex, IndexSizes, MergeOutcome, PayloadError, ServerState, Snapshot,
    SyncPayload, Synchronizer, Torrent, TorrentDelta,
};
