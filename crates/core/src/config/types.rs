use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub replay: ReplayConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where recorded payloads are read from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplayConfig {
    /// Directory of sync payloads (`*.json`), applied in file name order
    pub payload_dir: PathBuf,
    /// Optional directory of per-torrent file listings named `<hash>.json`
    #[serde(default)]
    pub files_dir: Option<PathBuf>,
}

/// Report output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Keep buckets with no members in the report (default: false)
    #[serde(default)]
    pub include_empty_buckets: bool,
}
