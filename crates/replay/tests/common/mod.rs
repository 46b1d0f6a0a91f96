//! Common test utilities for replay integration tests.
//!
//! Builds a temporary recording directory (config, sync payloads, file
//! listings) and runs the compiled binary against it.

use std::path::{Path, PathBuf};
use std::process::Output;

use serde_json::Value;
use tempfile::TempDir;

/// Re-export fixtures for test convenience
#[allow(unused_imports)]
pub use qbview_core::testing::fixtures;

/// A temporary recording laid out the way the replay config expects.
pub struct Recording {
    pub temp_dir: TempDir,
    pub payload_dir: PathBuf,
    pub files_dir: PathBuf,
}

impl Recording {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let payload_dir = temp_dir.path().join("payloads");
        let files_dir = temp_dir.path().join("files");
        std::fs::create_dir_all(&payload_dir).unwrap();
        std::fs::create_dir_all(&files_dir).unwrap();
        Self {
            temp_dir,
            payload_dir,
            files_dir,
        }
    }

    /// Write a sync payload file.
    pub fn payload(&self, file_name: &str, body: &Value) -> &Self {
        write_json(&self.payload_dir.join(file_name), body);
        self
    }

    /// Write a file listing.
    pub fn listing(&self, file_name: &str, body: &Value) -> &Self {
        write_json(&self.files_dir.join(file_name), body);
        self
    }

    /// Write the config file and return its path.
    pub fn config(&self, with_files: bool, include_empty_buckets: bool) -> PathBuf {
        let mut toml = format!(
            "[replay]\npayload_dir = {:?}\n",
            self.payload_dir.display().to_string()
        );
        if with_files {
            toml.push_str(&format!(
                "files_dir = {:?}\n",
                self.files_dir.display().to_string()
            ));
        }
        toml.push_str(&format!(
            "\n[report]\ninclude_empty_buckets = {}\n",
            include_empty_buckets
        ));
        let path = self.temp_dir.path().join("config.toml");
        std::fs::write(&path, toml).unwrap();
        path
    }
}

fn write_json(path: &Path, body: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(body).unwrap()).unwrap();
}

/// Run the replay binary with the given config file.
pub async fn run_replay(config_path: &Path) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_qbview-replay"))
        .env("QBVIEW_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .output()
        .await
        .expect("Failed to run replay")
}

/// Parse the JSON report from stdout.
pub fn report(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not a JSON report")
}
