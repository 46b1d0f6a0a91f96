use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Replay section exists (enforced by serde)
/// - Payload directory is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.replay.payload_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "replay.payload_dir cannot be empty".to_string(),
        ));
    }

    if let Some(files_dir) = &config.replay.files_dir {
        if files_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "replay.files_dir cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
