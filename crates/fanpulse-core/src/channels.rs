use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::streaming::StreamingPlatform;
use crate::ConfigError;

static HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@?[a-zA-Z0-9_.-]+$").expect("valid regex"));

/// Returns `true` if `handle` looks like a channel handle, with or without
/// the leading `@`.
#[must_use]
pub fn is_valid_handle(handle: &str) -> bool {
    HANDLE_PATTERN.is_match(handle)
}

/// Normalizes a handle to the `@name` form.
#[must_use]
pub fn normalize_handle(handle: &str) -> String {
    if handle.starts_with('@') {
        handle.to_string()
    } else {
        format!("@{handle}")
    }
}

fn default_platform() -> StreamingPlatform {
    StreamingPlatform::YouTube
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub artist_id: Uuid,
    pub handle: String,
    #[serde(default = "default_platform")]
    pub platform: StreamingPlatform,
    pub channel_id: Option<String>,
    pub channel_url: Option<String>,
    #[serde(default = "default_true")]
    pub official: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChannelsFile {
    pub channels: Vec<ChannelConfig>,
}

/// Load and validate the artist channel seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_channels(path: &Path) -> Result<ChannelsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ChannelsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_channels(&content)
}

/// Parse and validate channel seed YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_channels(content: &str) -> Result<ChannelsFile, ConfigError> {
    let channels_file: ChannelsFile = serde_yaml::from_str(content)?;
    validate_channels(&channels_file)?;
    Ok(channels_file)
}

fn validate_channels(channels_file: &ChannelsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for channel in &channels_file.channels {
        if !is_valid_handle(&channel.handle) {
            return Err(ConfigError::Validation(format!(
                "invalid channel handle '{}'",
                channel.handle
            )));
        }

        let key = (
            channel.platform,
            normalize_handle(&channel.handle).to_lowercase(),
        );
        if !seen.insert(key) {
            return Err(ConfigError::Validation(format!(
                "duplicate channel handle '{}' on {}",
                channel.handle, channel.platform
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "channels_test.rs"]
mod tests;
