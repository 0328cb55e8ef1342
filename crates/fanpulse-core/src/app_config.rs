use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Only the commands that open a pool need it.
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub channels_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub ytdlp_command: String,
    pub ytdlp_timeout_ms: u64,
    pub ytdlp_playlist_limit: u32,
    pub ytdlp_extract_flat: bool,
    pub discovery_channel_delay_ms: u64,
    pub oembed_base_url: String,
    pub oembed_timeout_ms: u64,
    pub oembed_max_retries: u32,
    pub oembed_retry_delay_ms: u64,
    pub oembed_breaker_threshold: u32,
    pub oembed_breaker_open_ms: u64,
    pub refresh_batch_size: usize,
    pub refresh_batch_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("channels_path", &self.channels_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("ytdlp_command", &self.ytdlp_command)
            .field("ytdlp_timeout_ms", &self.ytdlp_timeout_ms)
            .field("ytdlp_playlist_limit", &self.ytdlp_playlist_limit)
            .field("ytdlp_extract_flat", &self.ytdlp_extract_flat)
            .field(
                "discovery_channel_delay_ms",
                &self.discovery_channel_delay_ms,
            )
            .field("oembed_base_url", &self.oembed_base_url)
            .field("oembed_timeout_ms", &self.oembed_timeout_ms)
            .field("oembed_max_retries", &self.oembed_max_retries)
            .field("oembed_retry_delay_ms", &self.oembed_retry_delay_ms)
            .field("oembed_breaker_threshold", &self.oembed_breaker_threshold)
            .field("oembed_breaker_open_ms", &self.oembed_breaker_open_ms)
            .field("refresh_batch_size", &self.refresh_batch_size)
            .field("refresh_batch_delay_ms", &self.refresh_batch_delay_ms)
            .finish()
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `DATABASE_URL` was not set.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}
