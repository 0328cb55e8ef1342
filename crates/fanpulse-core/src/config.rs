use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&or_default(var, default)).ok_or_else(|| {
            invalid(
                var,
                "expected one of true/false/1/0/yes/no".to_string(),
            )
        })
    };

    let database_url = lookup("DATABASE_URL").ok();
    let env = parse_environment(&or_default("FANPULSE_ENV", "development"))?;
    let log_level = or_default("FANPULSE_LOG_LEVEL", "info");
    let channels_path =
        PathBuf::from(or_default("FANPULSE_CHANNELS_PATH", "./config/channels.yaml"));

    let db_max_connections = parse_u32("FANPULSE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("FANPULSE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("FANPULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let ytdlp_command = or_default("FANPULSE_YTDLP_COMMAND", "yt-dlp");
    if ytdlp_command.trim().is_empty() {
        return Err(invalid(
            "FANPULSE_YTDLP_COMMAND",
            "command must not be blank".to_string(),
        ));
    }
    let ytdlp_timeout_ms = parse_u64("FANPULSE_YTDLP_TIMEOUT_MS", "20000")?;
    let ytdlp_playlist_limit = parse_u32("FANPULSE_YTDLP_PLAYLIST_LIMIT", "30")?;
    if ytdlp_playlist_limit == 0 {
        return Err(invalid(
            "FANPULSE_YTDLP_PLAYLIST_LIMIT",
            "playlist limit must be at least 1".to_string(),
        ));
    }
    let ytdlp_extract_flat = parse_bool("FANPULSE_YTDLP_EXTRACT_FLAT", "false")?;
    let discovery_channel_delay_ms = parse_u64("FANPULSE_DISCOVERY_CHANNEL_DELAY_MS", "0")?;

    let oembed_base_url = or_default("FANPULSE_OEMBED_BASE_URL", "https://www.youtube.com/oembed");
    let oembed_timeout_ms = parse_u64("FANPULSE_OEMBED_TIMEOUT_MS", "5000")?;
    let oembed_max_retries = parse_u32("FANPULSE_OEMBED_MAX_RETRIES", "3")?;
    let oembed_retry_delay_ms = parse_u64("FANPULSE_OEMBED_RETRY_DELAY_MS", "1000")?;
    let oembed_breaker_threshold = parse_u32("FANPULSE_OEMBED_BREAKER_THRESHOLD", "5")?;
    if oembed_breaker_threshold == 0 {
        return Err(invalid(
            "FANPULSE_OEMBED_BREAKER_THRESHOLD",
            "threshold must be at least 1".to_string(),
        ));
    }
    let oembed_breaker_open_ms = parse_u64("FANPULSE_OEMBED_BREAKER_OPEN_MS", "30000")?;
    if oembed_breaker_open_ms < 1_000 {
        return Err(invalid(
            "FANPULSE_OEMBED_BREAKER_OPEN_MS",
            "open duration must be at least 1000 ms".to_string(),
        ));
    }

    let refresh_batch_size = parse_usize("FANPULSE_REFRESH_BATCH_SIZE", "50")?;
    if refresh_batch_size == 0 {
        return Err(invalid(
            "FANPULSE_REFRESH_BATCH_SIZE",
            "batch size must be at least 1".to_string(),
        ));
    }
    let refresh_batch_delay_ms = parse_u64("FANPULSE_REFRESH_BATCH_DELAY_MS", "1000")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        channels_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        ytdlp_command,
        ytdlp_timeout_ms,
        ytdlp_playlist_limit,
        ytdlp_extract_flat,
        discovery_channel_delay_ms,
        oembed_base_url,
        oembed_timeout_ms,
        oembed_max_retries,
        oembed_retry_delay_ms,
        oembed_breaker_threshold,
        oembed_breaker_open_ms,
        refresh_batch_size,
        refresh_batch_delay_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FANPULSE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
