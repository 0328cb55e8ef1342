//! Decoding of `yt-dlp` JSON output.

use serde::Deserialize;

/// One video entry as `yt-dlp` reports it. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub webpage_url: Option<String>,
    pub live_status: Option<String>,
    pub thumbnail: Option<String>,
    pub timestamp: Option<i64>,
    pub release_timestamp: Option<i64>,
    pub upload_date: Option<String>,
    /// Seconds; `yt-dlp` sometimes emits fractional values.
    pub duration: Option<f64>,
    pub view_count: Option<i64>,
    pub concurrent_view_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawPlaylist {
    #[serde(default)]
    entries: Option<Vec<Option<RawEntry>>>,
}

/// Decodes either a single playlist object (`--dump-single-json`) or
/// newline-delimited entry objects.
///
/// Undecodable input never fails the call: a bad playlist yields no entries
/// and a bad line is skipped.
#[must_use]
pub fn parse(output: &str) -> Vec<RawEntry> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('{') && trimmed.contains("\"entries\"") {
        return parse_playlist(trimmed);
    }

    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| match serde_json::from_str::<RawEntry>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping undecodable yt-dlp line");
                None
            }
        })
        .collect()
}

fn parse_playlist(json: &str) -> Vec<RawEntry> {
    match serde_json::from_str::<RawPlaylist>(json) {
        Ok(playlist) => playlist
            .entries
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse yt-dlp playlist output");
            Vec::new()
        }
    }
}
