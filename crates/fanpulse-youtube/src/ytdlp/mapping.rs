//! Maps `yt-dlp` entries onto [`DiscoveredStream`]s.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use fanpulse_core::{DiscoveredStream, StreamingPlatform, StreamingStatus};

use super::parse::RawEntry;
use crate::video_id::{build_embed_url, build_watch_url, extract_video_id};

const UNTITLED: &str = "Untitled Stream";

/// Returns `None` when no video id can be found in `id` or `webpage_url`.
#[must_use]
pub fn to_discovered_stream(entry: &RawEntry) -> Option<DiscoveredStream> {
    let video_id = entry
        .id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .or_else(|| entry.webpage_url.as_deref().and_then(extract_video_id))?;

    let title = entry
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(UNTITLED)
        .to_owned();

    let status = map_status(entry.live_status.as_deref());

    let scheduled_at = entry
        .release_timestamp
        .and_then(from_epoch_seconds)
        .or_else(|| entry.timestamp.and_then(from_epoch_seconds))
        .or_else(|| entry.upload_date.as_deref().and_then(parse_upload_date));

    let started_at = if status == StreamingStatus::Scheduled {
        None
    } else {
        entry.timestamp.and_then(from_epoch_seconds)
    };

    let ended_at = match (status, started_at, entry.duration) {
        (StreamingStatus::Ended, Some(started), Some(duration)) if duration >= 0.0 => {
            #[allow(clippy::cast_possible_truncation)]
            let secs = duration as i64;
            Duration::try_seconds(secs).and_then(|d| started.checked_add_signed(d))
        }
        _ => None,
    };

    let source_url = entry
        .webpage_url
        .clone()
        .unwrap_or_else(|| build_watch_url(&video_id));

    Some(DiscoveredStream {
        platform: StreamingPlatform::YouTube,
        stream_url: build_embed_url(&video_id),
        external_id: video_id,
        title,
        description: entry.description.clone(),
        source_url: Some(source_url),
        thumbnail_url: entry.thumbnail.clone(),
        scheduled_at,
        started_at,
        ended_at,
        status,
        viewer_count: entry.concurrent_view_count.or(entry.view_count),
    })
}

/// Anything other than a recognised live marker is treated as a past stream.
fn map_status(live_status: Option<&str>) -> StreamingStatus {
    match live_status {
        Some("is_live") => StreamingStatus::Live,
        Some("is_upcoming") => StreamingStatus::Scheduled,
        _ => StreamingStatus::Ended,
    }
}

fn from_epoch_seconds(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// `YYYYMMDD` at midnight UTC.
fn parse_upload_date(raw: &str) -> Option<DateTime<Utc>> {
    if raw.len() != 8 {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y%m%d") {
        Ok(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
        Err(e) => {
            tracing::debug!(upload_date = raw, error = %e, "unparseable upload_date");
            None
        }
    }
}

#[cfg(test)]
#[path = "mapping_test.rs"]
mod tests;
