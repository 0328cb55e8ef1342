//! Discovery-side values: the channels we crawl and what a crawl yields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::streaming::{StreamingPlatform, StreamingStatus};

/// One stream as reported by a channel listing.
///
/// Transport only: consumed by the upsert step and then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredStream {
    pub platform: StreamingPlatform,
    pub external_id: String,
    pub title: String,
    pub description: Option<String>,
    pub stream_url: String,
    pub source_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: StreamingStatus,
    /// `None` when the source carried no viewer signal; persistence decides
    /// the default.
    pub viewer_count: Option<i64>,
}

/// An artist's channel on a streaming platform.
///
/// Owned by the artist domain; discovery only reads active channels and
/// stamps `last_crawled_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistChannel {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub platform: StreamingPlatform,
    pub channel_handle: String,
    pub channel_id: Option<String>,
    pub channel_url: Option<String>,
    pub is_official: bool,
    pub is_active: bool,
    pub last_crawled_at: Option<DateTime<Utc>>,
}

impl ArtistChannel {
    pub fn mark_crawled(&mut self, now: DateTime<Utc>) {
        self.last_crawled_at = Some(now);
    }
}
