//! Boundaries between the sweeps and the outside world.
//!
//! Postgres, the `yt-dlp` subprocess and the oEmbed endpoint each implement
//! one of these traits in their own crate; tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::discovery::{ArtistChannel, DiscoveredStream};
use crate::metadata::{MetadataChanged, VideoMetadata};
use crate::streaming::{StreamingEvent, StreamingPlatform, StreamingStatus};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write, e.g. a second row for the
    /// same `(platform, external_id)`.
    #[error("uniqueness conflict: {0}")]
    Conflict(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(#[source] BoxError),
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("invalid channel handle format: {0}")]
    InvalidHandle(String),

    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("{command} failed with exit code {code:?}: {output}")]
    Failed {
        command: String,
        code: Option<i32>,
        output: String,
    },
}

#[derive(Debug, Error)]
#[error("failed to publish change notification: {0}")]
pub struct NotifyError(pub String);

/// Persistence for [`StreamingEvent`]s.
///
/// Every write is its own unit of work: a failed write never rolls back a
/// sibling write from the same sweep.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StreamingEvent>, StoreError>;

    async fn find_by_external_id(
        &self,
        platform: StreamingPlatform,
        external_id: &str,
    ) -> Result<Option<StreamingEvent>, StoreError>;

    async fn find_by_stream_url(
        &self,
        stream_url: &str,
    ) -> Result<Option<StreamingEvent>, StoreError>;

    /// Events in `status`, oldest schedule first.
    async fn list_by_status(
        &self,
        status: StreamingStatus,
    ) -> Result<Vec<StreamingEvent>, StoreError>;

    /// Events in any status other than `status`, oldest schedule first.
    async fn list_by_status_not(
        &self,
        status: StreamingStatus,
    ) -> Result<Vec<StreamingEvent>, StoreError>;

    async fn insert(&self, event: &StreamingEvent) -> Result<(), StoreError>;

    /// Overwrites the stored row with the aggregate's current state.
    async fn save(&self, event: &StreamingEvent) -> Result<(), StoreError>;
}

/// Read access to crawlable channels plus the crawl bookkeeping write.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn list_active_channels(
        &self,
        platform: StreamingPlatform,
    ) -> Result<Vec<ArtistChannel>, StoreError>;

    async fn mark_crawled(&self, channel_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Lists the streams currently visible on one channel.
#[async_trait]
pub trait StreamLister: Send + Sync {
    async fn list(&self, channel_handle: &str) -> Result<Vec<DiscoveredStream>, ListingError>;
}

/// Looks up public metadata for a video.
///
/// `None` means "could not refresh" (deleted, private, or the provider kept
/// failing); implementations log the cause instead of returning it.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Option<VideoMetadata>;
}

/// Receives metadata change notifications.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn publish(&self, change: &MetadataChanged) -> Result<(), NotifyError>;
}
